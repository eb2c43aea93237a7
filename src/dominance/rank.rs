use crate::api::gate::Abort;
use crate::api::Dtl;
use crate::api::DtlError;
use crate::dominance::dominance;
use crate::frame::manager::Frame;
use petgraph::graph::DiGraph;
use petgraph::Direction;

/// dominance ranking by level peeling: the currently-undominated
/// alternatives form a level, come off the graph, and the next level
/// follows. mode 0 numbers levels consecutively (group), mode 1 gives
/// every member the level's first position (olympic), mode 2 numbers
/// strictly down the peeling order.
pub fn dominance_rank(
    frame: &Frame,
    crit: i32,
    mode: i32,
    dmode: i32,
    threshold: f64,
    abort: &Abort,
) -> Dtl<Vec<usize>> {
    if !(0..=2).contains(&mode) {
        return Err(DtlError::BadMode);
    }
    let matrix = dominance::dominance_matrix(frame, crit, dmode, threshold, abort)?;
    Ok(peel(&matrix, mode))
}

pub fn peel(matrix: &[Vec<i32>], mode: i32) -> Vec<usize> {
    let n = matrix.len();
    let mut graph = DiGraph::<usize, ()>::new();
    let nodes = (0..n).map(|i| graph.add_node(i)).collect::<Vec<_>>();
    for i in 0..n {
        for j in 0..n {
            if matrix[i][j] > 0 {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    let mut ranks = vec![0; n];
    let mut level = 0;
    let mut position = 0;
    while graph.node_count() > 0 {
        level += 1;
        let mut tops = graph
            .node_indices()
            .filter(|ix| {
                graph
                    .neighbors_directed(*ix, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect::<Vec<_>>();
        if tops.is_empty() {
            // cardinal values are score differences, so cycles cannot
            // form; everything left shares the last level regardless
            tops = graph.node_indices().collect();
        }
        let first = position + 1;
        for ix in tops.iter() {
            position += 1;
            ranks[graph[*ix]] = match mode {
                0 => level,
                1 => first,
                _ => position,
            };
        }
        // remove_node invalidates indices, so resolve to payloads first
        let peeled = tops.iter().map(|ix| graph[*ix]).collect::<Vec<_>>();
        graph.retain_nodes(|g, ix| !peeled.contains(&g[ix]));
    }
    ranks
}
