use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;

/// transitive reduction of a dominance matrix: a pair (i, j) is
/// dropped when some k sits strictly between them. with `strict` the
/// reduction only walks first-order chains; without it any dominated
/// path reduces.
pub fn reduce(matrix: &[Vec<i32>], strict: bool) -> Vec<Vec<i32>> {
    let n = matrix.len();
    let mut graph = DiGraph::<usize, i32>::new();
    let nodes = (0..n).map(|i| graph.add_node(i)).collect::<Vec<_>>();
    for i in 0..n {
        for j in 0..n {
            let order = matrix[i][j];
            let carried = match strict {
                true => order == 1,
                false => order > 0,
            };
            if carried {
                graph.add_edge(nodes[i], nodes[j], order);
            }
        }
    }
    let mut reduced = matrix.to_vec();
    for k in graph.node_indices() {
        let above = graph
            .neighbors_directed(k, Direction::Incoming)
            .collect::<Vec<_>>();
        let below = graph
            .neighbors_directed(k, Direction::Outgoing)
            .collect::<Vec<_>>();
        for i in above.iter() {
            for j in below.iter() {
                reduced[index(*i)][index(*j)] = 0;
            }
        }
    }
    reduced
}

fn index(node: NodeIndex) -> usize {
    node.index()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 → 2 → 3 with the shortcut 1 → 3, all first order
    fn chain() -> Vec<Vec<i32>> {
        let mut matrix = vec![vec![0; 4]; 4];
        matrix[0][1] = 1;
        matrix[1][2] = 1;
        matrix[0][2] = 1;
        matrix[0][3] = 2;
        matrix
    }

    #[test]
    fn is_shortcut_reduced_away() {
        let reduced = reduce(&chain(), false);
        assert!(reduced[0][2] == 0);
        assert!(reduced[0][1] == 1);
        assert!(reduced[1][2] == 1);
        assert!(reduced[0][3] == 2);
    }
    #[test]
    fn is_strict_reduction_first_order_only() {
        // the in-between pair is second order, so a strict pass
        // leaves the shortcut alone
        let mut matrix = chain();
        matrix[1][2] = 2;
        let lax = reduce(&matrix, false);
        assert!(lax[0][2] == 0);
        let strict = reduce(&matrix, true);
        assert!(strict[0][2] == 1);
    }
    #[test]
    fn is_unrelated_pair_untouched() {
        let reduced = reduce(&chain(), false);
        assert!(reduced[2][3] == 0);
        assert!(reduced[3][2] == 0);
    }
}
