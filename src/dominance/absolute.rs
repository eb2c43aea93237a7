use crate::api::gate::Abort;
use crate::api::Dtl;
use crate::dominance::dominance;
use crate::frame::manager::Frame;

/// weight-independent dominance: a pair survives only if it holds in
/// every criterion. the per-criterion orders compose through a small
/// state machine and the columns aggregate through another.

/// composition of one more criterion's order into the running one:
/// a no-dominance kills the conjunction, second order overrides first
pub fn abs_dom(old: i32, cur: i32) -> i32 {
    match old == 0 || cur == 0 {
        true => 0,
        false => old.max(cur),
    }
}

/// column aggregation: whether anything dominates this column;
/// first order wins over second wins over nothing
pub fn abs_sum(column: &[i32]) -> i32 {
    match column.iter().any(|d| *d == 1) {
        true => 1,
        false => match column.iter().any(|d| *d == 2) {
            true => 2,
            false => 0,
        },
    }
}

/// the absolute dominance matrix over all criteria of a
/// multi-criterion frame
pub fn abs_dominance_matrix(
    frame: &Frame,
    dmode: i32,
    threshold: f64,
    abort: &Abort,
) -> Dtl<Vec<Vec<i32>>> {
    frame.weights()?;
    let n = frame.n_alts();
    let mut combined: Option<Vec<Vec<i32>>> = None;
    for crit in 1..=frame.n_crit() {
        abort.check()?;
        let matrix = dominance::dominance_matrix(frame, crit as i32, dmode, threshold, abort)?;
        combined = Some(match combined {
            None => matrix,
            Some(old) => (0..n)
                .map(|i| (0..n).map(|j| abs_dom(old[i][j], matrix[i][j])).collect())
                .collect(),
        });
    }
    combined.ok_or(crate::api::DtlError::BadCriterion)
}

/// per-alternative absolute domination state, from the matrix columns
pub fn abs_dominated(matrix: &[Vec<i32>]) -> Vec<i32> {
    let n = matrix.len();
    (0..n)
        .map(|j| {
            let column = (0..n).map(|i| matrix[i][j]).collect::<Vec<_>>();
            abs_sum(&column)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_no_dominance_absorbing() {
        assert!(abs_dom(0, 1) == 0);
        assert!(abs_dom(1, 0) == 0);
        assert!(abs_dom(0, 0) == 0);
    }
    #[test]
    fn is_second_order_overriding() {
        assert!(abs_dom(1, 1) == 1);
        assert!(abs_dom(1, 2) == 2);
        assert!(abs_dom(2, 1) == 2);
        assert!(abs_dom(2, 2) == 2);
    }
    #[test]
    fn is_first_order_winning_the_column() {
        assert!(abs_sum(&[0, 2, 1]) == 1);
        assert!(abs_sum(&[0, 2, 0]) == 2);
        assert!(abs_sum(&[0, 0, 0]) == 0);
    }
}
