use crate::api::gate::Abort;
use crate::api::Dtl;
use crate::eval::evaluator;
use crate::frame::manager::Frame;
use crate::moment::rule::Rule;
use crate::DOMINANCE_LIMIT;
use crate::MAX_RESULTSTEPS;

/// pairwise stochastic dominance from the 21-step psi cones.
///
/// both alternatives expand toward their 50% cdf points; at every
/// step the lower and upper bracket differences accumulate into the
/// cardinal value, and a step where one side leads by more than the
/// dominance limit on both ends sets its flag. first order means one
/// side led wherever anybody did; mixed or upper-only leads collapse
/// to second order.
pub fn get_dominance(frame: &Frame, crit: i32, i: usize, j: usize) -> Dtl<(f64, i32)> {
    let ei = evaluator::evaluate(frame, crit, Rule::Psi, i, 0)?;
    let ej = evaluator::evaluate(frame, crit, Rule::Psi, j, 0)?;
    let si = evaluator::expand(&ei, 0)?;
    let sj = evaluator::expand(&ej, 0)?;
    let mut sum = ei.mid - ej.mid;
    let mut dom = 0;
    for s in 0..MAX_RESULTSTEPS {
        let dlo = si[0][s] - sj[0][s];
        let dup = si[2][s] - sj[2][s];
        sum += dlo + dup;
        if dlo > DOMINANCE_LIMIT && dup > DOMINANCE_LIMIT {
            dom |= 1;
        }
        if dlo < -DOMINANCE_LIMIT && dup < -DOMINANCE_LIMIT {
            dom |= 2;
        }
    }
    let cd = sum / (2 * MAX_RESULTSTEPS + 1) as f64;
    let order = match cd.abs() < DOMINANCE_LIMIT {
        true => 0,
        false => match dom {
            1 => 1,
            2 | 3 => 2,
            _ => 0,
        },
    };
    Ok((cd, order))
}

/// ordered-pair dominance orders: entry (i, j) is the order with
/// which i dominates j, 0 when it does not. dmode 1 admits only
/// first-order pairs, 2 any order; the threshold tightens the
/// cardinal limit.
pub fn dominance_matrix(
    frame: &Frame,
    crit: i32,
    dmode: i32,
    threshold: f64,
    abort: &Abort,
) -> Dtl<Vec<Vec<i32>>> {
    let n = frame.n_alts();
    let limit = DOMINANCE_LIMIT.max(threshold);
    let mut matrix = vec![vec![0; n]; n];
    for i in 1..=n {
        for j in 1..=n {
            if i == j {
                continue;
            }
            abort.check()?;
            let (cd, order) = get_dominance(frame, crit, i, j)?;
            if cd > limit && order > 0 && (dmode != 1 || order == 1) {
                matrix[i - 1][j - 1] = order;
            }
        }
    }
    Ok(matrix)
}

/// the cardinal dominance values themselves
pub fn cardinal_matrix(frame: &Frame, crit: i32, abort: &Abort) -> Dtl<Vec<Vec<f64>>> {
    let n = frame.n_alts();
    let mut matrix = vec![vec![0.; n]; n];
    for i in 1..=n {
        for j in 1..=n {
            if i == j {
                continue;
            }
            abort.check()?;
            let (cd, _) = get_dominance(frame, crit, i, j)?;
            matrix[i - 1][j - 1] = cd;
        }
    }
    Ok(matrix)
}
