use crate::api::gate::Abort;
use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::base::Basis;
use crate::eval::evaluator;
use crate::frame::manager::Frame;
use crate::moment::rule::Rule;
use crate::tornado::tornado;
use crate::tornado::tornado::AS_MASS;
use crate::tornado::tornado::FLOATING;

/// MC probability tornado: the per-criterion sweep scaled by the
/// criterion's global weight midpoint, so the shifts read as movement
/// of the aggregate expectation
pub fn mcp_tornado(
    frame: &mut Frame,
    crit: i32,
    mode: i32,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    mc(frame, crit, Basis::P, mode, abort)
}

pub fn mcv_tornado(
    frame: &mut Frame,
    crit: i32,
    mode: i32,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    mc(frame, crit, Basis::V, mode, abort)
}

fn mc(
    frame: &mut Frame,
    crit: i32,
    basis: Basis,
    mode: i32,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    if crit < 1 {
        return Err(DtlError::BadCriterion);
    }
    let weight = evaluator::global_weights(frame.weights()?)[crit as usize - 1];
    let shifts = match basis {
        Basis::V => tornado::v_tornado(frame, crit, mode & FLOATING, abort)?,
        _ => tornado::p_tornado(frame, crit, mode & FLOATING, abort)?,
    };
    let scaled = shifts
        .iter()
        .map(|row| {
            row.iter()
                .map(|(lo, up)| (lo * weight, up * weight))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    match mode & AS_MASS != 0 {
        false => Ok(scaled),
        true => {
            let mut out = vec![];
            for (ix, row) in scaled.iter().enumerate() {
                let entry = evaluator::evaluate(frame, 0, Rule::Psi, ix + 1, 0)?;
                out.push(
                    row.iter()
                        .map(|pair| tornado::mass_pair(&entry, *pair))
                        .collect(),
                );
            }
            Ok(out)
        }
    }
}

/// weight tornado for one alternative: the weight frame's value base
/// is loaded with the per-criterion psi expectations, turning the
/// probability sweep over the weight simplex into a sweep of the
/// aggregate expectation
pub fn w_tornado_alt(
    frame: &mut Frame,
    alt: usize,
    mode: i32,
    abort: &Abort,
) -> Dtl<Vec<(f64, f64)>> {
    if alt < 1 || alt > frame.n_alts() {
        return Err(DtlError::BadAlternative);
    }
    let mut psis = vec![];
    for crit in 1..=frame.n_crit() {
        psis.push(evaluator::alt_moment(frame.df(crit)?, alt).m1);
    }
    let row = {
        let wdf = frame.weights_mut()?;
        let saved_lo = wdf.base(Basis::V).ibox().los().to_vec();
        let saved_up = wdf.base(Basis::V).ibox().ups().to_vec();
        wdf.set_box(Basis::V, &psis, &psis)?;
        let out = tornado::sweep(wdf, Basis::P, mode & FLOATING != 0, abort);
        let restored = wdf.set_box(Basis::V, &saved_lo, &saved_up);
        let mut rows = out?;
        restored?;
        rows.swap_remove(0)
    };
    match mode & AS_MASS != 0 {
        false => Ok(row),
        true => {
            let entry = evaluator::evaluate(frame, 0, Rule::Psi, alt, 0)?;
            Ok(row
                .iter()
                .map(|pair| tornado::mass_pair(&entry, *pair))
                .collect())
        }
    }
}

/// weight tornado over the whole frame: per criterion, the widest
/// movement any alternative shows
pub fn w_tornado(frame: &mut Frame, mode: i32, abort: &Abort) -> Dtl<Vec<(f64, f64)>> {
    let mut out = vec![(f64::MAX, f64::MIN); frame.n_crit()];
    for alt in 1..=frame.n_alts() {
        let row = w_tornado_alt(frame, alt, mode, abort)?;
        for (agg, (lo, up)) in out.iter_mut().zip(row) {
            agg.0 = agg.0.min(lo);
            agg.1 = agg.1.max(up);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::statement::Statement;
    use crate::T_EPS;

    /// two criteria at certain but different values for one
    /// alternative, wide open weights
    fn pm() -> Frame {
        let mut frame = Frame::pm_flat("pm", 2, 2, &[1, 1]).unwrap();
        frame.attach().unwrap();
        for (crit, v1, v2) in [(1usize, 0.9, 0.4), (2usize, 0.1, 0.6)] {
            let df = frame.df_mut(crit).unwrap();
            df.add_stmt(Basis::V, Statement::interval(1, 1, v1 - 0.1, v1 + 0.1))
                .unwrap();
            df.add_stmt(Basis::V, Statement::interval(2, 1, v2 - 0.1, v2 + 0.1))
                .unwrap();
        }
        frame
    }

    #[test]
    fn is_weight_tornado_spanning_the_criteria() {
        let mut frame = pm();
        let abort = Abort::default();
        let row = w_tornado_alt(&mut frame, 1, 0, &abort).unwrap();
        assert!(row.len() == 2);
        // baseline is 0.5; pushing w1 to its ends moves the aggregate
        // across most of [0.1, 0.9]
        assert!(row[0].0 < -0.3);
        assert!(row[0].1 > 0.3);
        // and the weight frame is back to itself afterwards
        let again = w_tornado_alt(&mut frame, 1, 0, &abort).unwrap();
        for (a, b) in row.iter().zip(again.iter()) {
            assert!((a.0 - b.0).abs() < 2. * T_EPS);
            assert!((a.1 - b.1).abs() < 2. * T_EPS);
        }
    }
    #[test]
    fn is_mc_tornado_weight_scaled() {
        let mut frame = pm();
        let abort = Abort::default();
        let plain = tornado::v_tornado(&mut frame, 1, 0, &abort).unwrap();
        let scaled = mcv_tornado(&mut frame, 1, 0, &abort).unwrap();
        for (p, s) in plain.iter().flatten().zip(scaled.iter().flatten()) {
            // equal open weights midpoint at one half
            assert!((s.0 - p.0 * 0.5).abs() < 1e-9);
            assert!((s.1 - p.1 * 0.5).abs() < 1e-9);
        }
    }
    #[test]
    fn is_aggregate_tornado_enveloping() {
        let mut frame = pm();
        let abort = Abort::default();
        let whole = w_tornado(&mut frame, 0, &abort).unwrap();
        let one = w_tornado_alt(&mut frame, 1, 0, &abort).unwrap();
        let two = w_tornado_alt(&mut frame, 2, 0, &abort).unwrap();
        for ((w, a), b) in whole.iter().zip(one.iter()).zip(two.iter()) {
            assert!(w.0 <= a.0.min(b.0) + 1e-12);
            assert!(w.1 >= a.1.max(b.1) - 1e-12);
        }
    }
}
