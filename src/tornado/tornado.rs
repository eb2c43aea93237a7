use crate::api::gate::Abort;
use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::base::Basis;
use crate::base::statement::Statement;
use crate::eval::cache::Entry;
use crate::eval::evaluator;
use crate::frame::frame::DecisionFrame;
use crate::frame::manager::Frame;
use crate::moment::rule::Rule;
use crate::HULL_EPS;
use crate::T_EPS;

/// mode bit: midpoints float (the whole midpoint box is lifted for
/// the duration) instead of being kept
pub const FLOATING: i32 = 1;
/// mode bit: report belief-mass shifts instead of expected-value
/// shifts
pub const AS_MASS: i32 = 2;

/// per-variable sensitivity of the psi expectation.
///
/// each variable in turn is forced to the ends of its movable range
/// by a temporary one-term statement, the base reconsolidates, the
/// expectation is read off, and the statement comes out again. the
/// midpoint box is restored whatever happens on the way.
pub fn p_tornado(
    frame: &mut Frame,
    crit: i32,
    mode: i32,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    tornado(frame, crit, Basis::P, mode, abort)
}

pub fn v_tornado(
    frame: &mut Frame,
    crit: i32,
    mode: i32,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    tornado(frame, crit, Basis::V, mode, abort)
}

fn tornado(
    frame: &mut Frame,
    crit: i32,
    basis: Basis,
    mode: i32,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    if !(0..=3).contains(&mode) {
        return Err(DtlError::BadMode);
    }
    if crit < 1 {
        return Err(DtlError::BadCriterion);
    }
    let shifts = {
        let df = frame.df_mut(crit as usize)?;
        sweep(df, basis, mode & FLOATING != 0, abort)?
    };
    match mode & AS_MASS != 0 {
        false => Ok(shifts),
        true => as_mass(frame, crit, &shifts),
    }
}

/// run the per-variable pushes over every alternative of a frame,
/// putting the midpoint box back afterwards even on failure
pub fn sweep(
    df: &mut DecisionFrame,
    basis: Basis,
    floating: bool,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    let saved_lo = df.base(basis).mbox().los().to_vec();
    let saved_up = df.base(basis).mbox().ups().to_vec();
    if floating {
        df.remove_mbox(basis)?;
    }
    let out = sweep_inner(df, basis, floating, abort);
    let restored = df.set_mbox(basis, &saved_lo, &saved_up);
    let shifts = out?;
    restored?;
    Ok(shifts)
}

fn sweep_inner(
    df: &mut DecisionFrame,
    basis: Basis,
    floating: bool,
    abort: &Abort,
) -> Dtl<Vec<Vec<(f64, f64)>>> {
    let mut out = vec![];
    for alt in 1..=df.n_alts() {
        let baseline = evaluator::alt_moment(df, alt).m1;
        let mut row = vec![];
        for r in 1..=df.maps().reals(alt) {
            abort.check()?;
            let node = match basis {
                Basis::V => r,
                _ => df.maps().r2t(alt, r),
            };
            let (ev_lo, ev_up) = push(df, basis, alt, node, floating, baseline)?;
            let floor = ev_lo.min(ev_up).min(baseline) - baseline;
            let ceil = ev_lo.max(ev_up).max(baseline) - baseline;
            row.push((floor, ceil));
        }
        out.push(row);
    }
    Ok(out)
}

/// force one variable to each end of its movable range and read the
/// expectation there
fn push(
    df: &mut DecisionFrame,
    basis: Basis,
    alt: usize,
    node: usize,
    floating: bool,
    baseline: f64,
) -> Dtl<(f64, f64)> {
    let k = df.variable(basis, alt, node)?;
    let own = (df.base(basis).mbox().lo(k), df.base(basis).mbox().up(k));
    let set = df.base(basis).mbox().is_set(k);
    if set && !floating {
        df.delete_mid_stmt(basis, alt, node)?;
    }
    let out = limits(df, basis, alt, node, k).and_then(|(lo, up)| {
        if up - lo < HULL_EPS {
            return Ok((baseline, baseline));
        }
        let ev_lo = probe(df, basis, alt, node, lo, (lo + T_EPS).min(up), baseline)?;
        let ev_up = probe(df, basis, alt, node, (up - T_EPS).max(lo), up, baseline)?;
        Ok((ev_lo, ev_up))
    });
    if set && !floating {
        df.add_mid_stmt(basis, alt, node, own.0, own.1)?;
    }
    out
}

/// movable range: the variable's hull cut down by what the sibling
/// means leave over on the simplex
fn limits(df: &DecisionFrame, basis: Basis, alt: usize, node: usize, k: usize) -> Dtl<(f64, f64)> {
    let hull = &df.base(basis).hull;
    let (mut lo, mut up) = (hull.lo(k), hull.up(k));
    if basis != Basis::V {
        let top = df.alt(alt)?;
        let mbox = df.base(basis).mbox();
        let mut mandatory = 0.;
        let mut capacity = 0.;
        for sibling in top.group(node) {
            if sibling == node {
                continue;
            }
            let s = df.variable(basis, alt, sibling)?;
            let (slo, sup) = match mbox.is_set(s) {
                true => (mbox.lo(s).max(hull.lo(s)), mbox.up(s).min(hull.up(s))),
                false => (hull.lo(s), hull.up(s)),
            };
            mandatory += slo;
            capacity += sup;
        }
        lo = lo.max(1. - capacity);
        up = up.min(1. - mandatory);
    }
    Ok((lo, up.max(lo)))
}

/// pin the variable into a sliver with a temporary statement and read
/// the expectation; an inconsistent pin means no movement
fn probe(
    df: &mut DecisionFrame,
    basis: Basis,
    alt: usize,
    node: usize,
    lobo: f64,
    upbo: f64,
    baseline: f64,
) -> Dtl<f64> {
    let stmt = Statement::interval(alt, node, lobo.max(0.), upbo.min(1.));
    match df.add_stmt(basis, stmt) {
        Err(DtlError::Inconsistent) | Err(DtlError::TooNarrow) => Ok(baseline),
        Err(trouble) => Err(trouble),
        Ok(ix) => {
            let ev = evaluator::alt_moment(df, alt).m1;
            df.delete_stmt(basis, ix)?;
            Ok(ev)
        }
    }
}

/// translate expected-value shifts into belief-mass shifts around
/// each alternative's own distribution, symmetrising the pair when
/// the movement itself was symmetric
fn as_mass(frame: &Frame, crit: i32, shifts: &[Vec<(f64, f64)>]) -> Dtl<Vec<Vec<(f64, f64)>>> {
    let mut out = vec![];
    for (ix, row) in shifts.iter().enumerate() {
        let entry = evaluator::evaluate(frame, crit, Rule::Psi, ix + 1, 0)?;
        out.push(row.iter().map(|pair| mass_pair(&entry, *pair)).collect());
    }
    Ok(out)
}

pub fn mass_pair(entry: &Entry, (lo, up): (f64, f64)) -> (f64, f64) {
    let baseline = entry.bn.moments().m1;
    let at = entry.bn.cdf(baseline);
    let mlo = entry.bn.cdf(baseline + lo) - at;
    let mup = entry.bn.cdf(baseline + up) - at;
    match (lo + up).abs() < 2. * T_EPS {
        true => {
            let m = (mlo.abs() + mup.abs()) / 2.;
            (-m, m)
        }
        false => (mlo, mup),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::kind::FrameKind;

    /// one alternative, two consequences, symmetric value hulls
    fn symmetric() -> Frame {
        let mut df = DecisionFrame::flat("symmetric", &[2]).unwrap();
        df.attach(FrameKind::PS).unwrap();
        df.add_stmt(Basis::V, Statement::interval(1, 1, 0.3, 0.7))
            .unwrap();
        df.add_stmt(Basis::V, Statement::interval(1, 2, 0.1, 0.5))
            .unwrap();
        Frame::single(FrameKind::PS, "symmetric", df).unwrap()
    }

    #[test]
    fn is_symmetric_hull_tornado_symmetric() {
        let mut frame = symmetric();
        let abort = Abort::default();
        let shifts = v_tornado(&mut frame, 1, 0, &abort).unwrap();
        for (lo, up) in shifts.iter().flatten() {
            assert!((lo + up).abs() < 2. * T_EPS);
            assert!(*up > 0.05);
        }
    }
    #[test]
    fn is_tornado_leaving_no_trace() {
        let mut frame = symmetric();
        let abort = Abort::default();
        let before = {
            let df = frame.df(1).unwrap();
            (
                df.base(Basis::V).stmts().to_vec(),
                df.base(Basis::V).mbox().clone(),
                df.base(Basis::V).hull.clone(),
                df.base(Basis::P).stmts().to_vec(),
            )
        };
        v_tornado(&mut frame, 1, 0, &abort).unwrap();
        p_tornado(&mut frame, 1, 1, &abort).unwrap();
        let df = frame.df(1).unwrap();
        assert!(df.base(Basis::V).stmts() == before.0);
        assert!(*df.base(Basis::V).mbox() == before.1);
        assert!(df.base(Basis::V).hull == before.2);
        assert!(df.base(Basis::P).stmts() == before.3);
    }
    #[test]
    fn is_probability_push_respecting_siblings() {
        let mut frame = symmetric();
        let abort = Abort::default();
        let df = frame.df_mut(1).unwrap();
        df.add_mid_stmt(Basis::P, 1, 2, 0.4, 0.4).unwrap();
        // keeping the sibling midpoint pins this variable at 0.6
        let shifts = p_tornado(&mut frame, 1, 0, &abort).unwrap();
        let (lo, up) = shifts[0][0];
        assert!(up - lo < 2. * T_EPS + 1e-9);
    }
    #[test]
    fn is_floating_push_free_again() {
        let mut frame = symmetric();
        let abort = Abort::default();
        let df = frame.df_mut(1).unwrap();
        df.add_mid_stmt(Basis::P, 1, 2, 0.4, 0.4).unwrap();
        let shifts = p_tornado(&mut frame, 1, FLOATING, &abort).unwrap();
        let (lo, up) = shifts[0][0];
        // with the box lifted the variable spans its whole hull
        assert!(up - lo > 0.05);
        // and the midpoint box is back
        let df = frame.df(1).unwrap();
        let k = df.variable(Basis::P, 1, 2).unwrap();
        assert!(df.base(Basis::P).mbox().mid(k) == Some(0.4));
    }
    #[test]
    fn is_mass_mode_bounded() {
        let mut frame = symmetric();
        let abort = Abort::default();
        let shifts = v_tornado(&mut frame, 1, AS_MASS, &abort).unwrap();
        for (lo, up) in shifts.iter().flatten() {
            assert!(*lo <= 0. && *up >= 0.);
            assert!(*lo >= -1. && *up <= 1.);
        }
    }
}
