use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::base::Basis;
use crate::bnormal::bnormal::Bnormal;
use crate::eval::cache::Entry;
use crate::frame::frame::DecisionFrame;
use crate::frame::manager::Frame;
use crate::frame::topology::Topology;
use crate::moment::engine;
use crate::moment::engine::PStat;
use crate::moment::moments::Moments;
use crate::moment::rule::Rule;
use crate::moment::triangle;
use crate::MAX_RESULTSTEPS;

/// the psi moments of one alternative of a criterion frame
pub fn alt_moment(df: &DecisionFrame, alt: usize) -> Moments {
    let maps = df.maps();
    let ph = &df.base(Basis::P).hull;
    let vh = &df.base(Basis::V).hull;
    let top = df.alt(alt).expect("alternative in range");
    let pstat = |t: usize| {
        let k = maps.flat(alt, t);
        PStat::fit(ph.lo(k), ph.mid(k), ph.up(k))
    };
    let leaf = |t: usize| {
        let k = maps.real_of(alt, maps.t2r(alt, t));
        let (m2, m3) = triangle::fit(vh.lo(k), vh.mid(k), vh.up(k));
        Moments {
            m1: vh.mid(k),
            m2,
            m3,
        }
    };
    engine::descend(top, 0, &pstat, &leaf)
}

/// the per-alternative psi moments of one criterion frame
pub fn alt_moments(df: &DecisionFrame) -> Vec<Moments> {
    (1..=df.n_alts()).map(|alt| alt_moment(df, alt)).collect()
}

/// the per-alternative expected-value hulls, by greedy mass
/// assignment over each sibling group against the local hull
pub fn alt_hulls(df: &DecisionFrame) -> Vec<(f64, f64)> {
    (1..=df.n_alts())
        .map(|alt| {
            let maps = df.maps();
            let ph = &df.base(Basis::P).hull;
            let vh = &df.base(Basis::V).hull;
            let top = df.alt(alt).expect("alternative in range");
            let plo = |t: usize| ph.lo(maps.flat(alt, t));
            let pup = |t: usize| ph.up(maps.flat(alt, t));
            let value = |t: usize, maxing: bool| {
                let k = maps.real_of(alt, maps.t2r(alt, t));
                match maxing {
                    true => vh.up(k),
                    false => vh.lo(k),
                }
            };
            (
                extreme(top, 0, &plo, &pup, &value, false),
                extreme(top, 0, &plo, &pup, &value, true),
            )
        })
        .collect()
}

/// extreme of Σ p·x over a subtree: each sibling group is a simplex
/// boxed by the local hull, so the optimum assigns mandatory lower
/// mass first and spends the slack on the best (or worst) children
pub fn extreme(
    top: &Topology,
    node: usize,
    plo: &dyn Fn(usize) -> f64,
    pup: &dyn Fn(usize) -> f64,
    value: &dyn Fn(usize, bool) -> f64,
    maxing: bool,
) -> f64 {
    if node != 0 && top.real(node) {
        return value(node, maxing);
    }
    let kids = top.children(node);
    let vals = kids
        .iter()
        .map(|k| extreme(top, *k, plo, pup, value, maxing))
        .collect::<Vec<_>>();
    let mut order = (0..kids.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| match maxing {
        true => vals[*b].partial_cmp(&vals[*a]).expect("finite values"),
        false => vals[*a].partial_cmp(&vals[*b]).expect("finite values"),
    });
    let mut mass = kids.iter().map(|k| plo(*k)).collect::<Vec<_>>();
    let mut slack = (1. - mass.iter().sum::<f64>()).max(0.);
    for ix in order {
        let room = (pup(kids[ix]) - mass[ix]).max(0.);
        let add = room.min(slack);
        mass[ix] += add;
        slack -= add;
        if slack <= 0. {
            break;
        }
    }
    mass.iter().zip(vals.iter()).map(|(p, v)| p * v).sum()
}

/// global weights of the criteria: conditional means multiplied down
/// the weight tree to each real leaf
pub fn global_weights(wdf: &DecisionFrame) -> Vec<crate::Weight> {
    let maps = wdf.maps();
    let top = wdf.alt(1).expect("weight tree");
    let hull = &wdf.base(Basis::P).hull;
    let mut weights = vec![0.; maps.n_real()];
    let mut stack = vec![(0usize, 1f64)];
    while let Some((node, carried)) = stack.pop() {
        for child in top.children(node) {
            let product = carried * hull.mid(maps.flat(1, child));
            match top.real(child) {
                true => weights[maps.t2r(1, child) - 1] = product,
                false => stack.push((child, product)),
            }
        }
    }
    weights
}

fn check_pair(frame: &Frame, rule: Rule, i: usize, j: usize) -> Dtl<()> {
    if i < 1 || i > frame.n_alts() {
        return Err(DtlError::BadAlternative);
    }
    if rule == Rule::Delta {
        if j < 1 || j > frame.n_alts() || j == i {
            return Err(DtlError::BadAlternative);
        }
    }
    Ok(())
}

/// one full evaluation: combined moments and hull under the rule, for
/// a single criterion or aggregated through the weight tree, with the
/// skew-normal fitted over the hull
pub fn evaluate(frame: &Frame, crit: i32, rule: Rule, i: usize, j: usize) -> Dtl<Entry> {
    check_pair(frame, rule, i, j)?;
    let (moments, (lo, up)) = match crit {
        c if c >= 1 => {
            let df = frame.df(c as usize)?;
            let alts = alt_moments(df);
            let hulls = alt_hulls(df);
            (rule.moments(&alts, i, j), rule.hull(&hulls, i, j))
        }
        c => {
            let wdf = frame.weights()?;
            let node = partial_node(wdf, c)?;
            let mut crit_moments = vec![];
            let mut crit_hulls = vec![];
            for cc in 1..=frame.n_crit() {
                let df = frame.df(cc)?;
                let alts = alt_moments(df);
                let hulls = alt_hulls(df);
                crit_moments.push(rule.moments(&alts, i, j));
                crit_hulls.push(rule.hull(&hulls, i, j));
            }
            let maps = wdf.maps();
            let top = wdf.alt(1)?;
            let whull = &wdf.base(Basis::P).hull;
            let pstat = |t: usize| {
                let k = maps.flat(1, t);
                PStat::fit(whull.lo(k), whull.mid(k), whull.up(k))
            };
            let leaf = |t: usize| crit_moments[maps.t2r(1, t) - 1];
            let moments = engine::descend(top, node, &pstat, &leaf);
            let plo = |t: usize| whull.lo(maps.flat(1, t));
            let pup = |t: usize| whull.up(maps.flat(1, t));
            let value = |t: usize, maxing: bool| {
                let (clo, cup) = crit_hulls[maps.t2r(1, t) - 1];
                match maxing {
                    true => cup,
                    false => clo,
                }
            };
            let lo = extreme(top, node, &plo, &pup, &value, false);
            let up = extreme(top, node, &plo, &pup, &value, true);
            (moments, (lo, up))
        }
    };
    let lo = lo.min(up);
    let up = up.max(lo);
    Ok(Entry {
        rule,
        pair: (i, j),
        bn: Bnormal::fit(moments, lo, up),
        lo,
        mid: (lo + up) / 2.,
        up,
    })
}

/// the weight-tree node a negative criterion aggregates from; 0 is
/// the root and means the full MC result
fn partial_node(wdf: &DecisionFrame, crit: i32) -> Dtl<usize> {
    if crit == 0 {
        return Ok(0);
    }
    let node = (-crit) as usize;
    let top = wdf.alt(1)?;
    if node > top.tot() || top.real(node) {
        return Err(DtlError::BadCriterion);
    }
    Ok(node)
}

/// the 3 × 21 support expansion: a cone of quantile brackets from the
/// full hull down to the target point. mode bit 0 picks the target
/// (0 the 50% cdf point, 1 the mass point); bit 1 swaps the mid row
/// from the raw bracket midpoint to the mean, extrapolated
/// quadratically toward the target.
pub fn expand(entry: &Entry, mode: i32) -> Dtl<[[f64; MAX_RESULTSTEPS]; 3]> {
    if !(0..=3).contains(&mode) {
        return Err(DtlError::BadMode);
    }
    let bn = &entry.bn;
    let mean = bn.moments().m1;
    let target_p = match mode & 1 {
        0 => 0.5,
        _ => bn.cdf(mean),
    };
    let target_x = bn.inv_cdf(target_p);
    let mut steps = [[0.; MAX_RESULTSTEPS]; 3];
    for s in 0..MAX_RESULTSTEPS {
        let f = s as f64 / (MAX_RESULTSTEPS - 1) as f64;
        let lo = bn.inv_cdf(f * target_p);
        let up = bn.inv_cdf(1. - f * (1. - target_p));
        steps[0][s] = lo;
        steps[2][s] = up;
        steps[1][s] = match mode & 2 {
            0 => (lo + up) / 2.,
            _ => mean + (target_x - mean) * f * f,
        };
    }
    Ok(steps)
}

/// per-criterion psi expectations of one alternative, weighted by the
/// global weight midpoints, and their sum
pub fn omega(frame: &Frame, alt: usize) -> Dtl<(Vec<f64>, f64)> {
    if alt < 1 || alt > frame.n_alts() {
        return Err(DtlError::BadAlternative);
    }
    let wdf = frame.weights()?;
    let weights = global_weights(wdf);
    let mut parts = vec![];
    for cc in 1..=frame.n_crit() {
        let df = frame.df(cc)?;
        let psi = alt_moments(df)[alt - 1].m1;
        parts.push(weights[cc - 1] * psi);
    }
    let total = parts.iter().sum();
    Ok((parts, total))
}

/// omega aggregated to the first level of the weight tree: one entry
/// per child of the root, carrying its subtree's weighted sum
pub fn omega1(frame: &Frame, alt: usize) -> Dtl<Vec<f64>> {
    let (parts, _) = omega(frame, alt)?;
    let wdf = frame.weights()?;
    let top = wdf.alt(1)?;
    let maps = wdf.maps();
    let mut out = vec![];
    for branch in top.children(0) {
        let mut sum = 0.;
        let mut stack = vec![branch];
        while let Some(node) = stack.pop() {
            match top.real(node) {
                true => sum += parts[maps.t2r(1, node) - 1],
                false => stack.extend(top.children(node)),
            }
        }
        out.push(sum);
    }
    Ok(out)
}
