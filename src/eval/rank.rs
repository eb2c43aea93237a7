use crate::api::Dtl;
use crate::api::DtlError;
use crate::eval::evaluator;
use crate::frame::manager::Frame;
use crate::moment::rule::Rule;
use crate::Mass;
use crate::DTL_EPS;

/// a pairwise comparison: the delta hull triple and the belief mass
/// that the first alternative is the better one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub lo: f64,
    pub mid: f64,
    pub up: f64,
    pub mass: Mass,
}

pub fn compare_alternatives(frame: &Frame, crit: i32, i: usize, j: usize) -> Dtl<Comparison> {
    let entry = evaluator::evaluate(frame, crit, Rule::Delta, i, j)?;
    Ok(Comparison {
        lo: entry.lo,
        mid: entry.mid,
        up: entry.up,
        mass: entry.bn.mass_above(0.),
    })
}

/// belief mass of δ(i, j) > 0
pub fn delta_mass(frame: &Frame, crit: i32, i: usize, j: usize) -> Dtl<Mass> {
    let entry = evaluator::evaluate(frame, crit, Rule::Delta, i, j)?;
    Ok(entry.bn.mass_above(0.))
}

/// per-alternative security levels: the psi quantile every
/// alternative holds with the given belief
pub fn sec_level(frame: &Frame, crit: i32, level: f64) -> Dtl<Vec<crate::Value>> {
    if !(0. ..=1.).contains(&level) {
        return Err(DtlError::BadBounds);
    }
    (1..=frame.n_alts())
        .map(|alt| {
            let entry = evaluator::evaluate(frame, crit, Rule::Psi, alt, 0)?;
            Ok(entry.bn.inv_cdf(1. - level))
        })
        .collect()
}

/// rank alternatives under a criterion. non-negative modes rank by
/// the psi mass point: 0 olympic numbering, 1 strict, 2 strict with
/// the variance as tiebreaker, 3 group numbering. mode −1 ranks by
/// the cdf median with olympic numbering, mode −2 by dominance
/// levels. the flag reports whether the mass-point order and the
/// median order disagree.
pub fn rank_alternatives(frame: &Frame, crit: i32, mode: i32) -> Dtl<(Vec<usize>, bool)> {
    let n = frame.n_alts();
    let mut means = vec![];
    let mut medians = vec![];
    let mut variances = vec![];
    for alt in 1..=n {
        let entry = evaluator::evaluate(frame, crit, Rule::Psi, alt, 0)?;
        means.push(entry.bn.moments().m1);
        medians.push(entry.bn.inv_cdf(0.5));
        variances.push(entry.bn.moments().m2);
    }
    let differing = order(&means, &variances) != order(&medians, &variances);
    let ranks = match mode {
        0 => number(&means, &variances, Numbering::Olympic),
        1 => number(&means, &variances, Numbering::Strict),
        2 => number(&means, &variances, Numbering::Tiebreak),
        3 => number(&means, &variances, Numbering::Group),
        -1 => number(&medians, &variances, Numbering::Olympic),
        -2 => crate::dominance::rank::dominance_rank(
            frame,
            crit,
            0,
            2,
            0.,
            &crate::api::gate::Abort::default(),
        )?,
        _ => return Err(DtlError::BadMode),
    };
    Ok((ranks, differing))
}

enum Numbering {
    Olympic,
    Strict,
    Tiebreak,
    Group,
}

fn order(keys: &[f64], tiebreak: &[f64]) -> Vec<usize> {
    let mut sorted = (0..keys.len()).collect::<Vec<_>>();
    sorted.sort_by(|a, b| {
        keys[*b]
            .partial_cmp(&keys[*a])
            .expect("finite keys")
            .then(tiebreak[*a].partial_cmp(&tiebreak[*b]).expect("finite"))
            .then(a.cmp(b))
    });
    sorted
}

/// assign 1-based ranks down the sorted order; ties chain within the
/// consistency horizon
fn number(keys: &[f64], tiebreak: &[f64], numbering: Numbering) -> Vec<usize> {
    let sorted = order(keys, tiebreak);
    let mut ranks = vec![0; keys.len()];
    let mut group = 0;
    let mut shared = 0;
    for (position, ix) in sorted.iter().enumerate() {
        let tied = position > 0
            && (keys[sorted[position - 1]] - keys[*ix]).abs() < DTL_EPS
            && !matches!(numbering, Numbering::Strict | Numbering::Tiebreak);
        if !tied {
            group += 1;
            shared = position + 1;
        }
        ranks[*ix] = match numbering {
            Numbering::Strict | Numbering::Tiebreak => position + 1,
            Numbering::Olympic => shared,
            Numbering::Group => group,
        };
    }
    ranks
}
