use crate::api::Dtl;
use crate::api::DtlError;
use crate::eval::evaluator;
use crate::eval::rank;
use crate::frame::manager::Frame;
use crate::moment::rule::Rule;

/// how many chain neighbors the expected-value mixing looks at in
/// mode 2
const MIX_RADIUS: usize = 2;

/// the daisy chain: alternatives ordered by their psi mass points,
/// with one belief mass per adjacent pair. mode 0 reports the plain
/// masses; mode 1 mixes each mass with the normalised expected-value
/// delta of the pair; mode 2 widens the delta to the neighborhood
/// radius before mixing.
pub fn daisy_chain(frame: &Frame, crit: i32, mode: i32) -> Dtl<(Vec<usize>, Vec<f64>)> {
    if !(0..=2).contains(&mode) {
        return Err(DtlError::BadMode);
    }
    let n = frame.n_alts();
    let mut means = vec![];
    for alt in 1..=n {
        let entry = evaluator::evaluate(frame, crit, Rule::Psi, alt, 0)?;
        means.push(entry.bn.moments().m1);
    }
    let mut chain = (1..=n).collect::<Vec<_>>();
    chain.sort_by(|a, b| {
        means[*b - 1]
            .partial_cmp(&means[*a - 1])
            .expect("finite means")
            .then(a.cmp(b))
    });
    let mut values = vec![];
    for k in 0..n.saturating_sub(1) {
        let mass = rank::delta_mass(frame, crit, chain[k], chain[k + 1])?;
        let value = match mode {
            0 => mass,
            _ => {
                let delta = spread(&means, &chain, k, mode);
                (mass + (1. + delta.clamp(-1., 1.)) / 2.) / 2.
            }
        };
        values.push(value);
    }
    Ok((chain, values))
}

/// the expected-value spread at a chain link: the adjacent delta in
/// mode 1, the averaged neighborhood delta in mode 2
fn spread(means: &[f64], chain: &[usize], k: usize, mode: i32) -> f64 {
    let radius = match mode {
        2 => MIX_RADIUS,
        _ => 1,
    };
    let lo = k.saturating_sub(radius - 1);
    let hi = (k + radius).min(chain.len() - 1);
    let span = hi - lo;
    (lo..hi)
        .map(|x| means[chain[x] - 1] - means[chain[x + 1] - 1])
        .sum::<f64>()
        / span.max(1) as f64
}

/// daisy values normalised into proportions of the whole pie
pub fn pie_chart(frame: &Frame, crit: i32, mode: i32) -> Dtl<Vec<f64>> {
    let (_, values) = daisy_chain(frame, crit, mode)?;
    let total = values.iter().sum::<f64>();
    match total > f64::EPSILON {
        true => Ok(values.iter().map(|v| v / total).collect()),
        false => Ok(values.iter().map(|_| 1. / values.len() as f64).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::base::Basis;
    use crate::base::statement::Statement;
    use crate::frame::frame::DecisionFrame;
    use crate::frame::kind::FrameKind;

    /// three alternatives at clearly separated certain values
    fn staircase() -> Frame {
        let mut df = DecisionFrame::flat("stairs", &[1, 1, 1]).unwrap();
        df.attach(FrameKind::PS).unwrap();
        for (alt, v) in [(1, 0.2), (2, 0.8), (3, 0.5)] {
            df.add_stmt(Basis::V, Statement::interval(alt, 1, v - 0.05, v + 0.05))
                .unwrap();
        }
        Frame::single(FrameKind::PS, "stairs", df).unwrap()
    }

    #[test]
    fn is_chain_ordered_by_mass_point() {
        let frame = staircase();
        let (chain, values) = daisy_chain(&frame, 1, 0).unwrap();
        assert!(chain == vec![2, 3, 1]);
        assert!(values.len() == 2);
        // each link is a near-certain separation
        for v in values {
            assert!(v > 0.95);
        }
    }
    #[test]
    fn is_pie_a_partition() {
        let frame = staircase();
        for mode in 0..=2 {
            let pie = pie_chart(&frame, 1, mode).unwrap();
            assert!((pie.iter().sum::<f64>() - 1.).abs() < 1e-9);
            assert!(pie.iter().all(|p| *p >= 0.));
        }
    }
    #[test]
    fn is_bad_mode_refused() {
        let frame = staircase();
        assert!(daisy_chain(&frame, 1, 3).is_err());
    }
}
