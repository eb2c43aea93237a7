use crate::base::base::Basis;
use crate::eval::evaluator;
use crate::frame::frame::DecisionFrame;
use crate::frame::manager::Frame;
use crate::moment::rule::Rule;
use crate::Arbitrary;
use crate::DTL_EPS;

/// property-style sweeps over random frames. the invariants here are
/// the ones every attached frame must satisfy no matter what the
/// statements say:
/// 1. sibling means sum to one on every simplex group
/// 2. every consolidated mean sits inside its hull
/// 3. repeated evaluation is bitwise reproducible
/// 4. the fitted cdf is anchored at the hull and monotone
/// 5. every rule hull brackets its own mass point

const ROUNDS: usize = 16;

#[test]
fn is_every_group_mean_on_the_simplex() {
    for _ in 0..ROUNDS {
        let df = DecisionFrame::random();
        let hull = &df.base(Basis::P).hull;
        for group in df.groups() {
            let sum = group.iter().map(|k| hull.mid(*k)).sum::<f64>();
            assert!((sum - 1.).abs() < DTL_EPS);
        }
    }
}

#[test]
fn is_every_mean_inside_its_hull() {
    for _ in 0..ROUNDS {
        let df = DecisionFrame::random();
        for basis in [Basis::P, Basis::V] {
            let hull = &df.base(basis).hull;
            for k in 0..hull.len() {
                assert!(hull.mid(k) >= hull.lo(k) - DTL_EPS);
                assert!(hull.mid(k) <= hull.up(k) + DTL_EPS);
                assert!(hull.lo(k) <= hull.up(k) + DTL_EPS);
            }
        }
    }
}

#[test]
fn is_evaluation_reproducible() {
    for _ in 0..ROUNDS {
        let frame = Frame::random();
        let one = evaluator::evaluate(&frame, 1, Rule::Psi, 1, 0).unwrap();
        let two = evaluator::evaluate(&frame, 1, Rule::Psi, 1, 0).unwrap();
        assert!(one.lo == two.lo);
        assert!(one.up == two.up);
        assert!(one.bn == two.bn);
    }
}

#[test]
fn is_fitted_cdf_anchored_and_monotone() {
    for _ in 0..ROUNDS {
        let frame = Frame::random();
        let entry = evaluator::evaluate(&frame, 1, Rule::Psi, 2, 0).unwrap();
        let bn = &entry.bn;
        assert!(bn.cdf(entry.lo) < 1e-6);
        assert!(bn.cdf(entry.up) > 1. - 1e-6);
        let mut last = -1.;
        for step in 0..=50 {
            let x = entry.lo + (entry.up - entry.lo) * step as f64 / 50.;
            let f = bn.cdf(x);
            assert!(f >= last);
            last = f;
        }
    }
}

#[test]
fn is_every_rule_hull_bracketing_its_mass_point() {
    for _ in 0..ROUNDS {
        let frame = Frame::random();
        for rule in [Rule::Delta, Rule::Gamma, Rule::Psi, Rule::Digamma(0b101)] {
            let entry = evaluator::evaluate(&frame, 1, rule, 1, 2).unwrap();
            let m1 = entry.bn.moments().m1;
            assert!(m1 >= entry.lo - DTL_EPS);
            assert!(m1 <= entry.up + DTL_EPS);
        }
    }
}

#[test]
fn is_delta_of_a_pair_the_psi_difference_in_the_mean() {
    for _ in 0..ROUNDS {
        let frame = Frame::random();
        let delta = evaluator::evaluate(&frame, 1, Rule::Delta, 1, 2).unwrap();
        let one = evaluator::evaluate(&frame, 1, Rule::Psi, 1, 0).unwrap();
        let two = evaluator::evaluate(&frame, 1, Rule::Psi, 2, 0).unwrap();
        let diff = one.bn.moments().m1 - two.bn.moments().m1;
        assert!((delta.bn.moments().m1 - diff).abs() < 1e-9);
    }
}
