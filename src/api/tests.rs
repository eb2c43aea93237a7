use crate::api::engine::Engine;
use crate::api::DtlError;
use crate::base::base::Basis;
use crate::base::statement::Statement;
use crate::bnormal::bnormal::Bnormal;
use crate::moment::moments::Moments;
use crate::moment::rule::Rule;
use crate::DTL_EPS;
use crate::MAX_SUPPORT_LEVEL;

/// scenario fixtures driven through the whole public surface.

/// two alternatives, two consequences each, the probability of the
/// first branch bracketed and everything else free
fn s1() -> Engine {
    let mut engine = Engine::init();
    let fx = engine.new_ps_flat("s1", &[2, 2]).unwrap();
    engine.load(fx).unwrap();
    engine
        .add_stmt(Basis::P, 1, Statement::interval(1, 1, 0.4, 0.6))
        .unwrap();
    engine
        .add_stmt(Basis::P, 1, Statement::interval(2, 1, 0.4, 0.6))
        .unwrap();
    for (alt, cons, lo, up) in [
        (1, 1, 0.6, 0.9),
        (1, 2, 0.1, 0.3),
        (2, 1, 0.2, 0.5),
        (2, 2, 0.4, 0.7),
    ] {
        engine
            .add_stmt(Basis::V, 1, Statement::interval(alt, cons, lo, up))
            .unwrap();
    }
    engine
}

/// a staircase of four cleanly separated alternatives
fn staircase() -> Engine {
    let mut engine = Engine::init();
    let fx = engine.new_ps_flat("stairs", &[1, 1, 1, 1]).unwrap();
    engine.load(fx).unwrap();
    for (alt, lo, up) in [
        (1, 0.8, 0.9),
        (2, 0.55, 0.65),
        (3, 0.3, 0.4),
        (4, 0.05, 0.15),
    ] {
        engine
            .add_stmt(Basis::V, 1, Statement::interval(alt, 1, lo, up))
            .unwrap();
    }
    engine
}

#[test]
fn is_s1_evaluation_bracketing_the_mean() {
    let mut engine = s1();
    let triple = engine.evaluate_frame(1, Rule::Delta, 1, 2).unwrap();
    assert!(triple.lo < triple.mid && triple.mid < triple.up);
    // the inferred complement keeps P1.2 inside [0.4, 0.6]
    let (los, ups, mids) = engine.get_hull(Basis::P, 1).unwrap();
    assert!((los[1] - 0.4).abs() < DTL_EPS);
    assert!((ups[1] - 0.6).abs() < DTL_EPS);
    assert!((mids[0] + mids[1] - 1.).abs() < DTL_EPS);
}

#[test]
fn is_s1_first_alternative_ranked_first() {
    let mut engine = s1();
    let (ranks, _) = engine.rank_alternatives(1, 1).unwrap();
    assert!(ranks == vec![1, 2]);
    let (cd, _) = engine.get_dominance(1, 1, 2).unwrap();
    assert!(cd > 0.);
}

#[test]
fn is_s2_autoscale_normalising() {
    let mut engine = Engine::init();
    let fx = engine.new_pm_flat("s2", 3, 2, &[2, 2, 2]).unwrap();
    engine.load(fx).unwrap();
    let lobox = vec![vec![0., 0.], vec![2., 2.], vec![4., 4.]];
    let upbox = vec![vec![1., 1.], vec![3., 3.], vec![5., 5.]];
    let changed = engine.set_av_box(1, false, false, &lobox, &upbox).unwrap();
    assert!(changed);
    let scale = engine.get_av_crit_scale(1).unwrap();
    assert!(scale.min() == 0. && scale.max() == 5.);
    let (los, ups, _) = engine.get_hull(Basis::V, 1).unwrap();
    for (k, (lo, up)) in [
        (0., 0.2),
        (0., 0.2),
        (0.4, 0.6),
        (0.4, 0.6),
        (0.8, 1.0),
        (0.8, 1.0),
    ]
    .iter()
    .enumerate()
    {
        assert!((los[k] - lo).abs() < 1e-9);
        assert!((ups[k] - up).abs() < 1e-9);
    }
}

#[test]
fn is_s3_failed_mutation_invisible() {
    let mut engine = s1();
    let before = engine.evaluate_frame(1, Rule::Psi, 1, 0).unwrap();
    let count = engine.nbr_of_stmts(Basis::P, 1).unwrap();
    let clash = engine.add_stmt(Basis::P, 1, Statement::interval(1, 1, 0.9, 0.95));
    assert!(clash == Err(DtlError::Inconsistent));
    assert!(engine.nbr_of_stmts(Basis::P, 1).unwrap() == count);
    let after = engine.evaluate_frame(1, Rule::Psi, 1, 0).unwrap();
    assert!((before.lo - after.lo).abs() < 1e-12);
    assert!((before.mid - after.mid).abs() < 1e-12);
    assert!((before.up - after.up).abs() < 1e-12);
}

#[test]
fn is_s4_tornado_antisymmetric_on_symmetric_hulls() {
    let mut engine = s1();
    let shifts = engine.get_v_tornado(1, 0).unwrap();
    for (lo, up) in shifts.iter().flatten() {
        assert!((lo + up).abs() < 2. * crate::T_EPS);
    }
}

#[test]
fn is_s5_transitive_shortcut_reduced() {
    let mut engine = staircase();
    let full = engine.get_dominance_matrix(1, 2, 0.).unwrap();
    assert!(full[0][1] == 1);
    assert!(full[1][2] == 1);
    assert!(full[0][2] == 1);
    let reduced = engine.get_dominance_nt_matrix(1, false, 2, 0.).unwrap();
    assert!(reduced[0][2] == 0);
    assert!(reduced[0][1] == 1);
    assert!(reduced[1][2] == 1);
}

#[test]
fn is_s6_inverse_cdf_a_round_trip() {
    for m3 in [-0.0008, 0., 0.0008] {
        let m = Moments {
            m1: 0.4,
            m2: 0.01,
            m3,
        };
        let bn = Bnormal::fit(m, 0., 1.);
        let sd = m.m2.sqrt();
        let mut x = (m.m1 - 3. * sd).max(0.);
        while x <= (m.m1 + 3. * sd).min(1.) {
            assert!((bn.inv_cdf(bn.cdf(x)) - x).abs() < 1e-4);
            x += 0.01;
        }
    }
}

#[test]
fn is_mass_query_cache_gated() {
    let mut engine = s1();
    // nothing evaluated yet
    assert!(engine.get_mass_above(1, 0.5) == Err(DtlError::NotEvaluated));
    engine.evaluate_frame(1, Rule::Psi, 1, 0).unwrap();
    let above = engine.get_mass_above(1, 0.5).unwrap();
    let below = engine.get_mass_below(1, 0.5).unwrap();
    assert!((above + below - 1.).abs() < 1e-6);
    // any mutation drops the cache
    engine
        .add_stmt(Basis::P, 1, Statement::interval(1, 2, 0.4, 0.6))
        .unwrap();
    assert!(engine.get_mass_above(1, 0.5) == Err(DtlError::NotEvaluated));
}

#[test]
fn is_support_interval_consistent_with_mass() {
    let mut engine = s1();
    engine.evaluate_frame(1, Rule::Psi, 1, 0).unwrap();
    for belief in [0.5, 0.8, MAX_SUPPORT_LEVEL] {
        let (lo, up) = engine.get_support_mass(1, belief).unwrap();
        let above = engine.get_mass_above(1, lo).unwrap();
        let below = engine.get_mass_below(1, up).unwrap();
        assert!((above + below - (1. + belief)).abs() < 1e-4);
    }
}

#[test]
fn is_aversion_value_tailed() {
    let mut engine = s1();
    engine.evaluate_frame(1, Rule::Psi, 1, 0).unwrap();
    let timid = engine.get_aversion_value(1, -8.).unwrap();
    let median = engine.get_aversion_value(1, 0.).unwrap();
    let bold = engine.get_aversion_value(1, 8.).unwrap();
    assert!(timid < median);
    assert!(median < bold);
}

#[test]
fn is_abort_unwinding_the_matrix() {
    let mut engine = staircase();
    let abort = engine.abort();
    abort.raise();
    assert!(engine.get_dominance_matrix(1, 2, 0.) == Err(DtlError::UserAbort));
    // the flag clears with the pass, so the next call runs
    assert!(engine.get_dominance_matrix(1, 2, 0.).is_ok());
}

#[test]
fn is_exit_leak_checked() {
    let mut engine = Engine::init();
    let fx = engine.new_ps_flat("leaky", &[1]).unwrap();
    assert!(engine.exit() == Err(DtlError::MemoryLeak));
    let mut engine = Engine::init();
    let fx2 = engine.new_ps_flat("tidy", &[1]).unwrap();
    assert!(fx == fx2);
    engine.dispose(fx2).unwrap();
    assert!(engine.exit().is_ok());
}

#[test]
fn is_wrong_frame_type_refused() {
    let mut engine = s1();
    // weight operations need a multi-criterion frame
    assert!(
        engine.add_stmt(Basis::W, 0, Statement::interval(1, 1, 0.2, 0.4))
            == Err(DtlError::WrongFrameType)
    );
    assert!(engine.evaluate_frame(0, Rule::Psi, 1, 0) == Err(DtlError::WrongFrameType));
}

#[test]
fn is_mc_pipeline_end_to_end() {
    let mut engine = Engine::init();
    let fx = engine.new_pm_flat("mc", 2, 2, &[1, 1]).unwrap();
    engine.load(fx).unwrap();
    for (crit, v1, v2) in [(1, 0.9, 0.2), (2, 0.3, 0.8)] {
        engine
            .add_stmt(Basis::V, crit, Statement::interval(1, 1, v1 - 0.05, v1 + 0.05))
            .unwrap();
        engine
            .add_stmt(Basis::V, crit, Statement::interval(2, 1, v2 - 0.05, v2 + 0.05))
            .unwrap();
    }
    // tilt the weights toward the first criterion
    engine
        .add_stmt(Basis::W, 0, Statement::interval(1, 1, 0.7, 0.9))
        .unwrap();
    let triple = engine.evaluate_frame(0, Rule::Psi, 1, 0).unwrap();
    assert!(triple.mid > 0.5);
    let (ranks, _) = engine.rank_alternatives(0, 1).unwrap();
    assert!(ranks[0] == 1);
    let (parts, total) = engine.evaluate_omega(1).unwrap();
    assert!(parts.len() == 2);
    assert!(total > 0.5);
    let absolute = engine.get_abs_dominance_matrix(2, 0.).unwrap();
    // criterion 2 reverses the order, so nothing dominates absolutely
    assert!(absolute.iter().flatten().all(|d| *d == 0));
}

#[test]
fn is_modal_round_trip_idempotent() {
    let mut engine = s1();
    // V1.1 spans [0.6, 0.9]; a mode at 0.75 means a mean at 0.75
    engine.set_modal(1, 1, 1, 0.75).unwrap();
    assert!(engine.check_modality(1, 1, 1).unwrap());
    let modal = engine.get_modal(1, 1, 1).unwrap();
    assert!((modal - 0.75).abs() < DTL_EPS);
    // an off-centre mode survives the conversion too
    engine.set_modal(1, 1, 1, 0.65).unwrap();
    let modal = engine.get_modal(1, 1, 1).unwrap();
    assert!((modal - 0.65).abs() < DTL_EPS);
    let matrix = engine.modality_matrix(1).unwrap();
    assert!(matrix[0][0]);
}

#[test]
fn is_full_expansion_mode_swapping_the_mid_row() {
    let mut engine = s1();
    let raw = engine.evaluate_full(1, Rule::Psi, 1, 0, 0).unwrap();
    let swapped = engine.evaluate_full(1, Rule::Psi, 1, 0, 2).unwrap();
    // outer rows agree, the mid row starts from the mean instead
    assert!(raw[0] == swapped[0]);
    assert!(raw[2] == swapped[2]);
    assert!((raw[1][0] - (raw[0][0] + raw[2][0]) / 2.).abs() < 1e-9);
    let triple = engine.evaluate_frame(1, Rule::Psi, 1, 0).unwrap();
    assert!(triple.lo <= swapped[1][0] && swapped[1][0] <= triple.up);
}

#[test]
fn is_pm_criterion_lifecycle_guarded() {
    use crate::frame::node::TreeRecord;
    let mut engine = Engine::init();
    let weight = [
        TreeRecord::from(('E', 0, 2)),
        TreeRecord::from(('C', 3, 0)),
        TreeRecord::from(('C', 0, 0)),
    ];
    let fx = engine.new_pm_tree("staged", 2, &weight).unwrap();
    engine.load(fx).unwrap();
    assert!(!engine.pm_crit_exists(1).unwrap());
    assert!(engine.load_pm_crit(1) == Err(DtlError::BadCriterion));
    let alt = [TreeRecord::from(('C', 0, 0))];
    engine.new_pm_crit_tree(1, &[alt.to_vec(), alt.to_vec()]).unwrap();
    assert!(engine.pm_crit_exists(1).unwrap());
    engine.load_pm_crit(1).unwrap();
    engine.unload_pm_crit().unwrap();
    engine.delete_pm_crit(1).unwrap();
    assert!(!engine.pm_crit_exists(1).unwrap());
}

#[test]
fn is_snapshot_adoptable() {
    let path = std::env::temp_dir().join("api_snapshot.dmc");
    let mut engine = s1();
    let fx = engine.load_status().unwrap();
    crate::save::dmc::save(engine.snapshot(fx).unwrap(), &path).unwrap();
    let (frame, skipped) = crate::save::dmc::load(&path).unwrap();
    assert!(skipped == 0);
    let adopted = engine.adopt(frame).unwrap();
    engine.unload().unwrap();
    engine.load(adopted).unwrap();
    let triple = engine.evaluate_frame(1, Rule::Psi, 1, 0).unwrap();
    assert!(triple.lo < triple.up);
    assert!(engine.nbr_of_stmts(Basis::P, 1).unwrap() == 2);
    std::fs::remove_file(&path).ok();
}

#[test]
fn is_load_exclusive_and_recoverable() {
    let mut engine = Engine::init();
    let one = engine.new_ps_flat("one", &[1]).unwrap();
    let two = engine.new_ps_flat("two", &[1]).unwrap();
    engine.load(one).unwrap();
    assert!(engine.load(two) == Err(DtlError::FrameInUse));
    assert!(engine.load_status() == Some(one));
    engine.unload().unwrap();
    engine.load(two).unwrap();
    assert!(engine.frame_name(two).unwrap() == "two");
}
