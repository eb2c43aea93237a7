use crate::api::code::Dtl;
use crate::api::code::DtlError;
use crate::api::gate::Abort;
use crate::api::gate::Gate;
use crate::api::report;
use crate::api::report::Report;
use crate::api::report::Triple;
use crate::arena::registry::Arena;
use crate::arena::tag::Tag;
use crate::base::base::Basis;
use crate::base::statement::Statement;
use crate::dominance::absolute;
use crate::dominance::dominance;
use crate::dominance::rank as dominance_rank;
use crate::dominance::reduction;
use crate::eval::cache::Entry;
use crate::eval::daisy;
use crate::eval::evaluator;
use crate::eval::mass;
use crate::eval::rank;
use crate::frame::frame::DecisionFrame;
use crate::frame::kind::FrameKind;
use crate::frame::manager::Frame;
use crate::frame::manager::Manager;
use crate::frame::node::TreeRecord;
use crate::frame::topology::Topology;
use crate::moment::rule::Rule;
use crate::moment::triangle;
use crate::scale::autoscale;
use crate::scale::convert;
use crate::scale::scale::Scale;
use crate::tornado::influence;
use crate::tornado::tornado;
use crate::tornado::weights;
use crate::Mass;
use crate::MAX_RESULTSTEPS;

/// the engine: the frame registry, the allocation registry, and the
/// re-entrancy gate every public operation passes through. one frame
/// is loaded at a time; multi-criterion operations move the attached
/// marker around internally and put it back.
pub struct Engine {
    arena: Arena,
    frames: Manager,
    gate: Gate,
}

impl Default for Engine {
    fn default() -> Self {
        Self::init()
    }
}

impl Engine {
    // ── lifecycle ──

    pub fn init() -> Self {
        log::info!("engine up");
        Self {
            arena: Arena::default(),
            frames: Manager::new(),
            gate: Gate::default(),
        }
    }

    /// tear down, checking that every registered allocation was
    /// released; a survivor is reported as a leak
    pub fn exit(self) -> Dtl<()> {
        match self.arena.leaks() {
            0 => {
                log::info!("engine down");
                Ok(())
            }
            n => {
                log::warn!("exit with {} survivors: {:?}", n, self.arena.survivors());
                Err(DtlError::MemoryLeak)
            }
        }
    }

    /// cloneable cancellation handle for a host thread
    pub fn abort(&self) -> Abort {
        self.gate.abort()
    }

    // ── frame lifecycle ──

    pub fn new_ps_flat(&mut self, name: &str, cons: &[usize]) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.single(FrameKind::PS, name, DecisionFrame::flat(name, cons)?)
    }
    pub fn new_ps_tree(&mut self, name: &str, alts: &[Vec<TreeRecord>]) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.single(FrameKind::PS, name, Self::grown(name, alts)?)
    }
    pub fn new_dm_flat(&mut self, name: &str, cons: &[usize]) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.single(FrameKind::DM, name, DecisionFrame::flat(name, cons)?)
    }
    pub fn new_dm_tree(&mut self, name: &str, alts: &[Vec<TreeRecord>]) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.single(FrameKind::DM, name, Self::grown(name, alts)?)
    }
    pub fn new_sm_tree(&mut self, name: &str, alts: &[Vec<TreeRecord>]) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.single(FrameKind::SM, name, Self::grown(name, alts)?)
    }
    pub fn new_pm_flat(
        &mut self,
        name: &str,
        n_alts: usize,
        n_crit: usize,
        cons: &[usize],
    ) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        let frame = Frame::pm_flat(name, n_alts, n_crit, cons)?;
        self.park(frame)
    }
    pub fn new_pm_tree(&mut self, name: &str, n_alts: usize, weight: &[TreeRecord]) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        let frame = Frame::pm_tree(name, n_alts, Topology::tree(weight)?)?;
        self.park(frame)
    }

    /// install a tree criterion on the loaded multi-criterion frame
    pub fn new_pm_crit_tree(&mut self, crit: usize, alts: &[Vec<TreeRecord>]) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        let frame = self.frames.current()?;
        let name = format!("{}.{}", frame.name(), crit);
        let mut df = Self::grown(&name, alts)?;
        df.attach(frame.kind())?;
        frame.set_crit(crit, df)
    }
    pub fn delete_pm_crit(&mut self, crit: usize) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.frames.current()?.delete_crit(crit)
    }
    pub fn pm_crit_exists(&self, crit: usize) -> Dtl<bool> {
        let _pass = self.gate.enter()?;
        Ok(self.frames.current_ref()?.crit_exists(crit))
    }
    /// move the attached-criterion marker onto one criterion
    pub fn load_pm_crit(&mut self, crit: usize) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        let frame = self.frames.current()?;
        frame.weights()?;
        match frame.crit_exists(crit) {
            true => {
                frame.mark(crit as i32);
                Ok(())
            }
            false => Err(DtlError::BadCriterion),
        }
    }
    pub fn unload_pm_crit(&mut self) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        let frame = self.frames.current()?;
        frame.weights()?;
        frame.mark(0);
        Ok(())
    }

    pub fn load(&mut self, fx: usize) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.frames.load(fx)
    }
    pub fn unload(&mut self) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.frames.unload()
    }
    pub fn dispose(&mut self, fx: usize) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.frames.dispose(fx)?;
        self.arena.release(Tag::Frame, "frame slot");
        Ok(())
    }
    pub fn frame_name(&self, fx: usize) -> Dtl<String> {
        Ok(self.frames.get(fx)?.name().to_string())
    }
    pub fn frame_type(&self, fx: usize) -> Dtl<FrameKind> {
        Ok(self.frames.get(fx)?.kind())
    }
    /// the loaded frame index, if any
    pub fn load_status(&self) -> Option<usize> {
        self.frames.loaded()
    }

    // ── base mutation ──

    pub fn add_stmt(&mut self, basis: Basis, crit: i32, stmt: Statement) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.add_stmt(basis, stmt)
    }
    pub fn change_stmt(
        &mut self,
        basis: Basis,
        crit: i32,
        ix: usize,
        lobo: f64,
        upbo: f64,
    ) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.change_stmt(basis, ix, lobo, upbo)
    }
    pub fn replace_stmt(&mut self, basis: Basis, crit: i32, ix: usize, stmt: Statement) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.replace_stmt(basis, ix, stmt)
    }
    pub fn delete_stmt(&mut self, basis: Basis, crit: i32, ix: usize) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.delete_stmt(basis, ix)
    }
    pub fn add_mid_stmt(
        &mut self,
        basis: Basis,
        crit: i32,
        alt: usize,
        node: usize,
        lobo: f64,
        upbo: f64,
    ) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?
            .add_mid_stmt(basis, alt, node, lobo, upbo)
    }
    pub fn delete_mid_stmt(&mut self, basis: Basis, crit: i32, alt: usize, node: usize) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.delete_mid_stmt(basis, alt, node)
    }
    pub fn set_box(&mut self, basis: Basis, crit: i32, los: &[f64], ups: &[f64]) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.set_box(basis, los, ups)
    }
    pub fn set_mbox(&mut self, basis: Basis, crit: i32, los: &[f64], ups: &[f64]) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.set_mbox(basis, los, ups)
    }
    /// single-bound variant aliasing both midpoint bounds
    pub fn set_mbox1(&mut self, basis: Basis, crit: i32, mids: &[f64]) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.set_mbox(basis, mids, mids)
    }
    pub fn remove_mbox(&mut self, basis: Basis, crit: i32) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.remove_mbox(basis)
    }
    pub fn reset_base(&mut self, basis: Basis, crit: i32) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        self.target(basis, crit)?.reset_base(basis)
    }
    /// the consolidated hull of a base
    pub fn get_hull(&mut self, basis: Basis, crit: i32) -> Dtl<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let _pass = self.gate.enter()?;
        let hull = &self.target(basis, crit)?.base(basis).hull;
        Ok((
            hull.los().to_vec(),
            hull.ups().to_vec(),
            hull.mids().to_vec(),
        ))
    }

    // ── value-base modality ──

    /// load a modal value by converting it to the mean of the
    /// triangular fit over the variable's hull
    pub fn set_modal(&mut self, crit: i32, alt: usize, cons: usize, modal: f64) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        let df = self.target(Basis::V, crit)?;
        let k = df.variable(Basis::V, alt, cons)?;
        let hull = &df.base(Basis::V).hull;
        if modal < hull.lo(k) - crate::DTL_EPS || modal > hull.up(k) + crate::DTL_EPS {
            return Err(DtlError::BadBounds);
        }
        let mean = triangle::mean(hull.lo(k), modal, hull.up(k));
        df.add_mid_stmt(Basis::V, alt, cons, mean, mean)
    }
    /// recover the modal value from the stored mean
    pub fn get_modal(&mut self, crit: i32, alt: usize, cons: usize) -> Dtl<f64> {
        let _pass = self.gate.enter()?;
        let df = self.target(Basis::V, crit)?;
        let k = df.variable(Basis::V, alt, cons)?;
        let hull = &df.base(Basis::V).hull;
        Ok(triangle::modal(hull.lo(k), hull.mid(k), hull.up(k)))
    }
    pub fn check_modality(&mut self, crit: i32, alt: usize, cons: usize) -> Dtl<bool> {
        let _pass = self.gate.enter()?;
        let df = self.target(Basis::V, crit)?;
        let k = df.variable(Basis::V, alt, cons)?;
        let hull = &df.base(Basis::V).hull;
        Ok(triangle::modality(hull.lo(k), hull.mid(k), hull.up(k)))
    }
    pub fn modality_matrix(&mut self, crit: i32) -> Dtl<Vec<Vec<bool>>> {
        let _pass = self.gate.enter()?;
        let df = self.target(Basis::V, crit)?;
        let maps = df.maps();
        let hull = &df.base(Basis::V).hull;
        Ok((1..=df.n_alts())
            .map(|alt| {
                (1..=maps.reals(alt))
                    .map(|r| {
                        let k = maps.real_of(alt, r);
                        triangle::modality(hull.lo(k), hull.mid(k), hull.up(k))
                    })
                    .collect()
            })
            .collect())
    }

    // ── autoscale ──

    /// returns true when the criterion scale changed
    pub fn set_av_box(
        &mut self,
        crit: usize,
        rev: bool,
        renorm: bool,
        lobox: &[Vec<f64>],
        upbox: &[Vec<f64>],
    ) -> Dtl<bool> {
        let _pass = self.gate.enter()?;
        autoscale::set_av_box(self.frames.current()?, crit, rev, renorm, lobox, upbox)
    }
    pub fn set_av_modal(
        &mut self,
        crit: usize,
        mode: i32,
        rev: bool,
        renorm: bool,
        lobox: &[Vec<f64>],
        modalx: &[Vec<f64>],
        upbox: &[Vec<f64>],
    ) -> Dtl<bool> {
        let _pass = self.gate.enter()?;
        autoscale::set_av_modal(
            self.frames.current()?,
            crit,
            mode,
            rev,
            renorm,
            lobox,
            modalx,
            upbox,
        )
    }
    pub fn set_av_mbox(&mut self, crit: usize, lobox: &[Vec<f64>], upbox: &[Vec<f64>]) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        autoscale::set_av_mbox(self.frames.current()?, crit, lobox, upbox)
    }
    pub fn set_av_mbox1(&mut self, crit: usize, midx: &[Vec<f64>]) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        autoscale::set_av_mbox1(self.frames.current()?, crit, midx)
    }
    pub fn get_av_crit_scale(&self, crit: usize) -> Dtl<Scale> {
        autoscale::get_av_crit_scale(self.frames.current_ref()?, crit)
    }
    pub fn get_av_mc_scale(&self) -> Dtl<Scale> {
        Ok(autoscale::get_av_mc_scale(self.frames.current_ref()?))
    }
    pub fn set_av_mc_scale(&mut self, scale: Scale) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        autoscale::set_av_mc_scale(self.frames.current()?, scale);
        Ok(())
    }
    pub fn copy_av_mc_scale(&mut self, crit: usize) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        autoscale::copy_av_mc_scale(self.frames.current()?, crit)
    }
    pub fn reset_av_mc_scale(&mut self) -> Dtl<()> {
        let _pass = self.gate.enter()?;
        autoscale::reset_av_mc_scale(self.frames.current()?);
        Ok(())
    }
    pub fn get_scale_ratio(&self, c_from: usize, c_to: usize, mode: i32) -> Dtl<f64> {
        autoscale::scale_ratio(self.frames.current_ref()?, c_from, c_to, mode)
    }

    /// user-scale reading of a normalised value, per conversion type
    pub fn get_av_user_value(&self, crit: usize, mode: i32, norm: f64) -> Dtl<f64> {
        let scale = self.crit_or_mc_scale(crit)?;
        convert::to_user(&scale, convert::Kind::try_from(mode)?, norm)
    }
    pub fn get_av_user_vector(&self, crit: usize, mode: i32, norms: &[f64]) -> Dtl<Vec<f64>> {
        norms
            .iter()
            .map(|n| self.get_av_user_value(crit, mode, *n))
            .collect()
    }
    pub fn get_av_user_interval(&self, crit: usize, mode: i32, lo: f64, up: f64) -> Dtl<(f64, f64)> {
        let scale = self.crit_or_mc_scale(crit)?;
        convert::to_user_interval(&scale, convert::Kind::try_from(mode)?, lo, up)
    }
    pub fn get_av_user_intervals(
        &self,
        crit: usize,
        mode: i32,
        los: &[f64],
        ups: &[f64],
    ) -> Dtl<Vec<(f64, f64)>> {
        los.iter()
            .zip(ups.iter())
            .map(|(lo, up)| self.get_av_user_interval(crit, mode, *lo, *up))
            .collect()
    }
    /// normalised reading of a user value, the inverse direction
    pub fn get_av_norm_value(&self, crit: usize, mode: i32, user: f64) -> Dtl<f64> {
        let scale = self.crit_or_mc_scale(crit)?;
        convert::to_norm(&scale, convert::Kind::try_from(mode)?, user)
    }
    pub fn get_av_norm_vector(&self, crit: usize, mode: i32, users: &[f64]) -> Dtl<Vec<f64>> {
        users
            .iter()
            .map(|u| self.get_av_norm_value(crit, mode, *u))
            .collect()
    }
    pub fn get_av_norm_interval(&self, crit: usize, mode: i32, lo: f64, up: f64) -> Dtl<(f64, f64)> {
        let a = self.get_av_norm_value(crit, mode, lo)?;
        let b = self.get_av_norm_value(crit, mode, up)?;
        Ok((a.min(b), a.max(b)))
    }
    pub fn get_av_norm_intervals(
        &self,
        crit: usize,
        mode: i32,
        los: &[f64],
        ups: &[f64],
    ) -> Dtl<Vec<(f64, f64)>> {
        los.iter()
            .zip(ups.iter())
            .map(|(lo, up)| self.get_av_norm_interval(crit, mode, *lo, *up))
            .collect()
    }
    /// are all user values legal for this scale and conversion type
    pub fn check_av_user_values(&self, crit: usize, mode: i32, values: &[f64]) -> Dtl<()> {
        let scale = self.crit_or_mc_scale(crit)?;
        convert::check(&scale, convert::Kind::try_from(mode)?, values)
    }

    // ── evaluation ──

    pub fn evaluate_frame(&mut self, crit: i32, rule: Rule, i: usize, j: usize) -> Dtl<Triple> {
        let _pass = self.gate.enter()?;
        let frame = self.frames.current()?;
        let entry = evaluator::evaluate(frame, crit, rule, i, j)?;
        let triple = Triple {
            lo: entry.lo,
            mid: entry.mid,
            up: entry.up,
        };
        if entry.bn.weak() {
            log::debug!("weak mass distribution on criterion {}", crit);
        }
        frame.cache().put(crit, entry);
        Ok(triple)
    }
    pub fn evaluate_full(
        &mut self,
        crit: i32,
        rule: Rule,
        i: usize,
        j: usize,
        mode: i32,
    ) -> Dtl<[[f64; MAX_RESULTSTEPS]; 3]> {
        let _pass = self.gate.enter()?;
        let frame = self.frames.current()?;
        let entry = evaluator::evaluate(frame, crit, rule, i, j)?;
        let steps = evaluator::expand(&entry, mode)?;
        frame.cache().put(crit, entry);
        Ok(steps)
    }
    pub fn evaluate_omega(&mut self, alt: usize) -> Dtl<(Vec<f64>, f64)> {
        let _pass = self.gate.enter()?;
        evaluator::omega(self.frames.current()?, alt)
    }
    pub fn evaluate_omega1(&mut self, alt: usize) -> Dtl<Vec<f64>> {
        let _pass = self.gate.enter()?;
        evaluator::omega1(self.frames.current()?, alt)
    }

    pub fn get_mass_above(&mut self, crit: i32, level: f64) -> Dtl<Mass> {
        let _pass = self.gate.enter()?;
        Ok(mass::mass_above(&self.entry(crit)?, level))
    }
    pub fn get_mass_below(&mut self, crit: i32, level: f64) -> Dtl<Mass> {
        let _pass = self.gate.enter()?;
        Ok(mass::mass_below(&self.entry(crit)?, level))
    }
    pub fn get_mass_range(&mut self, crit: i32, lo: f64, up: f64) -> Dtl<Mass> {
        let _pass = self.gate.enter()?;
        mass::mass_range(&self.entry(crit)?, lo, up)
    }
    pub fn get_mass_density(&mut self, crit: i32, level: f64) -> Dtl<Mass> {
        let _pass = self.gate.enter()?;
        Ok(mass::mass_density(&self.entry(crit)?, level))
    }
    pub fn get_support_mass(&mut self, crit: i32, belief: f64) -> Dtl<(f64, f64)> {
        let _pass = self.gate.enter()?;
        mass::support_interval(&self.entry(crit)?, belief)
    }
    pub fn get_support_lower(&mut self, crit: i32, belief: f64) -> Dtl<f64> {
        let _pass = self.gate.enter()?;
        mass::support_lower(&self.entry(crit)?, belief)
    }
    pub fn get_support_upper(&mut self, crit: i32, belief: f64) -> Dtl<f64> {
        let _pass = self.gate.enter()?;
        mass::support_upper(&self.entry(crit)?, belief)
    }
    pub fn get_aversion_value(&mut self, crit: i32, r: f64) -> Dtl<f64> {
        let _pass = self.gate.enter()?;
        mass::aversion(&self.entry(crit)?, r)
    }

    pub fn compare_alternatives(&mut self, crit: i32, i: usize, j: usize) -> Dtl<rank::Comparison> {
        let _pass = self.gate.enter()?;
        rank::compare_alternatives(self.frames.current()?, crit, i, j)
    }
    pub fn delta_mass(&mut self, crit: i32, i: usize, j: usize) -> Dtl<Mass> {
        let _pass = self.gate.enter()?;
        rank::delta_mass(self.frames.current()?, crit, i, j)
    }
    /// ranks per alternative plus the differing-orders flag
    pub fn rank_alternatives(&mut self, crit: i32, mode: i32) -> Dtl<(Vec<usize>, bool)> {
        let _pass = self.gate.enter()?;
        rank::rank_alternatives(self.frames.current()?, crit, mode)
    }
    pub fn daisy_chain(&mut self, crit: i32, mode: i32) -> Dtl<(Vec<usize>, Vec<f64>)> {
        let _pass = self.gate.enter()?;
        daisy::daisy_chain(self.frames.current()?, crit, mode)
    }
    pub fn pie_chart(&mut self, crit: i32, mode: i32) -> Dtl<Vec<f64>> {
        let _pass = self.gate.enter()?;
        daisy::pie_chart(self.frames.current()?, crit, mode)
    }
    pub fn sec_level(&mut self, crit: i32, level: f64) -> Dtl<Vec<f64>> {
        let _pass = self.gate.enter()?;
        rank::sec_level(self.frames.current()?, crit, level)
    }

    // ── dominance ──

    pub fn get_dominance(&mut self, crit: i32, i: usize, j: usize) -> Dtl<(f64, i32)> {
        let _pass = self.gate.enter()?;
        dominance::get_dominance(self.frames.current()?, crit, i, j)
    }
    pub fn get_dominance_matrix(&mut self, crit: i32, dmode: i32, threshold: f64) -> Dtl<Vec<Vec<i32>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        dominance::dominance_matrix(self.frames.current()?, crit, dmode, threshold, &abort)
    }
    pub fn get_dominance_nt_matrix(
        &mut self,
        crit: i32,
        strict: bool,
        dmode: i32,
        threshold: f64,
    ) -> Dtl<Vec<Vec<i32>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        let matrix =
            dominance::dominance_matrix(self.frames.current()?, crit, dmode, threshold, &abort)?;
        Ok(reduction::reduce(&matrix, strict))
    }
    pub fn get_dominance_rank(
        &mut self,
        crit: i32,
        mode: i32,
        dmode: i32,
        threshold: f64,
    ) -> Dtl<Vec<usize>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        dominance_rank::dominance_rank(self.frames.current()?, crit, mode, dmode, threshold, &abort)
    }
    pub fn get_cardinal_dominance_matrix(&mut self, crit: i32) -> Dtl<Vec<Vec<f64>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        dominance::cardinal_matrix(self.frames.current()?, crit, &abort)
    }
    pub fn get_abs_dominance_matrix(&mut self, dmode: i32, threshold: f64) -> Dtl<Vec<Vec<i32>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        absolute::abs_dominance_matrix(self.frames.current()?, dmode, threshold, &abort)
    }

    // ── sensitivity ──

    pub fn get_p_tornado(&mut self, crit: i32, mode: i32) -> Dtl<Vec<Vec<(f64, f64)>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        tornado::p_tornado(self.frames.current()?, crit, mode, &abort)
    }
    pub fn get_v_tornado(&mut self, crit: i32, mode: i32) -> Dtl<Vec<Vec<(f64, f64)>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        tornado::v_tornado(self.frames.current()?, crit, mode, &abort)
    }
    pub fn get_mcp_tornado(&mut self, crit: i32, mode: i32) -> Dtl<Vec<Vec<(f64, f64)>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        weights::mcp_tornado(self.frames.current()?, crit, mode, &abort)
    }
    pub fn get_mcv_tornado(&mut self, crit: i32, mode: i32) -> Dtl<Vec<Vec<(f64, f64)>>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        weights::mcv_tornado(self.frames.current()?, crit, mode, &abort)
    }
    pub fn get_w_tornado(&mut self, mode: i32) -> Dtl<Vec<(f64, f64)>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        weights::w_tornado(self.frames.current()?, mode, &abort)
    }
    pub fn get_w_tornado_alt(&mut self, alt: usize, mode: i32) -> Dtl<Vec<(f64, f64)>> {
        let _pass = self.gate.enter()?;
        let abort = self.gate.abort();
        weights::w_tornado_alt(self.frames.current()?, alt, mode, &abort)
    }
    pub fn get_cons_influence(&mut self, crit: i32) -> Dtl<Vec<Vec<f64>>> {
        let _pass = self.gate.enter()?;
        influence::cons_influence(self.frames.current()?, crit)
    }

    // ── introspection ──

    pub fn nbr_of_stmts(&self, basis: Basis, crit: i32) -> Dtl<usize> {
        let frame = self.frames.current_ref()?;
        let df = match basis {
            Basis::W => frame.weights()?,
            _ => frame.df(Self::positive(crit)?)?,
        };
        Ok(df.base(basis).n_stmts())
    }
    pub fn nbr_of_alts(&self) -> Dtl<usize> {
        Ok(self.frames.current_ref()?.n_alts())
    }
    pub fn nbr_of_crit(&self) -> Dtl<usize> {
        Ok(self.frames.current_ref()?.n_crit())
    }
    /// real criteria on the weight tree
    pub fn nbr_of_weights(&self) -> Dtl<usize> {
        Ok(self.frames.current_ref()?.weights()?.maps().n_real())
    }
    pub fn nbr_of_cons(&self, crit: i32, alt: usize) -> Dtl<usize> {
        let frame = self.frames.current_ref()?;
        let df = frame.df(Self::positive(crit)?)?;
        df.alt(alt)?;
        Ok(df.maps().reals(alt))
    }
    pub fn nbr_of_nodes(&self, crit: i32, alt: usize) -> Dtl<usize> {
        let frame = self.frames.current_ref()?;
        let df = frame.df(Self::positive(crit)?)?;
        df.alt(alt)?;
        Ok(df.maps().tot(alt))
    }
    pub fn code_text(code: i32) -> &'static str {
        DtlError::code_text(code)
    }

    /// the structured report the CLI serialises
    pub fn report(&mut self, crit: i32) -> Dtl<Report> {
        let _pass = self.gate.enter()?;
        report::assemble(self.frames.current()?, crit)
    }

    // ── persistence access ──

    /// read-only view for the snapshot layer
    pub fn snapshot(&self, fx: usize) -> Dtl<&Frame> {
        self.frames.get(fx)
    }
    /// park an externally rebuilt frame, e.g. a loaded snapshot
    pub fn adopt(&mut self, frame: Frame) -> Dtl<usize> {
        let _pass = self.gate.enter()?;
        self.park(frame)
    }

    // ── plumbing ──

    /// register a single-criterion frame under its kind
    fn single(&mut self, kind: FrameKind, name: &str, df: DecisionFrame) -> Dtl<usize> {
        let frame = Frame::single(kind, name, df)?;
        self.park(frame)
    }
    fn park(&mut self, frame: Frame) -> Dtl<usize> {
        let fx = self.frames.create(frame)?;
        self.arena.register(Tag::Frame, "frame slot");
        log::info!("frame {} parked", fx);
        Ok(fx)
    }
    fn grown(name: &str, alts: &[Vec<TreeRecord>]) -> Dtl<DecisionFrame> {
        let tops = alts
            .iter()
            .map(|records| Topology::tree(records))
            .collect::<Dtl<Vec<_>>>()?;
        DecisionFrame::tree(name, tops)
    }

    /// the frame a base operation addresses: the weight frame for W,
    /// the criterion frame otherwise
    fn target(&mut self, basis: Basis, crit: i32) -> Dtl<&mut DecisionFrame> {
        let frame = self.frames.current()?;
        match basis {
            Basis::W => frame.weights_mut(),
            _ => frame.df_mut(Self::positive(crit)?),
        }
    }
    fn positive(crit: i32) -> Dtl<usize> {
        match crit >= 1 {
            true => Ok(crit as usize),
            false => Err(DtlError::BadCriterion),
        }
    }
    fn crit_or_mc_scale(&self, crit: usize) -> Dtl<Scale> {
        let frame = self.frames.current_ref()?;
        match crit {
            0 => Ok(*frame.mc_scale()),
            c => Ok(*frame.df(c)?.scale()),
        }
    }
    /// the cached evaluation mass queries read; criterion 0 falls
    /// back on the latest aggregate evaluation
    fn entry(&mut self, crit: i32) -> Dtl<Entry> {
        let frame = self.frames.current()?;
        let cache = frame.cache();
        let slot = match cache.get(crit) {
            Some(entry) => Some(entry),
            None if crit == 0 => cache.latest_mc().and_then(|mc| cache.get(mc)),
            None => None,
        };
        slot.cloned().ok_or(DtlError::NotEvaluated)
    }
}
