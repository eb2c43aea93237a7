use crate::api::code::Kernel;
use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::base::Base;
use crate::base::base::Basis;
use crate::base::base::Undo;
use crate::base::statement::Statement;
use crate::base::statement::Term;
use crate::frame::kind::FrameKind;
use crate::frame::maps::IndexMaps;
use crate::frame::topology::Topology;
use crate::hull::hull;
use crate::scale::scale::Scale;
use crate::MAX_ALTS;

/// one criterion's decision frame: the alternatives' trees, the P- and
/// V-bases over their variables, the index maps, and the per-criterion
/// value scale. the weight tree of a multi-criterion frame is the same
/// structure with a single "alternative" whose real leaves are the
/// criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionFrame {
    name: String,
    alts: Vec<Topology>,
    maps: IndexMaps,
    groups: Vec<Vec<usize>>,
    pbase: Base,
    vbase: Base,
    scale: Scale,
    attached: bool,
}

impl DecisionFrame {
    /// flat frame: one chain of consequences per alternative
    pub fn flat(name: &str, cons: &[usize]) -> Dtl<Self> {
        let alts = cons
            .iter()
            .map(|n| Topology::flat(*n))
            .collect::<Dtl<Vec<_>>>()?;
        Self::assemble(name, alts)
    }
    /// tree frame from per-alternative topologies
    pub fn tree(name: &str, alts: Vec<Topology>) -> Dtl<Self> {
        Self::assemble(name, alts)
    }

    fn assemble(name: &str, alts: Vec<Topology>) -> Dtl<Self> {
        if alts.is_empty() || alts.len() > MAX_ALTS {
            return Err(DtlError::Overflow);
        }
        let maps = IndexMaps::from(&alts[..]);
        let flat = &maps;
        let groups = alts
            .iter()
            .enumerate()
            .flat_map(|(a, top)| {
                top.groups()
                    .into_iter()
                    .map(move |(_, members)| {
                        members
                            .iter()
                            .map(|m| flat.flat(a + 1, *m))
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let pbase = Base::new(Basis::P, maps.n_flat());
        let vbase = Base::new(Basis::V, maps.n_real());
        Ok(Self {
            name: name.to_string(),
            alts,
            maps,
            groups,
            pbase,
            vbase,
            scale: Scale::unit(),
            attached: false,
        })
    }

    /// attach: validate the topology against the frame flavor and run
    /// the loader over both bases
    pub fn attach(&mut self, kind: FrameKind) -> Dtl<()> {
        for top in self.alts.iter() {
            top.validate(kind)?;
        }
        self.consolidate(Basis::P)?;
        self.consolidate(Basis::V)?;
        self.attached = true;
        Ok(())
    }
    pub fn detach(&mut self) {
        self.attached = false;
    }
    pub fn attached(&self) -> bool {
        self.attached
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }
    pub fn n_alts(&self) -> usize {
        self.alts.len()
    }
    pub fn alt(&self, alt: usize) -> Dtl<&Topology> {
        match alt >= 1 && alt <= self.alts.len() {
            true => Ok(&self.alts[alt - 1]),
            false => Err(DtlError::BadAlternative),
        }
    }
    pub fn alts(&self) -> &[Topology] {
        &self.alts
    }
    pub fn maps(&self) -> &IndexMaps {
        &self.maps
    }
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }
    pub fn scale(&self) -> &Scale {
        &self.scale
    }
    pub fn scale_mut(&mut self) -> &mut Scale {
        &mut self.scale
    }

    pub fn base(&self, basis: Basis) -> &Base {
        match basis {
            Basis::V => &self.vbase,
            _ => &self.pbase,
        }
    }
    pub fn base_mut(&mut self, basis: Basis) -> &mut Base {
        match basis {
            Basis::V => &mut self.vbase,
            _ => &mut self.pbase,
        }
    }
    /// combined generation over both bases, for cache stamping
    pub fn generation(&self) -> u64 {
        self.pbase.generation() + self.vbase.generation()
    }

    /// check a term against the frame shape for the given basis
    pub fn check_term(&self, basis: Basis, term: &Term) -> Dtl<()> {
        if term.alt < 1 || term.alt > self.alts.len() {
            return Err(DtlError::BadAlternative);
        }
        let limit = match basis {
            Basis::V => self.maps.reals(term.alt),
            _ => self.maps.tot(term.alt),
        };
        match term.node >= 1 && term.node <= limit {
            true => Ok(()),
            false => Err(DtlError::BadNode),
        }
    }
    /// flat variable index of a term
    pub fn resolve(&self, basis: Basis, term: &Term) -> usize {
        match basis {
            Basis::V => self.maps.real_of(term.alt, term.node),
            _ => self.maps.flat(term.alt, term.node),
        }
    }
    /// flat variable index of an (alt, node) pair, checked
    pub fn variable(&self, basis: Basis, alt: usize, node: usize) -> Dtl<usize> {
        let term = Term {
            alt,
            node,
            sign: 1.,
        };
        self.check_term(basis, &term)?;
        Ok(self.resolve(basis, &term))
    }

    /// rerun the loader over one base
    pub fn consolidate(&mut self, basis: Basis) -> Dtl<()> {
        let maps = &self.maps;
        let resolve = |term: &Term| match basis {
            Basis::V => maps.real_of(term.alt, term.node),
            _ => maps.flat(term.alt, term.node),
        };
        let groups: &[Vec<usize>] = match basis {
            Basis::V => &[],
            _ => &self.groups,
        };
        let base = match basis {
            Basis::V => &mut self.vbase,
            _ => &mut self.pbase,
        };
        hull::consolidate(base, groups, &resolve)
    }

    /// the transactional wrapper around every base mutation: apply,
    /// re-consolidate, and on failure write the touched slot back and
    /// reload so the polytope is coherent again. a restore that itself
    /// fails detaches the frame.
    pub fn mutate<T>(
        &mut self,
        basis: Basis,
        op: impl FnOnce(&mut Base) -> Dtl<(T, Undo)>,
    ) -> Dtl<T> {
        let (out, undo) = op(self.base_mut(basis))?;
        match self.consolidate(basis) {
            Ok(()) => {
                self.base_mut(basis).tick();
                Ok(out)
            }
            Err(trouble) => {
                self.base_mut(basis).undo(undo);
                match self.consolidate(basis) {
                    Ok(()) => Err(trouble),
                    Err(_) => {
                        log::warn!("restore failed, detaching frame ({})", self.name);
                        self.attached = false;
                        Err(DtlError::Kernel(Kernel::Restore))
                    }
                }
            }
        }
    }

    /// statement entry with term checks, transactional
    pub fn add_stmt(&mut self, basis: Basis, stmt: Statement) -> Dtl<usize> {
        stmt.validate()?;
        for term in stmt.terms.iter() {
            self.check_term(basis, term)?;
        }
        self.mutate(basis, |base| base.push_stmt(stmt))
    }
    pub fn change_stmt(&mut self, basis: Basis, ix: usize, lobo: f64, upbo: f64) -> Dtl<usize> {
        self.mutate(basis, |base| {
            base.change_stmt(ix, lobo, upbo).map(|undo| (ix, undo))
        })
    }
    pub fn replace_stmt(&mut self, basis: Basis, ix: usize, stmt: Statement) -> Dtl<usize> {
        stmt.validate()?;
        for term in stmt.terms.iter() {
            self.check_term(basis, term)?;
        }
        self.mutate(basis, |base| {
            base.replace_stmt(ix, stmt).map(|undo| (ix, undo))
        })
    }
    pub fn delete_stmt(&mut self, basis: Basis, ix: usize) -> Dtl<usize> {
        self.mutate(basis, |base| base.delete_stmt(ix))
    }
    pub fn add_mid_stmt(&mut self, basis: Basis, alt: usize, node: usize, lo: f64, up: f64) -> Dtl<()> {
        let k = self.variable(basis, alt, node)?;
        self.mutate(basis, |base| base.add_mid(k, lo, up).map(|undo| ((), undo)))
    }
    pub fn delete_mid_stmt(&mut self, basis: Basis, alt: usize, node: usize) -> Dtl<()> {
        let k = self.variable(basis, alt, node)?;
        self.mutate(basis, |base| base.delete_mid(k).map(|undo| ((), undo)))
    }
    pub fn set_box(&mut self, basis: Basis, los: &[f64], ups: &[f64]) -> Dtl<()> {
        self.mutate(basis, |base| base.set_ibox(los, ups).map(|undo| ((), undo)))
    }
    pub fn set_mbox(&mut self, basis: Basis, los: &[f64], ups: &[f64]) -> Dtl<()> {
        self.mutate(basis, |base| base.set_mbox(los, ups).map(|undo| ((), undo)))
    }
    pub fn remove_mbox(&mut self, basis: Basis) -> Dtl<()> {
        self.mutate(basis, |base| Ok(((), base.remove_mbox())))
    }
    pub fn reset_base(&mut self, basis: Basis) -> Dtl<()> {
        self.mutate(basis, |base| Ok(((), base.reset())))
    }
}

/// a small consistent random frame, for tests and benches
impl crate::Arbitrary for DecisionFrame {
    fn random() -> Self {
        let mut df = Self::flat("random", &[3, 3, 3]).expect("within capacity");
        df.attach(FrameKind::PS).expect("flat frames attach");
        for alt in 1..=3 {
            for cons in 1..=3 {
                let lo = rand::random::<f64>() * 0.4;
                let up = (lo + 0.05 + rand::random::<f64>() * 0.4).min(1.);
                df.add_stmt(Basis::V, Statement::interval(alt, cons, lo, up))
                    .expect("value intervals never clash");
            }
            let lo = rand::random::<f64>() * 0.3;
            df.add_stmt(Basis::P, Statement::interval(alt, 1, lo, lo + 0.3))
                .expect("one loose bracket stays feasible");
        }
        df
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DTL_EPS;

    fn two_by_two() -> DecisionFrame {
        let mut df = DecisionFrame::flat("fixture", &[2, 2]).unwrap();
        df.attach(FrameKind::PS).unwrap();
        df
    }

    #[test]
    fn is_attach_consolidating() {
        let df = two_by_two();
        assert!(df.attached());
        assert!(df.base(Basis::P).hull.solved());
        // with no statements each probability spans the simplex
        assert!(df.base(Basis::P).hull.lo(0) == 0.);
        assert!(df.base(Basis::P).hull.up(0) == 1.);
    }
    #[test]
    fn is_failed_mutation_rolled_back() {
        let mut df = two_by_two();
        df.add_stmt(Basis::P, Statement::interval(1, 1, 0.3, 0.4))
            .unwrap();
        let before = df.clone();
        let clash = df.add_stmt(Basis::P, Statement::interval(1, 1, 0.9, 0.95));
        assert!(clash == Err(DtlError::Inconsistent));
        assert!(df == before);
    }
    #[test]
    fn is_generation_ticking_on_success_only() {
        let mut df = two_by_two();
        let before = df.generation();
        df.add_stmt(Basis::P, Statement::interval(1, 1, 0.3, 0.4))
            .unwrap();
        assert!(df.generation() == before + 1);
        let generation = df.generation();
        let _ = df.add_stmt(Basis::P, Statement::interval(1, 1, 0.9, 0.95));
        assert!(df.generation() == generation);
    }
    #[test]
    fn is_complement_visible_through_hull() {
        let mut df = two_by_two();
        df.add_stmt(Basis::P, Statement::interval(1, 1, 0.4, 0.6))
            .unwrap();
        let k = df.variable(Basis::P, 1, 2).unwrap();
        assert!((df.base(Basis::P).hull.lo(k) - 0.4).abs() < DTL_EPS);
        assert!((df.base(Basis::P).hull.up(k) - 0.6).abs() < DTL_EPS);
    }
    #[test]
    fn is_alien_term_refused() {
        let mut df = two_by_two();
        let out = df.add_stmt(Basis::P, Statement::interval(3, 1, 0.4, 0.6));
        assert!(out == Err(DtlError::BadAlternative));
        let out = df.add_stmt(Basis::V, Statement::interval(1, 3, 0.4, 0.6));
        assert!(out == Err(DtlError::BadNode));
    }
}
