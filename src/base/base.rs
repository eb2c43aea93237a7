use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::bounds::Bounds;
use crate::base::midpoint::MidBox;
use crate::base::statement::Statement;
use crate::hull::hull::Hull;
use crate::MAX_STMTS;

/// which information base a statement or query addresses. the weight
/// base is the probability base of criterion 0 on a multi-criterion
/// frame, so it shares every code path with P.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    P,
    V,
    W,
}

impl Basis {
    /// whether sibling groups of this basis are tied to a simplex
    pub fn simplex(&self) -> bool {
        matches!(self, Basis::P | Basis::W)
    }
}

impl std::fmt::Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Basis::P => write!(f, "P"),
            Basis::V => write!(f, "V"),
            Basis::W => write!(f, "W"),
        }
    }
}

/// record of what a mutation touched, sufficient to put the base back
/// exactly as it was. the polytope hull is not part of the record: the
/// loader reruns after an undo and reproduces it.
#[derive(Debug, Clone)]
pub enum Undo {
    Pushed,
    Changed(usize, f64, f64),
    Replaced(usize, Statement),
    Deleted(usize, Statement),
    Mid(usize, f64, f64),
    BoxAll(Bounds),
    MidAll(MidBox),
}

/// one constraint base: the statement list, the interval box, the
/// midpoint box, and the consolidated hull over all three.
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    basis: Basis,
    stmts: Vec<Statement>,
    ibox: Bounds,
    mbox: MidBox,
    pub hull: Hull,
    generation: u64,
}

impl Base {
    pub fn new(basis: Basis, n: usize) -> Self {
        Self {
            basis,
            stmts: vec![],
            ibox: Bounds::unit(n),
            mbox: MidBox::empty(n),
            hull: Hull::vacant(n),
            generation: 0,
        }
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }
    pub fn n(&self) -> usize {
        self.ibox.len()
    }
    pub fn stmts(&self) -> &[Statement] {
        &self.stmts
    }
    pub fn n_stmts(&self) -> usize {
        self.stmts.len()
    }
    pub fn ibox(&self) -> &Bounds {
        &self.ibox
    }
    pub fn mbox(&self) -> &MidBox {
        &self.mbox
    }
    pub fn generation(&self) -> u64 {
        self.generation
    }
    /// bumped after every successful mutation; evaluation caches carry
    /// the generation they were computed under
    pub fn tick(&mut self) {
        self.generation += 1;
    }

    /// append a statement, 1-based index of the new slot on success
    pub fn push_stmt(&mut self, stmt: Statement) -> Dtl<(usize, Undo)> {
        stmt.validate()?;
        if self.stmts.len() >= MAX_STMTS {
            return Err(DtlError::Overflow);
        }
        self.stmts.push(stmt);
        Ok((self.stmts.len(), Undo::Pushed))
    }
    /// rebound an existing statement in place
    pub fn change_stmt(&mut self, ix: usize, lobo: f64, upbo: f64) -> Dtl<Undo> {
        let slot = self.slot(ix)?;
        let undo = Undo::Changed(ix, self.stmts[slot].lobo, self.stmts[slot].upbo);
        let mut stmt = self.stmts[slot].clone();
        stmt.lobo = lobo;
        stmt.upbo = upbo;
        stmt.validate()?;
        self.stmts[slot] = stmt;
        Ok(undo)
    }
    /// swap an existing statement wholesale
    pub fn replace_stmt(&mut self, ix: usize, stmt: Statement) -> Dtl<Undo> {
        stmt.validate()?;
        let slot = self.slot(ix)?;
        let undo = Undo::Replaced(ix, self.stmts[slot].clone());
        self.stmts[slot] = stmt;
        Ok(undo)
    }
    /// remove a statement, statement count after removal on success
    pub fn delete_stmt(&mut self, ix: usize) -> Dtl<(usize, Undo)> {
        let slot = self.slot(ix)?;
        let undo = Undo::Deleted(ix, self.stmts.remove(slot));
        Ok((self.stmts.len(), undo))
    }

    /// set one midpoint slot through the statement-like path. the bulk
    /// sentinels are never legal here.
    pub fn add_mid(&mut self, k: usize, lo: f64, up: f64) -> Dtl<Undo> {
        let undo = Undo::Mid(k, self.mbox.lo(k), self.mbox.up(k));
        self.mbox.set(k, lo, up)?;
        Ok(undo)
    }
    pub fn delete_mid(&mut self, k: usize) -> Dtl<Undo> {
        let undo = Undo::Mid(k, self.mbox.lo(k), self.mbox.up(k));
        self.mbox.clear(k);
        Ok(undo)
    }

    /// bulk interval box load
    pub fn set_ibox(&mut self, los: &[f64], ups: &[f64]) -> Dtl<Undo> {
        if los.len() != self.n() || ups.len() != self.n() {
            return Err(DtlError::BadStatement);
        }
        let undo = Undo::BoxAll(self.ibox.clone());
        for k in 0..self.n() {
            self.ibox.set(k, los[k], ups[k])?;
        }
        Ok(undo)
    }
    /// bulk midpoint box load, honoring the −2 skip sentinel
    pub fn set_mbox(&mut self, los: &[f64], ups: &[f64]) -> Dtl<Undo> {
        let undo = Undo::MidAll(self.mbox.clone());
        self.mbox.fill(los, ups)?;
        Ok(undo)
    }
    pub fn remove_mbox(&mut self) -> Undo {
        let undo = Undo::MidAll(self.mbox.clone());
        self.mbox.clear_all();
        undo
    }

    /// drop every statement and widen both boxes back out
    pub fn reset(&mut self) -> Undo {
        let undo = Undo::BoxAll(self.ibox.clone());
        self.stmts.clear();
        self.ibox = Bounds::unit(self.n());
        self.mbox.clear_all();
        undo
    }

    /// put the touched slot back; the caller reruns the loader after
    pub fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Pushed => {
                self.stmts.pop();
            }
            Undo::Changed(ix, lobo, upbo) => {
                self.stmts[ix - 1].lobo = lobo;
                self.stmts[ix - 1].upbo = upbo;
            }
            Undo::Replaced(ix, stmt) => self.stmts[ix - 1] = stmt,
            Undo::Deleted(ix, stmt) => self.stmts.insert(ix - 1, stmt),
            Undo::Mid(k, lo, up) => {
                if lo == MidBox::EMPTY {
                    self.mbox.clear(k);
                } else {
                    self.mbox.set(k, lo, up).expect("prior midpoint was legal");
                }
            }
            Undo::BoxAll(ibox) => self.ibox = ibox,
            Undo::MidAll(mbox) => self.mbox = mbox,
        }
    }

    pub fn mbox_mut(&mut self) -> &mut MidBox {
        &mut self.mbox
    }

    fn slot(&self, ix: usize) -> Dtl<usize> {
        match ix >= 1 && ix <= self.stmts.len() {
            true => Ok(ix - 1),
            false => Err(DtlError::BadStatement),
        }
    }
}
