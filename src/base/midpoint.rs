use crate::api::Dtl;
use crate::api::DtlError;

/// per-variable bounds on the expected value. midpoints are means,
/// never modes. the sentinel −1 marks an empty slot; −2 is accepted
/// only on the bulk-set path and means "leave this slot unchanged".
#[derive(Debug, Clone, PartialEq)]
pub struct MidBox {
    lo: Vec<f64>,
    up: Vec<f64>,
}

impl MidBox {
    pub const EMPTY: f64 = -1.;
    pub const SKIP: f64 = -2.;

    pub fn empty(n: usize) -> Self {
        Self {
            lo: vec![Self::EMPTY; n],
            up: vec![Self::EMPTY; n],
        }
    }
    pub fn len(&self) -> usize {
        self.lo.len()
    }
    pub fn is_set(&self, k: usize) -> bool {
        self.lo[k] != Self::EMPTY
    }
    pub fn lo(&self, k: usize) -> f64 {
        self.lo[k]
    }
    pub fn up(&self, k: usize) -> f64 {
        self.up[k]
    }
    /// the midpoint of the slot, if set
    pub fn mid(&self, k: usize) -> Option<f64> {
        match self.is_set(k) {
            true => Some((self.lo[k] + self.up[k]) / 2.),
            false => None,
        }
    }
    pub fn set(&mut self, k: usize, lo: f64, up: f64) -> Dtl<()> {
        if !(0. ..=1.).contains(&lo) || !(0. ..=1.).contains(&up) || lo > up {
            return Err(DtlError::BadBounds);
        }
        self.lo[k] = lo;
        self.up[k] = up;
        Ok(())
    }
    pub fn clear(&mut self, k: usize) {
        self.lo[k] = Self::EMPTY;
        self.up[k] = Self::EMPTY;
    }
    pub fn clear_all(&mut self) {
        self.lo.fill(Self::EMPTY);
        self.up.fill(Self::EMPTY);
    }
    /// bulk set honoring the skip sentinel per slot
    pub fn fill(&mut self, lobos: &[f64], upbos: &[f64]) -> Dtl<()> {
        if lobos.len() != self.len() || upbos.len() != self.len() {
            return Err(DtlError::BadStatement);
        }
        for k in 0..self.len() {
            if lobos[k] == Self::SKIP {
                continue;
            }
            if lobos[k] == Self::EMPTY {
                self.clear(k);
            } else {
                self.set(k, lobos[k], upbos[k])?;
            }
        }
        Ok(())
    }
    pub fn los(&self) -> &[f64] {
        &self.lo
    }
    pub fn ups(&self) -> &[f64] {
        &self.up
    }
}
