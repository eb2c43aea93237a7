use crate::api::Dtl;
use crate::api::DtlError;
use crate::HULL_EPS;

/// a per-variable interval box. the working domain of every base
/// variable starts at [0, 1] and is only ever shrunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lo: Vec<f64>,
    up: Vec<f64>,
}

impl Bounds {
    pub fn unit(n: usize) -> Self {
        Self {
            lo: vec![0.; n],
            up: vec![1.; n],
        }
    }
    pub fn len(&self) -> usize {
        self.lo.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lo.is_empty()
    }
    pub fn lo(&self, k: usize) -> f64 {
        self.lo[k]
    }
    pub fn up(&self, k: usize) -> f64 {
        self.up[k]
    }
    pub fn width(&self, k: usize) -> f64 {
        self.up[k] - self.lo[k]
    }
    pub fn set(&mut self, k: usize, lo: f64, up: f64) -> Dtl<()> {
        if lo > up {
            return Err(DtlError::BadBounds);
        }
        self.lo[k] = lo;
        self.up[k] = up;
        Ok(())
    }
    /// shrink one variable, rejecting a cut that empties it
    pub fn tighten(&mut self, k: usize, lo: f64, up: f64) -> Dtl<()> {
        let lo = self.lo[k].max(lo);
        let up = self.up[k].min(up);
        if lo > up + HULL_EPS {
            return Err(DtlError::Inconsistent);
        }
        self.lo[k] = lo;
        self.up[k] = up.max(lo);
        Ok(())
    }
    pub fn los(&self) -> &[f64] {
        &self.lo
    }
    pub fn ups(&self) -> &[f64] {
        &self.up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_unit_box_unit() {
        let bounds = Bounds::unit(3);
        assert!(bounds.lo(0) == 0.);
        assert!(bounds.up(2) == 1.);
        assert!(bounds.width(1) == 1.);
    }
    #[test]
    fn is_tighten_monotone() {
        let mut bounds = Bounds::unit(2);
        bounds.tighten(0, 0.2, 0.8).unwrap();
        bounds.tighten(0, 0.1, 0.6).unwrap();
        assert!(bounds.lo(0) == 0.2);
        assert!(bounds.up(0) == 0.6);
    }
    #[test]
    fn is_emptying_cut_inconsistent() {
        let mut bounds = Bounds::unit(1);
        bounds.tighten(0, 0.6, 1.).unwrap();
        assert!(bounds.tighten(0, 0., 0.4) == Err(DtlError::Inconsistent));
    }
}
