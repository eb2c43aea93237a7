use crate::api::code::Kernel;
use crate::api::Dtl;
use crate::api::DtlError;

const PIVOT_EPS: f64 = 1e-9;
const COST_EPS: f64 = 1e-9;
const FEAS_EPS: f64 = 1e-7;

/// dense two-phase simplex over bounded variables.
///
/// solves min c·x subject to A x = b and l ≤ x ≤ u. every variable is
/// finitely bounded (ranged rows arrive as equalities with a bounded
/// slack), so the method never runs unbounded; artificial variables
/// carry phase 1 and are pinned to zero afterwards. the matrices here
/// are small — rows are sibling groups plus two-term statements — so a
/// plain tableau with Bland's rule is the whole kernel.
pub struct Simplex {
    m: usize,
    n: usize,
    a: Vec<Vec<f64>>,
    lo: Vec<f64>,
    up: Vec<f64>,
    x: Vec<f64>,
    basis: Vec<usize>,
    basic: Vec<bool>,
    upper: Vec<bool>,
}

impl Simplex {
    /// set up with every structural variable at its lower bound and an
    /// artificial identity basis absorbing the residuals
    pub fn new(rows: Vec<Vec<f64>>, b: Vec<f64>, lo: Vec<f64>, up: Vec<f64>) -> Self {
        let m = rows.len();
        let n = lo.len();
        let mut a = rows;
        let mut lo = lo;
        let mut up = up;
        let mut x = lo.clone();
        let mut basis = vec![0; m];
        let mut basic = vec![false; n + m];
        let upper = vec![false; n + m];
        for i in 0..m {
            let residual = b[i] - a[i].iter().zip(x.iter()).map(|(c, v)| c * v).sum::<f64>();
            let sign = if residual < 0. { -1. } else { 1. };
            // scale the row so the artificial column is the identity
            for c in a[i].iter_mut() {
                *c *= sign;
            }
            for j in 0..m {
                a[i].push(if i == j { 1. } else { 0. });
            }
            lo.push(0.);
            up.push(f64::INFINITY);
            x.push(residual.abs());
            basis[i] = n + i;
            basic[n + i] = true;
        }
        Self {
            m,
            n,
            a,
            lo,
            up,
            x,
            basis,
            basic,
            upper,
        }
    }

    /// phase 1: drive the artificial residuals to zero
    pub fn feasible(&mut self) -> Dtl<()> {
        let mut c = vec![0.; self.n + self.m];
        for j in self.n..self.n + self.m {
            c[j] = 1.;
        }
        self.run(&c)?;
        let infeasibility = (self.n..self.n + self.m).map(|j| self.x[j]).sum::<f64>();
        if infeasibility > FEAS_EPS {
            return Err(DtlError::Kernel(Kernel::Infeasible));
        }
        self.expel()?;
        for j in self.n..self.n + self.m {
            self.up[j] = 0.;
            self.x[j] = 0.;
        }
        Ok(())
    }

    /// phase 2 from the current (feasible) basis
    pub fn minimize(&mut self, c: &[f64]) -> Dtl<f64> {
        let mut cost = c.to_vec();
        cost.resize(self.n + self.m, 0.);
        self.run(&cost)?;
        Ok((0..self.n).map(|j| c[j] * self.x[j]).sum())
    }
    pub fn maximize(&mut self, c: &[f64]) -> Dtl<f64> {
        let negated = c.iter().map(|v| -v).collect::<Vec<_>>();
        self.minimize(&negated).map(|z| -z)
    }

    pub fn value(&self, j: usize) -> f64 {
        self.x[j]
    }

    /// pivot basic artificials out where a structural column allows it;
    /// a row with no such column is redundant and keeps its artificial
    /// parked at zero
    fn expel(&mut self) -> Dtl<()> {
        for i in 0..self.m {
            if self.basis[i] < self.n {
                continue;
            }
            if let Some(q) = (0..self.n)
                .find(|q| !self.basic[*q] && self.a[i][*q].abs() > PIVOT_EPS)
            {
                self.pivot(i, q)?;
            }
        }
        Ok(())
    }

    fn run(&mut self, c: &[f64]) -> Dtl<()> {
        let cap = 64 * (self.n + self.m) + 256;
        for _ in 0..cap {
            match self.entering(c) {
                None => return Ok(()),
                Some(q) => self.step(q)?,
            }
        }
        Err(DtlError::Kernel(Kernel::Cycling))
    }

    /// Bland's rule: the lowest-index nonbasic with a profitable
    /// reduced cost
    fn entering(&self, c: &[f64]) -> Option<usize> {
        (0..self.n + self.m)
            .filter(|j| !self.basic[*j])
            .filter(|j| self.up[*j] - self.lo[*j] > 0.)
            .find(|j| {
                let d = self.reduced(c, *j);
                match self.upper[*j] {
                    false => d < -COST_EPS,
                    true => d > COST_EPS,
                }
            })
    }

    fn reduced(&self, c: &[f64], j: usize) -> f64 {
        c[j] - (0..self.m)
            .map(|i| c[self.basis[i]] * self.a[i][j])
            .sum::<f64>()
    }

    /// move the entering variable as far as the basis tolerates, then
    /// either flip its bound or pivot it in
    fn step(&mut self, q: usize) -> Dtl<()> {
        let from_upper = self.upper[q];
        // effective column: basic values move by -w * t
        let w = (0..self.m)
            .map(|i| if from_upper { -self.a[i][q] } else { self.a[i][q] })
            .collect::<Vec<_>>();
        let mut t = self.up[q] - self.lo[q];
        let mut block: Option<(usize, bool)> = None;
        for i in 0..self.m {
            let b = self.basis[i];
            let limit = if w[i] > PIVOT_EPS {
                Some(((self.x[b] - self.lo[b]) / w[i], true))
            } else if w[i] < -PIVOT_EPS {
                Some(((self.up[b] - self.x[b]) / -w[i], false))
            } else {
                None
            };
            if let Some((bound, hits_lower)) = limit {
                let bound = bound.max(0.);
                if bound < t - PIVOT_EPS {
                    t = bound;
                    block = Some((i, hits_lower));
                } else if block.is_none() && bound <= t + PIVOT_EPS && bound < t {
                    t = bound;
                    block = Some((i, hits_lower));
                }
            }
        }
        if !t.is_finite() {
            return Err(DtlError::Kernel(Kernel::Unbounded));
        }
        // apply the move
        for i in 0..self.m {
            let b = self.basis[i];
            self.x[b] -= w[i] * t;
        }
        self.x[q] = if from_upper {
            self.up[q] - t
        } else {
            self.lo[q] + t
        };
        match block {
            None => {
                // entering variable ran to its opposite bound
                self.upper[q] = !from_upper;
                Ok(())
            }
            Some((row, hits_lower)) => {
                let leaving = self.basis[row];
                self.x[leaving] = if hits_lower {
                    self.lo[leaving]
                } else {
                    self.up[leaving]
                };
                self.upper[leaving] = !hits_lower;
                self.pivot(row, q)
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) -> Dtl<()> {
        let pv = self.a[row][col];
        if pv.abs() < PIVOT_EPS {
            return Err(DtlError::Kernel(Kernel::Singular));
        }
        for c in self.a[row].iter_mut() {
            *c /= pv;
        }
        for i in 0..self.m {
            if i == row {
                continue;
            }
            let factor = self.a[i][col];
            if factor == 0. {
                continue;
            }
            for j in 0..self.n + self.m {
                let delta = factor * self.a[row][j];
                self.a[i][j] -= delta;
            }
        }
        self.basic[self.basis[row]] = false;
        self.basic[col] = true;
        self.basis[row] = col;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// one simplex group of three probabilities, no statements:
    /// p0 + p1 + p2 = 1, p ∈ [0.1, 0.5] x [0.2, 0.6] x [0, 1]
    fn group() -> Simplex {
        Simplex::new(
            vec![vec![1., 1., 1.]],
            vec![1.],
            vec![0.1, 0.2, 0.],
            vec![0.5, 0.6, 1.],
        )
    }

    #[test]
    fn is_group_feasible() {
        assert!(group().feasible().is_ok());
    }
    #[test]
    fn is_variable_minimum_exact() {
        // min p0 = max(0.1, 1 - 0.6 - 1.0) = 0.1
        let mut lp = group();
        lp.feasible().unwrap();
        let z = lp.minimize(&[1., 0., 0.]).unwrap();
        assert!((z - 0.1).abs() < 1e-9);
    }
    #[test]
    fn is_variable_maximum_exact() {
        // max p0 = min(0.5, 1 - 0.2 - 0.0) = 0.5
        let mut lp = group();
        lp.feasible().unwrap();
        let z = lp.maximize(&[1., 0., 0.]).unwrap();
        assert!((z - 0.5).abs() < 1e-9);
    }
    #[test]
    fn is_simplex_slack_binding() {
        // max p2 = 1 - 0.1 - 0.2 = 0.7, its own bound is looser
        let mut lp = group();
        lp.feasible().unwrap();
        let z = lp.maximize(&[0., 0., 1.]).unwrap();
        assert!((z - 0.7).abs() < 1e-9);
    }
    #[test]
    fn is_empty_simplex_infeasible() {
        // lower bounds already sum past 1
        let mut lp = Simplex::new(
            vec![vec![1., 1.]],
            vec![1.],
            vec![0.7, 0.7],
            vec![1., 1.],
        );
        assert!(lp.feasible().is_err());
    }
    #[test]
    fn is_difference_row_respected() {
        // p0 + p1 = 1 and p0 - p1 - s = 0 with s in [0.2, 0.4]
        let mut lp = Simplex::new(
            vec![vec![1., 1., 0.], vec![1., -1., -1.]],
            vec![1., 0.],
            vec![0., 0., 0.2],
            vec![1., 1., 0.4],
        );
        lp.feasible().unwrap();
        let hi = lp.maximize(&[1., 0., 0.]).unwrap();
        let lo = lp.minimize(&[1., 0., 0.]).unwrap();
        assert!((hi - 0.7).abs() < 1e-9);
        assert!((lo - 0.6).abs() < 1e-9);
    }
    #[test]
    fn is_warm_restart_stable() {
        let mut lp = group();
        lp.feasible().unwrap();
        for _ in 0..4 {
            let hi = lp.maximize(&[0., 1., 0.]).unwrap();
            let lo = lp.minimize(&[0., 1., 0.]).unwrap();
            assert!((hi - 0.6).abs() < 1e-9);
            assert!((lo - 0.2).abs() < 1e-9);
        }
    }
}
