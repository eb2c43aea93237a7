use crate::hull::simplex::Simplex;

/// the augmented linear system behind a constraint base.
///
/// structural variables are the base variables with their folded
/// bounds; each sibling group of a simplex basis contributes one
/// sum-to-one row; each two-term statement contributes a ranged row,
/// carried as an equality against a slack variable bounded by the
/// statement interval.
pub struct System {
    rows: Vec<Vec<f64>>,
    b: Vec<f64>,
    lo: Vec<f64>,
    up: Vec<f64>,
    n: usize,
}

impl System {
    pub fn assemble(
        lo: &[f64],
        up: &[f64],
        groups: &[Vec<usize>],
        pairs: &[(usize, usize, f64, f64)],
    ) -> Self {
        let n = lo.len();
        let width = n + pairs.len();
        assert!(groups.len() + pairs.len() <= crate::MAX_ROWS);
        let mut rows = vec![];
        let mut b = vec![];
        let mut lo = lo.to_vec();
        let mut up = up.to_vec();
        for group in groups {
            let mut row = vec![0.; width];
            for k in group {
                row[*k] = 1.;
            }
            rows.push(row);
            b.push(1.);
        }
        for (s, (plus, minus, lobo, upbo)) in pairs.iter().enumerate() {
            let mut row = vec![0.; width];
            row[*plus] = 1.;
            row[*minus] = -1.;
            row[n + s] = -1.;
            rows.push(row);
            b.push(0.);
            lo.push(*lobo);
            up.push(*upbo);
        }
        Self { rows, b, lo, up, n }
    }

    /// number of structural variables
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn simplex(&self) -> Simplex {
        Simplex::new(
            self.rows.clone(),
            self.b.clone(),
            self.lo.clone(),
            self.up.clone(),
        )
    }

    /// objective vector selecting one structural variable
    pub fn objective(&self, k: usize) -> Vec<f64> {
        let mut c = vec![0.; self.lo.len()];
        c[k] = 1.;
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_assembly_shaped_right() {
        let system = System::assemble(
            &[0., 0., 0.],
            &[1., 1., 1.],
            &[vec![0, 1, 2]],
            &[(0, 1, -0.2, 0.3)],
        );
        assert!(system.n() == 3);
        assert!(system.rows.len() == 2);
        assert!(system.lo.len() == 4);
        assert!(system.lo[3] == -0.2);
        assert!(system.up[3] == 0.3);
    }
    #[test]
    fn is_assembled_system_solvable() {
        // two probabilities summing to one, difference at least 0.2
        let system = System::assemble(&[0., 0.], &[1., 1.], &[vec![0, 1]], &[(0, 1, 0.2, 1.)]);
        let mut lp = system.simplex();
        lp.feasible().unwrap();
        let lo = lp.minimize(&system.objective(0)).unwrap();
        let up = lp.maximize(&system.objective(0)).unwrap();
        assert!((lo - 0.6).abs() < 1e-9);
        assert!((up - 1.0).abs() < 1e-9);
    }
}
