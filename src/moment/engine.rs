use crate::frame::topology::Topology;
use crate::moment::moments::Moments;
use crate::moment::triangle;

/// probability statistics of one node entering a sibling-group
/// combine: the consolidated mean and the triangular spread over the
/// node's probability hull.
#[derive(Debug, Clone, Copy)]
pub struct PStat {
    pub mean: f64,
    pub var: f64,
    pub third: f64,
}

impl PStat {
    pub fn fit(lo: f64, mean: f64, up: f64) -> Self {
        let (var, third) = triangle::fit(lo, mean, up);
        Self { mean, var, third }
    }
    /// dirichlet-style coupling: within a sibling group the
    /// probabilities covary negatively, cov(i, j) = −d_i·d_j
    fn coupling(&self) -> f64 {
        match self.mean < 1. - 1e-9 {
            true => (self.var * self.mean / (1. - self.mean)).max(0.).sqrt(),
            false => 0.,
        }
    }
    fn raw2(&self) -> f64 {
        self.var + self.mean * self.mean
    }
    fn raw3(&self) -> f64 {
        self.third + 3. * self.mean * self.var + self.mean.powi(3)
    }
}

/// moments of Σ P_c · X_c over one sibling group, with the group's
/// probabilities coupled and the child values independent
pub fn group(stats: &[PStat], values: &[Moments]) -> Moments {
    let m1 = stats
        .iter()
        .zip(values)
        .map(|(p, x)| p.mean * x.m1)
        .sum::<f64>();
    let mut m2 = stats
        .iter()
        .zip(values)
        .map(|(p, x)| p.raw2() * x.raw2() - p.mean.powi(2) * x.m1.powi(2))
        .sum::<f64>();
    for i in 0..stats.len() {
        for j in 0..stats.len() {
            if i != j {
                m2 -= values[i].m1 * values[j].m1 * stats[i].coupling() * stats[j].coupling();
            }
        }
    }
    let m3 = stats
        .iter()
        .zip(values)
        .map(|(p, x)| {
            let mu = p.mean * x.m1;
            p.raw3() * x.raw3() - 3. * mu * p.raw2() * x.raw2() + 2. * mu.powi(3)
        })
        .sum::<f64>();
    Moments {
        m1,
        m2: m2.max(0.),
        m3,
    }
}

/// descend a tree from the given node, combining sibling groups at
/// each intermediate. node 0 is the virtual root, so descending from
/// 0 yields the whole alternative.
pub fn descend(
    top: &Topology,
    node: usize,
    pstat: &dyn Fn(usize) -> PStat,
    leaf: &dyn Fn(usize) -> Moments,
) -> Moments {
    match node != 0 && top.real(node) {
        true => leaf(node),
        false => {
            let kids = top.children(node);
            let stats = kids.iter().map(|k| pstat(*k)).collect::<Vec<_>>();
            let values = kids
                .iter()
                .map(|k| descend(top, *k, pstat, leaf))
                .collect::<Vec<_>>();
            group(&stats, &values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::node::TreeRecord;

    #[test]
    fn is_certain_world_a_dirac() {
        // two consequences at fixed probability and value
        let top = Topology::flat(2).unwrap();
        let pstat = |k: usize| match k {
            1 => PStat::fit(0.5, 0.5, 0.5),
            _ => PStat::fit(0.5, 0.5, 0.5),
        };
        let leaf = |k: usize| match k {
            1 => Moments::dirac(1.),
            _ => Moments::dirac(0.),
        };
        let m = descend(&top, 0, &pstat, &leaf);
        assert!((m.m1 - 0.5).abs() < 1e-12);
        assert!(m.m2.abs() < 1e-12);
        assert!(m.m3.abs() < 1e-12);
    }
    #[test]
    fn is_spread_probability_spread_value() {
        // full probability hulls widen the expected value
        let top = Topology::flat(2).unwrap();
        let pstat = |_: usize| PStat::fit(0., 0.5, 1.);
        let leaf = |k: usize| match k {
            1 => Moments::dirac(1.),
            _ => Moments::dirac(0.),
        };
        let m = descend(&top, 0, &pstat, &leaf);
        assert!((m.m1 - 0.5).abs() < 1e-12);
        assert!(m.m2 > 0.);
    }
    #[test]
    fn is_group_coupling_negative() {
        // identical positive leaf values: coupling can only shrink
        // the variance relative to independence
        let stats = [PStat::fit(0.2, 0.5, 0.8), PStat::fit(0.2, 0.5, 0.8)];
        let values = [Moments::dirac(1.), Moments::dirac(1.)];
        let coupled = group(&stats, &values);
        let var_solo = stats[0].var + stats[1].var;
        assert!(coupled.m2 < var_solo + 1e-12);
        // and the mean is exactly Σ p·v = 1
        assert!((coupled.m1 - 1.).abs() < 1e-12);
    }
    #[test]
    fn is_tree_descent_recursive() {
        // 1:E -> (2:C, 3:E -> (4:C, 5:C)) with certain probabilities
        let records = [
            TreeRecord::from(('E', 0, 2)),
            TreeRecord::from(('C', 3, 0)),
            TreeRecord::from(('E', 0, 4)),
            TreeRecord::from(('C', 5, 0)),
            TreeRecord::from(('C', 0, 0)),
        ];
        let top = Topology::tree(&records).unwrap();
        let pstat = |k: usize| match k {
            1 => PStat::fit(1., 1., 1.),
            2 => PStat::fit(0.5, 0.5, 0.5),
            3 => PStat::fit(0.5, 0.5, 0.5),
            _ => PStat::fit(0.5, 0.5, 0.5),
        };
        let leaf = |k: usize| match k {
            2 => Moments::dirac(0.8),
            4 => Moments::dirac(0.4),
            _ => Moments::dirac(0.),
        };
        let m = descend(&top, 0, &pstat, &leaf);
        // 0.5·0.8 + 0.5·(0.5·0.4 + 0.5·0)
        assert!((m.m1 - 0.5).abs() < 1e-12);
    }
}
