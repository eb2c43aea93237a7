use crate::moment::moments::Moments;

/// the four evaluation rules. delta compares a pair, gamma one
/// alternative against the average of the rest, psi stands alone, and
/// digamma compares against the average of a caller-picked peer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Delta,
    Gamma,
    Psi,
    Digamma(u64),
}

impl Rule {
    /// the peer indices averaged against alternative i, 1-based
    fn peers(&self, n_alts: usize, i: usize, j: usize) -> Vec<usize> {
        match self {
            Rule::Psi => vec![],
            Rule::Delta => vec![j],
            Rule::Gamma => (1..=n_alts).filter(|k| *k != i).collect(),
            Rule::Digamma(mask) => (1..=n_alts)
                .filter(|k| *k != i)
                .filter(|k| mask & (1 << (k - 1)) != 0)
                .collect(),
        }
    }

    /// combined moments from per-alternative psi moments
    pub fn moments(&self, alts: &[Moments], i: usize, j: usize) -> Moments {
        let own = alts[i - 1];
        let peers = self.peers(alts.len(), i, j);
        match peers.len() {
            0 => own,
            n => {
                let avg = |f: &dyn Fn(&Moments) -> f64| {
                    peers.iter().map(|k| f(&alts[*k - 1])).sum::<f64>() / n as f64
                };
                // the averaged field enters with its mean variance
                // added, its first and third moments subtracted
                Moments {
                    m1: own.m1 - avg(&|m| m.m1),
                    m2: own.m2 + avg(&|m| m.m2),
                    m3: own.m3 - avg(&|m| m.m3),
                }
            }
        }
    }

    /// combined hull from per-alternative psi hulls
    pub fn hull(&self, hulls: &[(f64, f64)], i: usize, j: usize) -> (f64, f64) {
        let (lo, up) = hulls[i - 1];
        let peers = self.peers(hulls.len(), i, j);
        match peers.len() {
            0 => (lo, up),
            n => {
                let peer_lo = peers.iter().map(|k| hulls[*k - 1].0).sum::<f64>() / n as f64;
                let peer_up = peers.iter().map(|k| hulls[*k - 1].1).sum::<f64>() / n as f64;
                (lo - peer_up, up - peer_lo)
            }
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Rule::Delta => write!(f, "delta"),
            Rule::Gamma => write!(f, "gamma"),
            Rule::Psi => write!(f, "psi"),
            Rule::Digamma(mask) => write!(f, "digamma({:b})", mask),
        }
    }
}
