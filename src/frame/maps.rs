use super::topology::Topology;

/// index maps between the coexisting node orderings.
///
/// t counts every node of an alternative, r only the real leaves, i
/// only the intermediates; f is the flat position in the single vector
/// concatenating all alternatives' totals. all tables are built once
/// at attach time and consulted read-only afterwards. local ordinals
/// and node numbers are 1-based with 0 meaning "not in this ordering";
/// global flat positions are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMaps {
    tot: Vec<usize>,
    real: Vec<usize>,
    inter: Vec<usize>,
    t2r: Vec<Vec<usize>>,
    t2i: Vec<Vec<usize>>,
    r2t: Vec<Vec<usize>>,
    i2t: Vec<Vec<usize>>,
    off_t: Vec<usize>,
    off_r: Vec<usize>,
    off_i: Vec<usize>,
    f2r: Vec<usize>,
    f2i: Vec<usize>,
    r2f: Vec<usize>,
    i2f: Vec<usize>,
}

impl From<&[Topology]> for IndexMaps {
    fn from(alts: &[Topology]) -> Self {
        let n = alts.len();
        let mut this = Self {
            tot: vec![0; n],
            real: vec![0; n],
            inter: vec![0; n],
            t2r: vec![vec![]; n],
            t2i: vec![vec![]; n],
            r2t: vec![vec![]; n],
            i2t: vec![vec![]; n],
            off_t: vec![0; n],
            off_r: vec![0; n],
            off_i: vec![0; n],
            f2r: vec![],
            f2i: vec![],
            r2f: vec![],
            i2f: vec![],
        };
        for (a, alt) in alts.iter().enumerate() {
            this.tot[a] = alt.tot();
            this.real[a] = alt.reals();
            this.inter[a] = alt.inters();
            this.off_t[a] = this.tot[..a].iter().sum();
            this.off_r[a] = this.real[..a].iter().sum();
            this.off_i[a] = this.inter[..a].iter().sum();
            this.t2r[a] = vec![0; alt.tot() + 1];
            this.t2i[a] = vec![0; alt.tot() + 1];
            this.r2t[a] = vec![0; alt.reals() + 1];
            this.i2t[a] = vec![0; alt.inters() + 1];
            let (mut r, mut i) = (0, 0);
            for t in 1..=alt.tot() {
                if alt.real(t) {
                    r += 1;
                    this.t2r[a][t] = r;
                    this.r2t[a][r] = t;
                    this.f2r.push(this.off_r[a] + r);
                    this.f2i.push(0);
                    this.r2f.push(this.off_t[a] + t - 1);
                } else {
                    i += 1;
                    this.t2i[a][t] = i;
                    this.i2t[a][i] = t;
                    this.f2r.push(0);
                    this.f2i.push(this.off_i[a] + i);
                    this.i2f.push(this.off_t[a] + t - 1);
                }
            }
        }
        this
    }
}

impl IndexMaps {
    pub fn n_alts(&self) -> usize {
        self.tot.len()
    }
    pub fn n_flat(&self) -> usize {
        self.tot.iter().sum()
    }
    pub fn n_real(&self) -> usize {
        self.real.iter().sum()
    }
    pub fn n_inter(&self) -> usize {
        self.inter.iter().sum()
    }
    pub fn tot(&self, alt: usize) -> usize {
        self.tot[alt - 1]
    }
    pub fn reals(&self, alt: usize) -> usize {
        self.real[alt - 1]
    }
    pub fn inters(&self, alt: usize) -> usize {
        self.inter[alt - 1]
    }

    /// global flat position of node t of an alternative
    pub fn flat(&self, alt: usize, t: usize) -> usize {
        self.off_t[alt - 1] + t - 1
    }
    /// global flat position of real ordinal r of an alternative
    pub fn flat_of_real(&self, alt: usize, r: usize) -> usize {
        self.r2f[self.off_r[alt - 1] + r - 1]
    }
    /// global real position (0-based) of real ordinal r of an alternative
    pub fn real_of(&self, alt: usize, r: usize) -> usize {
        self.off_r[alt - 1] + r - 1
    }
    /// local real ordinal of node t, 0 if intermediate
    pub fn t2r(&self, alt: usize, t: usize) -> usize {
        self.t2r[alt - 1][t]
    }
    /// local intermediate ordinal of node t, 0 if real
    pub fn t2i(&self, alt: usize, t: usize) -> usize {
        self.t2i[alt - 1][t]
    }
    /// node of local real ordinal r
    pub fn r2t(&self, alt: usize, r: usize) -> usize {
        self.r2t[alt - 1][r]
    }
    /// node of local intermediate ordinal i
    pub fn i2t(&self, alt: usize, i: usize) -> usize {
        self.i2t[alt - 1][i]
    }
    /// global real ordinal (1-based) at a flat position, 0 if intermediate
    pub fn f2r(&self, f: usize) -> usize {
        self.f2r[f]
    }
    /// global intermediate ordinal (1-based) at a flat position, 0 if real
    pub fn f2i(&self, f: usize) -> usize {
        self.f2i[f]
    }
    /// the alternative (1-based) owning a flat position
    pub fn alt_of(&self, f: usize) -> usize {
        (0..self.tot.len())
            .rev()
            .find(|a| self.off_t[*a] <= f)
            .map(|a| a + 1)
            .expect("flat position in range")
    }
    /// the node (t) at a flat position
    pub fn node_of(&self, f: usize) -> usize {
        f - self.off_t[self.alt_of(f) - 1] + 1
    }

    /// flat positions of one alternative's variables
    pub fn span(&self, alt: usize) -> std::ops::Range<usize> {
        let lo = self.off_t[alt - 1];
        lo..lo + self.tot[alt - 1]
    }
    /// global real positions (0-based) of one alternative
    pub fn real_span(&self, alt: usize) -> std::ops::Range<usize> {
        let lo = self.off_r[alt - 1];
        lo..lo + self.real[alt - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::node::TreeRecord;

    fn fixture() -> IndexMaps {
        // alt 1: flat with 2 cons; alt 2: 1:E -> (2:C, 3:E -> (4:C, 5:C))
        let records = [
            TreeRecord::from(('E', 0, 2)),
            TreeRecord::from(('C', 3, 0)),
            TreeRecord::from(('E', 0, 4)),
            TreeRecord::from(('C', 5, 0)),
            TreeRecord::from(('C', 0, 0)),
        ];
        let alts = [Topology::flat(2).unwrap(), Topology::tree(&records).unwrap()];
        IndexMaps::from(&alts[..])
    }

    #[test]
    fn is_count_bookkeeping_consistent() {
        let maps = fixture();
        assert!(maps.n_flat() == 7);
        assert!(maps.n_real() == 5);
        assert!(maps.n_inter() == 2);
        assert!(maps.n_flat() == maps.n_real() + maps.n_inter());
    }
    #[test]
    fn is_forward_inverse_round_trip() {
        let maps = fixture();
        for alt in 1..=2 {
            for t in 1..=maps.tot(alt) {
                let r = maps.t2r(alt, t);
                let i = maps.t2i(alt, t);
                assert!((r == 0) != (i == 0));
                if r > 0 {
                    assert!(maps.r2t(alt, r) == t);
                }
                if i > 0 {
                    assert!(maps.i2t(alt, i) == t);
                }
            }
        }
    }
    #[test]
    fn is_flat_indexing_contiguous() {
        let maps = fixture();
        assert!(maps.flat(1, 1) == 0);
        assert!(maps.flat(2, 1) == 2);
        assert!(maps.flat(2, 5) == 6);
        assert!(maps.alt_of(0) == 1);
        assert!(maps.alt_of(2) == 2);
        assert!(maps.node_of(6) == 5);
        assert!(maps.span(2) == (2..7));
    }
    #[test]
    fn is_real_flat_mapping_aligned() {
        let maps = fixture();
        // real ordinal 2 of alt 2 is node 4, flat position 2 + 4 - 1
        assert!(maps.r2t(2, 2) == 4);
        assert!(maps.flat_of_real(2, 2) == 5);
        assert!(maps.f2r(5) == 4); // fourth real variable overall
        assert!(maps.f2i(2) == 1); // first intermediate overall
    }
}
