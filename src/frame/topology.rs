use super::kind::FrameKind;
use super::node::NodeKind;
use super::node::TreeRecord;
use crate::api::Dtl;
use crate::api::DtlError;
use crate::MAX_COPA;
use crate::MAX_NOPA;

/// one alternative's tree as integer-linked arrays.
///
/// slot 0 is the virtual alternative root (an event node that is not
/// itself a numbered variable); nodes are 1..=tot. `down` is the first
/// child, `next` the following sibling, both 0-terminated; `up` and
/// `prev` are the reverse links. a flat alternative is the degenerate
/// tree whose consequences all chain directly under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    kind: Vec<NodeKind>,
    down: Vec<usize>,
    next: Vec<usize>,
    up: Vec<usize>,
    prev: Vec<usize>,
}

impl Topology {
    /// flat alternative: n consequences chained under the root
    pub fn flat(n_cons: usize) -> Dtl<Self> {
        if n_cons == 0 || n_cons > MAX_COPA {
            return Err(DtlError::Overflow);
        }
        let n = n_cons;
        let mut this = Self {
            kind: vec![NodeKind::Event; n + 1],
            down: vec![0; n + 1],
            next: vec![0; n + 1],
            up: vec![0; n + 1],
            prev: vec![0; n + 1],
        };
        this.down[0] = 1;
        for k in 1..=n {
            this.kind[k] = NodeKind::Consequence;
            this.next[k] = if k < n { k + 1 } else { 0 };
            this.prev[k] = k - 1;
        }
        Ok(this)
    }

    /// tree alternative from a 1-based record list. node 1 is the single
    /// root of the alternative subtree.
    pub fn tree(records: &[TreeRecord]) -> Dtl<Self> {
        let n = records.len();
        if n == 0 || n > MAX_NOPA {
            return Err(DtlError::Overflow);
        }
        let mut this = Self {
            kind: vec![NodeKind::Event; n + 1],
            down: vec![0; n + 1],
            next: vec![0; n + 1],
            up: vec![0; n + 1],
            prev: vec![0; n + 1],
        };
        this.down[0] = 1;
        for (k, record) in records.iter().enumerate() {
            let k = k + 1;
            if record.next > n || record.down > n {
                return Err(DtlError::FrameCorrupt);
            }
            this.kind[k] = record.kind;
            this.next[k] = record.next;
            this.down[k] = record.down;
        }
        if this.next[1] != 0 {
            return Err(DtlError::FrameCorrupt);
        }
        this.relink()?;
        Ok(this)
    }

    /// rebuild up/prev from down/next and check that every node is
    /// reached exactly once from the root
    fn relink(&mut self) -> Dtl<()> {
        let n = self.tot();
        let mut seen = vec![false; n + 1];
        let mut stack = vec![0usize];
        while let Some(parent) = stack.pop() {
            let mut child = self.down[parent];
            let mut prev = 0;
            while child != 0 {
                if child > n || seen[child] {
                    return Err(DtlError::FrameCorrupt);
                }
                seen[child] = true;
                self.up[child] = parent;
                self.prev[child] = prev;
                stack.push(child);
                prev = child;
                child = self.next[child];
            }
        }
        match seen.iter().skip(1).all(|s| *s) {
            true => Ok(()),
            false => Err(DtlError::FrameCorrupt),
        }
    }

    /// attach-time structure checks for the given frame flavor
    pub fn validate(&self, frame: FrameKind) -> Dtl<()> {
        if self.tot() > MAX_NOPA || self.reals() > MAX_COPA {
            return Err(DtlError::Overflow);
        }
        if self.reals() == 0 {
            return Err(DtlError::FrameCorrupt);
        }
        for k in 1..=self.tot() {
            let kind = self.kind[k];
            match (kind.real(), self.down[k]) {
                // a declared intermediate without a descendant
                (false, 0) => return Err(DtlError::FrameCorrupt),
                // a declared consequence with children
                (true, d) if d != 0 => return Err(DtlError::FrameCorrupt),
                _ => {}
            }
            if kind.choice() {
                if !frame.embedded_choices() {
                    return Err(DtlError::WrongFrameType);
                }
                // choice nodes live at the level immediately below an event
                if self.kind[self.up[k]] != NodeKind::Event {
                    return Err(DtlError::FrameCorrupt);
                }
            }
        }
        Ok(())
    }

    pub fn tot(&self) -> usize {
        self.kind.len() - 1
    }
    pub fn reals(&self) -> usize {
        (1..=self.tot()).filter(|k| self.real(*k)).count()
    }
    pub fn inters(&self) -> usize {
        self.tot() - self.reals()
    }
    pub fn real(&self, node: usize) -> bool {
        self.down[node] == 0
    }
    pub fn kind_of(&self, node: usize) -> NodeKind {
        self.kind[node]
    }
    pub fn parent(&self, node: usize) -> usize {
        self.up[node]
    }
    pub fn first(&self, node: usize) -> usize {
        self.down[node]
    }
    pub fn follower(&self, node: usize) -> usize {
        self.next[node]
    }

    /// children of a node (node 0 addresses the virtual root)
    pub fn children(&self, node: usize) -> Vec<usize> {
        let mut kids = vec![];
        let mut child = self.down[node];
        while child != 0 {
            kids.push(child);
            child = self.next[child];
        }
        kids
    }
    /// the sibling group a node belongs to, itself included
    pub fn group(&self, node: usize) -> Vec<usize> {
        self.children(self.up[node])
    }
    /// all sibling groups, root group first, as (parent, members)
    pub fn groups(&self) -> Vec<(usize, Vec<usize>)> {
        std::iter::once(0)
            .chain((1..=self.tot()).filter(|k| !self.real(*k)))
            .map(|p| (p, self.children(p)))
            .collect()
    }
    /// real leaves in total-index order
    pub fn leaves(&self) -> Vec<usize> {
        (1..=self.tot()).filter(|k| self.real(*k)).collect()
    }

    pub fn nbr_of_siblings(&self, node: usize) -> usize {
        self.group(node).len()
    }
    pub fn different_parents(&self, n1: usize, n2: usize) -> bool {
        self.up[n1] != self.up[n2]
    }
    /// true iff every sibling group is all-real or all-intermediate
    pub fn pure_tree(&self) -> bool {
        self.groups()
            .iter()
            .all(|(_, g)| g.iter().all(|k| self.real(*k)) || g.iter().all(|k| !self.real(*k)))
    }

    /// raw links for snapshot encoding
    pub fn links(&self) -> (Vec<usize>, Vec<usize>) {
        (self.next[1..].to_vec(), self.down[1..].to_vec())
    }
    /// kinds for snapshot encoding
    pub fn kinds(&self) -> Vec<NodeKind> {
        self.kind[1..].to_vec()
    }
}
