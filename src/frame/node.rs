/// node flavors inside an alternative tree. consequences are the real
/// leaves and carry values; the rest are intermediates carrying
/// structure only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Decision,
    Event,
    Consequence,
    Frame,
}

impl NodeKind {
    pub fn real(&self) -> bool {
        matches!(self, NodeKind::Consequence)
    }
    /// choice nodes are restricted to the level below an event node
    pub fn choice(&self) -> bool {
        matches!(self, NodeKind::Decision | NodeKind::Frame)
    }
}

// char isomorphism
impl From<NodeKind> for char {
    fn from(k: NodeKind) -> char {
        match k {
            NodeKind::Decision => 'D',
            NodeKind::Event => 'E',
            NodeKind::Consequence => 'C',
            NodeKind::Frame => 'F',
        }
    }
}
impl TryFrom<char> for NodeKind {
    type Error = ();
    fn try_from(c: char) -> Result<Self, ()> {
        match c {
            'D' => Ok(NodeKind::Decision),
            'E' => Ok(NodeKind::Event),
            'C' => Ok(NodeKind::Consequence),
            'F' => Ok(NodeKind::Frame),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// one row of the recursive tree description handed to the tree frame
/// constructors. links are 1-based node numbers, 0 terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeRecord {
    pub kind: NodeKind,
    pub next: usize,
    pub down: usize,
}

impl From<(char, usize, usize)> for TreeRecord {
    fn from((kind, next, down): (char, usize, usize)) -> Self {
        Self {
            kind: NodeKind::try_from(kind).expect("node kind char"),
            next,
            down,
        }
    }
}
