/// frame flavors. PS is a single-criterion probabilistic frame, PM the
/// multi-criterion composite, DM a decision tree with embedded choice
/// nodes, SM the tree flavor reserved for stakeholder add-ons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    PS,
    PM,
    DM,
    SM,
}

impl FrameKind {
    pub fn multicriteria(&self) -> bool {
        matches!(self, FrameKind::PM)
    }
    /// whether choice nodes may appear inside alternative trees
    pub fn embedded_choices(&self) -> bool {
        matches!(self, FrameKind::DM | FrameKind::SM)
    }
}

// char isomorphism
impl From<FrameKind> for char {
    fn from(k: FrameKind) -> char {
        match k {
            FrameKind::PS => 'S',
            FrameKind::PM => 'M',
            FrameKind::DM => 'D',
            FrameKind::SM => 'K',
        }
    }
}
impl TryFrom<char> for FrameKind {
    type Error = ();
    fn try_from(c: char) -> Result<Self, ()> {
        match c {
            'S' => Ok(FrameKind::PS),
            'M' => Ok(FrameKind::PM),
            'D' => Ok(FrameKind::DM),
            'K' => Ok(FrameKind::SM),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FrameKind::PS => write!(f, "PS"),
            FrameKind::PM => write!(f, "PM"),
            FrameKind::DM => write!(f, "DM"),
            FrameKind::SM => write!(f, "SM"),
        }
    }
}
