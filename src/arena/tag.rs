/// allocation classes tracked by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tag {
    Frame,
    Base,
    Maps,
    Cache,
    Snapshot,
    Scratch,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::Frame,
        Tag::Base,
        Tag::Maps,
        Tag::Cache,
        Tag::Snapshot,
        Tag::Scratch,
    ];
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Tag::Frame => write!(f, "frame"),
            Tag::Base => write!(f, "base"),
            Tag::Maps => write!(f, "maps"),
            Tag::Cache => write!(f, "cache"),
            Tag::Snapshot => write!(f, "snapshot"),
            Tag::Scratch => write!(f, "scratch"),
        }
    }
}
