use super::tag::Tag;
use std::collections::BTreeMap;

/// registry of live allocations by class.
///
/// every owning component registers what it allocates with a tag and a
/// source label, and releases it on disposal. the engine checks the
/// registry at exit and reports a leak if any count is still positive.
#[derive(Debug, Default)]
pub struct Arena {
    counts: BTreeMap<Tag, usize>,
    labels: BTreeMap<Tag, Vec<&'static str>>,
}

impl Arena {
    pub fn register(&mut self, tag: Tag, label: &'static str) {
        log::debug!("arena register {} ({})", tag, label);
        *self.counts.entry(tag).or_insert(0) += 1;
        self.labels.entry(tag).or_default().push(label);
    }
    pub fn release(&mut self, tag: Tag, label: &'static str) {
        log::debug!("arena release {} ({})", tag, label);
        let count = self.counts.entry(tag).or_insert(0);
        assert!(*count > 0, "release without register ({})", tag);
        *count -= 1;
        let labels = self.labels.entry(tag).or_default();
        if let Some(i) = labels.iter().rposition(|l| *l == label) {
            labels.remove(i);
        }
    }
    /// total number of still-registered allocations
    pub fn leaks(&self) -> usize {
        self.counts.values().sum()
    }
    /// live count for one class
    pub fn count(&self, tag: Tag) -> usize {
        self.counts.get(&tag).copied().unwrap_or(0)
    }
    /// labels of everything still registered, for the exit report
    pub fn survivors(&self) -> Vec<(Tag, &'static str)> {
        Tag::ALL
            .iter()
            .flat_map(|t| {
                self.labels
                    .get(t)
                    .into_iter()
                    .flatten()
                    .map(|l| (*t, *l))
            })
            .collect()
    }
}

impl std::fmt::Display for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for tag in Tag::ALL {
            write!(f, "{}:{} ", tag, self.count(tag))?;
        }
        Ok(())
    }
}
