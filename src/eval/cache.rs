use crate::bnormal::bnormal::Bnormal;
use crate::moment::rule::Rule;
use std::collections::BTreeMap;

/// one finished evaluation: the fitted distribution and the hull
/// triple it was fitted over, remembered per criterion so that mass
/// and support queries can follow without recomputation.
#[derive(Debug, Clone)]
pub struct Entry {
    pub rule: Rule,
    pub pair: (usize, usize),
    pub bn: Bnormal,
    pub lo: f64,
    pub mid: f64,
    pub up: f64,
}

/// the evaluation cache. entries are stamped with the frame-wide base
/// generation; any mutation anywhere in the frame moves the stamp and
/// drops every entry at the next read.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: BTreeMap<i32, Entry>,
    latest_mc: Option<i32>,
    stamp: u64,
}

impl Cache {
    /// reconcile with the frame generation before any read or write
    pub fn sync(&mut self, generation: u64) {
        if self.stamp != generation {
            self.entries.clear();
            self.latest_mc = None;
            self.stamp = generation;
        }
    }
    pub fn put(&mut self, crit: i32, entry: Entry) {
        if crit <= 0 {
            self.latest_mc = Some(crit);
        }
        self.entries.insert(crit, entry);
    }
    pub fn get(&self, crit: i32) -> Option<&Entry> {
        self.entries.get(&crit)
    }
    /// the most recent aggregate evaluation, for partial-tree mass
    /// queries addressed to "the MC result"
    pub fn latest_mc(&self) -> Option<i32> {
        self.latest_mc
    }
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.latest_mc = None;
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
