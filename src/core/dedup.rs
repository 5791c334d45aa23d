use crate::domain::model::{DedupKey, TransformedRow};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Duplicate,
}

/// Remembers every trip key seen during one run. Keys are never evicted, so
/// memory grows with the number of distinct trips; build one per run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<DedupKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, row: &TransformedRow) -> Admission {
        if self.seen.insert(row.dedup_key()) {
            Admission::Admitted
        } else {
            Admission::Duplicate
        }
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
