//! Dedup ledger: indirect objects already attributed during an audit.

use std::collections::HashSet;

use crate::model::ObjectId;

/// Set of object ids whose bytes have already been counted.
///
/// Grows monotonically for the lifetime of one audit. An id is inserted by
/// the first attribution that touches it; every later attempt is a no-op.
#[derive(Debug, Clone, Default)]
pub struct DedupLedger {
    seen: HashSet<ObjectId>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.seen.contains(&id)
    }

    /// Returns `true` if the id was not present before.
    pub fn insert(&mut self, id: ObjectId) -> bool {
        self.seen.insert(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
