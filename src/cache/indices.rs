//! Dependency and Operation Indices
//!
//! Publish/subscribe bookkeeping for invalidation: the dependency index maps
//! a dependency key to the operations pending on it, and the operation
//! registry holds the last descriptor known for each operation identity so
//! it can be retrieved and resubmitted.

use std::collections::{HashMap, HashSet};

use crate::cache::{DependencyKey, OperationId};
use crate::models::Operation;

// == Dependency Index ==
/// Maps a dependency key to the identities of operations that must be
/// re-run when that key's underlying data changes.
///
/// An entry is reset to empty (not deleted) when consumed, so the key
/// remains valid for future registrations.
#[derive(Debug, Default)]
pub struct DependencyIndex {
    /// Pending operation identities per dependency key
    pending: HashMap<DependencyKey, Vec<OperationId>>,
}

impl DependencyIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Appends `id` to the pending list of every key in `dep_keys`,
    /// creating lists as needed.
    pub fn register(&mut self, id: OperationId, dep_keys: &[DependencyKey]) {
        for key in dep_keys {
            self.pending.entry(key.clone()).or_default().push(id);
        }
    }

    // == Take Pending ==
    /// Consumes the pending lists of every key in `dep_keys`.
    ///
    /// Each non-empty list is swapped to empty and its entries are unioned
    /// into a single deduplicated set, returned in first-occurrence order.
    /// An operation registered under multiple consumed keys appears exactly
    /// once.
    pub fn take_pending(&mut self, dep_keys: &[DependencyKey]) -> Vec<OperationId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for key in dep_keys {
            if let Some(list) = self.pending.get_mut(key) {
                for id in std::mem::take(list) {
                    if seen.insert(id) {
                        ids.push(id);
                    }
                }
            }
        }
        ids
    }

    // == Pending Count ==
    /// Returns the number of identities currently pending on `key`.
    pub fn pending_on(&self, key: &str) -> usize {
        self.pending.get(key).map_or(0, Vec::len)
    }
}

// == Operation Registry ==
/// Maps an operation identity to the last operation descriptor known to
/// depend on some dependency key.
///
/// Overwritten on every registration (last write wins); entries are removed
/// exactly when they are the target of a resubmission, so an identity maps
/// to at most one live entry at a time.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    /// Last registered descriptor per operation identity
    entries: HashMap<OperationId, Operation>,
}

impl OperationRegistry {
    // == Constructor ==
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores `operation` under its own identity, replacing any previous
    /// entry.
    pub fn insert(&mut self, operation: Operation) {
        self.entries.insert(operation.identity, operation);
    }

    // == Remove ==
    /// Removes and returns the entry for `id`, if any.
    pub fn remove(&mut self, id: OperationId) -> Option<Operation> {
        self.entries.remove(&id)
    }

    // == Contains ==
    /// Checks whether an entry is registered for `id`.
    pub fn contains(&self, id: OperationId) -> bool {
        self.entries.contains_key(&id)
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
