//! Cache Store Module
//!
//! Normalized entity/link storage with touch tracking for dependency
//! discovery. The store grows for the lifetime of the cache instance; the
//! only removals are field tombstones and link deletions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{is_root_key, DependencyKey, EntityKey, EntityRecord, FieldValue, Link};
use crate::error::Result;

// == Store Snapshot ==
/// Serializable image of the full store contents.
///
/// Round-trippable through [`Store::from_snapshot`] and [`Store::snapshot`];
/// used only at process boundaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Entity records keyed by entity key
    pub records: HashMap<EntityKey, EntityRecord>,
    /// Link values keyed by `container.field`
    pub links: HashMap<String, Link>,
}

// == Store ==
/// Normalized entity/link store.
///
/// Scalar fields and links live in separate namespaces. Every data access
/// through the read/write methods appends the touched entity key to an
/// internal log; [`Store::flush_touched`] is the sole mechanism for
/// discovering which dependency keys an operation affected.
#[derive(Debug, Default)]
pub struct Store {
    /// Entity records keyed by entity key
    records: HashMap<EntityKey, EntityRecord>,
    /// Link values keyed by `container.field`
    links: HashMap<String, Link>,
    /// Keys accessed since the last flush, in access order, not deduplicated
    touched: Vec<EntityKey>,
}

/// Joins a container key and field name into a link namespace key.
fn link_key(key: &str, field: &str) -> String {
    format!("{}.{}", key, field)
}

impl Store {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store hydrated from a previously exported snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            records: snapshot.records,
            links: snapshot.links,
            touched: Vec::new(),
        }
    }

    // == Touch Tracking ==
    /// Records a key access.
    ///
    /// Root pseudo-entities (query/mutation/subscription roots) are excluded
    /// so they never leak into dependency sets: every operation reads the
    /// query root, and tracking it would invalidate every cached operation
    /// on every write.
    fn touch(&mut self, key: &str) {
        if !is_root_key(key) {
            self.touched.push(key.to_string());
        }
    }

    /// Returns the deduplicated, first-occurrence-ordered list of all keys
    /// touched since the previous flush, then resets the log.
    pub fn flush_touched(&mut self) -> Vec<DependencyKey> {
        let mut seen = HashSet::new();
        self.touched
            .drain(..)
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }

    // == Entity Records ==
    /// Returns the entity record stored under `key`, recording the access.
    pub fn record(&mut self, key: &str) -> Option<&EntityRecord> {
        self.touch(key);
        self.records.get(key)
    }

    /// Returns the record under `key`, creating an empty one if absent.
    ///
    /// Creation is immediately visible to subsequent reads; there is no
    /// transaction boundary. Does not record an access by itself.
    pub fn record_mut(&mut self, key: &str) -> &mut EntityRecord {
        self.records.entry(key.to_string()).or_default()
    }

    /// Reads a single scalar field of an entity, recording the access.
    ///
    /// Returns None for a missing entity, a missing field, or a tombstone.
    pub fn record_value(&mut self, key: &str, field: &str) -> Option<&Value> {
        self.touch(key);
        self.records
            .get(key)
            .and_then(|record| record.get(field))
            .and_then(FieldValue::as_scalar)
    }

    /// Writes a single scalar field of an entity, recording the access.
    ///
    /// `None` writes a tombstone (the field reads as absent afterwards);
    /// `Some` upserts the value.
    pub fn write_record_value(&mut self, key: &str, field: &str, value: Option<Value>) {
        self.touch(key);
        let record = self.record_mut(key);
        let stored = match value {
            Some(value) => FieldValue::Scalar(value),
            None => FieldValue::Tombstone,
        };
        record.insert(field.to_string(), stored);
    }

    // == Links ==
    /// Reads the link stored at `key.field`, recording the access against
    /// the container key.
    pub fn link(&mut self, key: &str, field: &str) -> Option<&Link> {
        self.touch(key);
        self.links.get(&link_key(key, field))
    }

    /// Writes the link at `key.field`, recording the access against the
    /// container key. `None` removes the link entry; note that
    /// `Some(Link::Null)` is a storable value, not a removal.
    pub fn write_link(&mut self, key: &str, field: &str, value: Option<Link>) {
        self.touch(key);
        match value {
            Some(link) => {
                self.links.insert(link_key(key, field), link);
            }
            None => {
                self.links.remove(&link_key(key, field));
            }
        }
    }

    // == Snapshot ==
    /// Exports the full store contents. The touched-key log is not part of
    /// the snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: self.records.clone(),
            links: self.links.clone(),
        }
    }

    /// Serializes the store contents to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Builds a store from a JSON string produced by [`Store::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    // == Counts ==
    /// Returns the number of entity records in the store.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns the number of link entries in the store.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
