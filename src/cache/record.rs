//! Record Value Model
//!
//! Defines the normalized value shapes stored for entities and links.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Key Aliases ==
/// Stable string identity of a normalized entity (typically type + id).
pub type EntityKey = String;

/// Key associating a cached read with the data it depends on.
///
/// Either a concrete entity key or a broader scope such as a bare type name
/// used for list-level invalidation.
pub type DependencyKey = String;

/// Stable integer identity of a logical operation (query + variables).
pub type OperationId = u64;

// == Field Value ==
/// A single stored attribute of an entity.
///
/// A field is either a scalar value or a tombstone marking the field as
/// removed. Tombstones keep the field slot occupied so a removal survives
/// snapshot round trips, while reads treat it as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A present scalar value (may itself be JSON null)
    Scalar(Value),
    /// The field was explicitly removed
    Tombstone,
}

impl FieldValue {
    /// Returns the scalar value, or None for a tombstone.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            FieldValue::Tombstone => None,
        }
    }
}

// == Link ==
/// A typed pointer from a (container, field) position to entity key(s).
///
/// Stored in a namespace separate from scalar fields. A stored `Null` is a
/// valid value (the field is known to point at nothing); removing a link
/// entirely is done by writing `None` through the store API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Link {
    /// The field points at nothing
    Null,
    /// The field points at a single entity
    Single(EntityKey),
    /// The field points at an ordered list of entities
    List(Vec<EntityKey>),
}

// == Entity Record ==
/// An addressable normalized record: an ordered mapping from field name to
/// stored value. Mutable in place; no versioning.
pub type EntityRecord = BTreeMap<String, FieldValue>;
