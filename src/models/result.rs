//! Operation Result Model
//!
//! Defines the result shape produced by the network layer and consumed by
//! downstream subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Operation;

// == Combined Error ==
/// Errors attached to an operation result.
///
/// A network error is fatal at the transport level and suppresses write-back;
/// response errors are opaque payload-level errors passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedError {
    /// Fatal transport-level failure, if any
    #[serde(rename = "networkError", default, skip_serializing_if = "Option::is_none")]
    pub network_error: Option<String>,
    /// Opaque payload-level errors
    #[serde(rename = "responseErrors", default, skip_serializing_if = "Vec::is_empty")]
    pub response_errors: Vec<Value>,
}

impl CombinedError {
    /// Creates an error carrying a fatal transport failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            network_error: Some(message.into()),
            response_errors: Vec::new(),
        }
    }

    /// Returns true if the result must skip write-back.
    pub fn is_fatal(&self) -> bool {
        self.network_error.is_some()
    }
}

fn default_complete() -> bool {
    true
}

// == Operation Result ==
/// The result of one operation, from the cache or the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The operation this result answers
    pub operation: Operation,
    /// The response payload, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Errors attached to the result, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CombinedError>,
    /// Internal completeness flag attached to cache-originated results
    #[serde(skip, default = "default_complete")]
    pub is_complete: bool,
}

impl OperationResult {
    // == Constructors ==
    /// Creates a cache-originated result.
    pub fn from_cache(operation: Operation, data: Option<Value>) -> Self {
        Self {
            operation,
            data,
            error: None,
            is_complete: true,
        }
    }

    /// Creates a network-originated result.
    pub fn from_network(operation: Operation, data: Option<Value>, error: Option<CombinedError>) -> Self {
        Self {
            operation,
            data,
            error,
            is_complete: true,
        }
    }

    // == Fatal Error ==
    /// Returns true if the result carries a fatal transport-level error.
    pub fn has_fatal_error(&self) -> bool {
        self.error.as_ref().is_some_and(CombinedError::is_fatal)
    }
}
