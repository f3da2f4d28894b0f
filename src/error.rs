//! Error types for the cache middleware
//!
//! Provides unified error handling using thiserror.
//!
//! Missing entities and incomplete reads are not errors: absence counts
//! toward an incompleteness verdict that routes the operation to the
//! network instead.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache middleware.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Snapshot serialization or deserialization failed
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The pipeline channels were closed by the host
    #[error("Pipeline closed: {0}")]
    PipelineClosed(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache middleware.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_error_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CacheError::from(parse_err);
        assert!(matches!(err, CacheError::Snapshot(_)));
        assert!(err.to_string().starts_with("Snapshot error"));
    }

    #[test]
    fn test_pipeline_closed_display() {
        let err = CacheError::PipelineClosed("results receiver dropped".to_string());
        assert_eq!(err.to_string(), "Pipeline closed: results receiver dropped");
    }
}
