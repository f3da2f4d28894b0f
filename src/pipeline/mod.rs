//! Pipeline Module
//!
//! Provides the cache orchestration layer: resolver seams, the exchange
//! that classifies and resolves operations, and the tokio driver that runs
//! it over the host's operation stream.

mod driver;
mod exchange;
mod resolvers;

// Re-export public types
pub use driver::{spawn_pipeline, PipelineHandle};
pub use exchange::{CacheExchange, OperationOutcome};
pub use resolvers::{NetworkLayer, ReadOutcome, ReadResolver, WriteOutcome, WriteResolver};
