//! Operation and result models for the cache pipeline
//!
//! This module defines the operation descriptor consumed by the pipeline
//! and the result shape produced by the cache and the network layer.

mod operation;
mod result;

pub use operation::{Operation, OperationContext, OperationKind, RequestPolicy};
pub use result::{CombinedError, OperationResult};
