//! Resolver and Network Seams
//!
//! Collaborator contracts consumed by the pipeline. Document normalization
//! lives behind the read/write resolver traits; transport lives behind the
//! network layer trait. The pipeline never walks a selection set itself.

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{DependencyKey, Store};
use crate::models::{Operation, OperationResult};

// == Read Outcome ==
/// What a read resolver produced for one operation.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    /// The assembled response payload, if any
    pub response: Option<Value>,
    /// Whether the cache held everything the operation asked for
    pub is_complete: bool,
    /// Every dependency key the resolution observed
    pub dependencies: Vec<DependencyKey>,
}

// == Write Outcome ==
/// What a write resolver produced while normalizing one payload.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Every dependency key the normalization touched
    pub dependencies: Vec<DependencyKey>,
}

// == Read Resolver ==
/// Resolves an operation against the store.
///
/// Implementations walk the operation's selection set over the stored
/// records and links. They must only mutate the store through its own
/// touch tracking as a read side effect, never through field or link
/// writes.
pub trait ReadResolver {
    /// Resolves `operation` against `store`.
    fn read(&self, store: &mut Store, operation: &Operation) -> ReadOutcome;
}

// == Write Resolver ==
/// Normalizes a response payload into the store.
///
/// Implementations flatten `data` into entity/link writes and report every
/// dependency key the normalization touched.
pub trait WriteResolver {
    /// Normalizes `data` for `operation` into `store`.
    fn write(&self, store: &mut Store, operation: &Operation, data: &Value) -> WriteOutcome;
}

// == Network Layer ==
/// Executes a forwarded operation against the remote service.
///
/// Transport itself is external; this is only the seam the pipeline driver
/// forwards through.
#[async_trait]
pub trait NetworkLayer: Send + Sync {
    /// Executes `operation` and returns its result.
    async fn execute(&self, operation: Operation) -> OperationResult;
}
