//! Cache Exchange
//!
//! The orchestration layer: classifies incoming operations, resolves
//! cacheable reads against the store, and drives write-back, dependency
//! registration, and invalidation for every result returning from the
//! forwarding path.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, DependencyIndex, DependencyKey, OperationRegistry, Store, StoreSnapshot};
use crate::config::CacheConfig;
use crate::models::{Operation, OperationResult, RequestPolicy};
use crate::pipeline::{ReadResolver, WriteResolver};

// == Operation Outcome ==
/// The synchronous outcome of classifying and resolving one operation.
#[derive(Debug)]
pub enum OperationOutcome {
    /// The operation was satisfied from the cache
    Served(OperationResult),
    /// The operation must be forwarded to the network
    Forward(Operation),
}

// == Cache Exchange ==
/// The cache orchestration pipeline.
///
/// Owns the store and both invalidation indices. All mutation happens
/// synchronously inside [`CacheExchange::handle_operation`] and
/// [`CacheExchange::handle_result`]; resubmissions re-enter the pipeline
/// through the host-provided sender rather than recursively, which bounds
/// call-stack growth for chained invalidations.
pub struct CacheExchange<R, W> {
    /// Pipeline configuration
    config: CacheConfig,
    /// Normalized entity/link store
    store: Store,
    /// External read resolver
    read: R,
    /// External write resolver
    write: W,
    /// Dependency key -> pending operation identities
    dependencies: DependencyIndex,
    /// Operation identity -> last registered descriptor
    registry: OperationRegistry,
    /// Pipeline metrics
    stats: CacheStats,
    /// Host resubmission hook: operations sent here re-enter the pipeline
    resubmit: UnboundedSender<Operation>,
}

impl<R, W> CacheExchange<R, W>
where
    R: ReadResolver,
    W: WriteResolver,
{
    // == Constructor ==
    /// Creates a new exchange over `store`.
    ///
    /// # Arguments
    /// * `config` - Pipeline configuration
    /// * `store` - The store, possibly hydrated from a snapshot
    /// * `read` / `write` - The external document resolvers
    /// * `resubmit` - Host hook through which invalidated and background
    ///   operations re-enter the operation stream
    pub fn new(
        config: CacheConfig,
        store: Store,
        read: R,
        write: W,
        resubmit: UnboundedSender<Operation>,
    ) -> Self {
        Self {
            config,
            store,
            read,
            write,
            dependencies: DependencyIndex::new(),
            registry: OperationRegistry::new(),
            stats: CacheStats::new(),
            resubmit,
        }
    }

    // == Annotation ==
    /// One-time normalization applied to every operation before branching.
    ///
    /// Fills in the configured default request policy when the context
    /// carries none. Unrecognized policy strings are left untouched so the
    /// operation classifies as non-cacheable instead of silently changing
    /// behavior. Both the cache branch and the passthrough branch observe
    /// the same annotated instance.
    fn annotate(&self, mut operation: Operation) -> Operation {
        if operation.context.request_policy.is_none() {
            operation.context.request_policy =
                Some(self.config.default_policy.as_str().to_string());
        }
        operation
    }

    // == Handle Operation ==
    /// Classifies and resolves one incoming operation.
    ///
    /// Cacheable queries are resolved against the store: complete ones are
    /// served synchronously (registering their dependencies, and scheduling
    /// a silent background refresh for cache-and-network), incomplete ones
    /// are redirected to forwarding. Everything else passes through.
    pub fn handle_operation(&mut self, operation: Operation) -> OperationOutcome {
        let operation = self.annotate(operation);

        if !operation.is_cacheable() {
            debug!(
                identity = operation.identity,
                kind = ?operation.kind,
                "passthrough operation forwarded"
            );
            return OperationOutcome::Forward(operation);
        }

        // Annotation guarantees a policy; cacheability guarantees it is a
        // cache-participating one.
        let policy = operation
            .request_policy()
            .unwrap_or(self.config.default_policy);

        let outcome = self.read.read(&mut self.store, &operation);

        // cache-only serves whatever is present, even partial or absent
        let complete = policy == RequestPolicy::CacheOnly || outcome.is_complete;

        if !complete {
            debug!(identity = operation.identity, "cache miss, redirecting to network");
            self.stats.record_miss();
            return OperationOutcome::Forward(operation);
        }

        self.register_dependencies(&operation, &outcome.dependencies);
        self.stats.record_hit();

        if policy == RequestPolicy::CacheAndNetwork {
            let refresh = operation.with_policy(RequestPolicy::NetworkOnly);
            debug!(identity = refresh.identity, "scheduling background refresh");
            self.resubmit_operation(refresh);
        }

        debug!(
            identity = operation.identity,
            policy = policy.as_str(),
            "served from cache"
        );
        OperationOutcome::Served(OperationResult::from_cache(operation, outcome.response))
    }

    // == Handle Result ==
    /// Applies write-back to one result emerging from the forwarding path,
    /// before it is emitted downstream.
    ///
    /// A result carrying a fatal transport-level error skips write-back
    /// entirely, as does a null or absent payload. Otherwise the payload is
    /// normalized into the store, previously satisfied dependents of the
    /// touched keys are resubmitted, and the operation itself is registered
    /// under its freshly observed dependencies.
    pub fn handle_result(&mut self, result: OperationResult) -> OperationResult {
        if result.has_fatal_error() {
            debug!(
                identity = result.operation.identity,
                "fatal transport error, skipping write-back"
            );
            return result;
        }

        let data = match &result.data {
            Some(data) if !data.is_null() => data,
            _ => {
                debug!(
                    identity = result.operation.identity,
                    "empty payload, skipping write-back"
                );
                return result;
            }
        };

        let outcome = self.write.write(&mut self.store, &result.operation, data);
        debug!(
            identity = result.operation.identity,
            dependencies = outcome.dependencies.len(),
            "payload written back"
        );

        self.invalidate(&result.operation, &outcome.dependencies);
        self.register_dependencies(&result.operation, &outcome.dependencies);

        result
    }

    // == Dependency Registration ==
    /// Registers `operation` as pending on every key in `dep_keys` and
    /// stores its descriptor for later resubmission.
    fn register_dependencies(&mut self, operation: &Operation, dep_keys: &[DependencyKey]) {
        self.dependencies.register(operation.identity, dep_keys);
        self.registry.insert(operation.clone());
    }

    // == Invalidation ==
    /// Resubmits every operation pending on the given keys, except the
    /// triggering operation itself, which is assumed to be satisfied
    /// through its normal completion path in the same cycle.
    ///
    /// The pending sets are consumed and deduplicated, so an operation
    /// registered under several invalidated keys is resubmitted exactly
    /// once.
    fn invalidate(&mut self, trigger: &Operation, dep_keys: &[DependencyKey]) {
        let pending = self.dependencies.take_pending(dep_keys);
        for identity in pending {
            if identity == trigger.identity {
                continue;
            }
            if let Some(operation) = self.registry.remove(identity) {
                info!(identity, trigger = trigger.identity, "resubmitting invalidated operation");
                self.stats.record_resubmission();
                self.resubmit_operation(operation);
            }
        }
    }

    // == Resubmission ==
    /// Sends an operation back into the operation stream.
    ///
    /// The host guarantees each resubmitted operation re-enters the
    /// pipeline exactly once; a closed channel is logged and dropped
    /// rather than raised, since the cache layer itself never fails an
    /// operation.
    fn resubmit_operation(&mut self, operation: Operation) {
        if self.resubmit.send(operation).is_err() {
            warn!("resubmission channel closed, dropping operation");
        }
    }

    // == Stats ==
    /// Returns current pipeline statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_store_counts(self.store.record_count(), self.store.link_count());
        stats
    }

    // == Snapshot ==
    /// Exports the current store contents.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }
}
