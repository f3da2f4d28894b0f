//! Pipeline Driver
//!
//! Runs the cache exchange as a single cooperative tokio task over the
//! host's operation stream. Store mutations happen synchronously inside the
//! handlers; only network execution is dispatched concurrently, and its
//! results re-enter the loop through an internal return channel.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::Store;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{Operation, OperationResult};
use crate::pipeline::{CacheExchange, NetworkLayer, OperationOutcome, ReadResolver, WriteResolver};

// == Pipeline Handle ==
/// Host-facing handle to a running pipeline.
pub struct PipelineHandle {
    /// Sender feeding operations into the pipeline; resubmissions re-enter
    /// through a clone of this same sender
    pub operations: UnboundedSender<Operation>,
    /// Receiver of every result the pipeline emits downstream
    pub results: UnboundedReceiver<OperationResult>,
    /// The pipeline task, which runs until aborted
    pub task: JoinHandle<()>,
}

impl PipelineHandle {
    /// Feeds one operation into the pipeline.
    pub fn submit(&self, operation: Operation) -> Result<()> {
        self.operations
            .send(operation)
            .map_err(|_| CacheError::PipelineClosed("operations channel closed".to_string()))
    }

    /// Stops the pipeline task.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

// == Spawn Pipeline ==
/// Spawns the cache pipeline over a fresh operation stream.
///
/// Each operation is annotated and classified exactly once; cache hits are
/// emitted synchronously on the results channel, forwards are executed
/// against `network` and written back in arrival order. Invalidated and
/// background-refresh operations re-enter through the operations channel,
/// never recursively, which bounds call-stack growth for chained
/// invalidations.
///
/// # Arguments
/// * `config` - Pipeline configuration
/// * `store` - The store, possibly hydrated from a snapshot
/// * `read` / `write` - The external document resolvers
/// * `network` - The transport seam forwarded operations run against
///
/// # Returns
/// A [`PipelineHandle`] carrying the operations sender, the results
/// receiver, and the task handle used to abort the pipeline during
/// shutdown.
pub fn spawn_pipeline<R, W, N>(
    config: CacheConfig,
    store: Store,
    read: R,
    write: W,
    network: N,
) -> PipelineHandle
where
    R: ReadResolver + Send + 'static,
    W: WriteResolver + Send + 'static,
    N: NetworkLayer + 'static,
{
    let (ops_tx, mut ops_rx) = mpsc::unbounded_channel::<Operation>();
    let (results_tx, results_rx) = mpsc::unbounded_channel::<OperationResult>();
    let (net_tx, mut net_rx) = mpsc::unbounded_channel::<OperationResult>();

    let mut exchange = CacheExchange::new(config, store, read, write, ops_tx.clone());
    let network = Arc::new(network);

    let task = tokio::spawn(async move {
        info!("cache pipeline started");

        loop {
            tokio::select! {
                Some(operation) = ops_rx.recv() => {
                    match exchange.handle_operation(operation) {
                        OperationOutcome::Served(result) => {
                            if results_tx.send(result).is_err() {
                                warn!("results receiver dropped, stopping pipeline");
                                break;
                            }
                        }
                        OperationOutcome::Forward(operation) => {
                            let network = network.clone();
                            let net_tx = net_tx.clone();
                            tokio::spawn(async move {
                                let result = network.execute(operation).await;
                                // The loop may already be gone during shutdown
                                let _ = net_tx.send(result);
                            });
                        }
                    }
                }
                Some(result) = net_rx.recv() => {
                    let result = exchange.handle_result(result);
                    if results_tx.send(result).is_err() {
                        warn!("results receiver dropped, stopping pipeline");
                        break;
                    }
                }
                else => break,
            }
        }

        debug!("cache pipeline stopped");
    });

    PipelineHandle {
        operations: ops_tx,
        results: results_rx,
        task,
    }
}
