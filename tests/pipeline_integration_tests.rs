//! Integration Tests for the Cache Pipeline
//!
//! Drives the full pipeline end-to-end: cache misses forwarded to a
//! scripted network, write-back normalization, invalidation-triggered
//! resubmission, background refreshes, and snapshot hydration.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::timeout;

use normcache::cache::{Link, Store};
use normcache::config::CacheConfig;
use normcache::models::{Operation, OperationKind, OperationResult, RequestPolicy};
use normcache::pipeline::{
    spawn_pipeline, NetworkLayer, PipelineHandle, ReadOutcome, ReadResolver, WriteOutcome,
    WriteResolver,
};

// == Helper Resolvers ==

/// Resolves `{ viewer { name } }` against the store: follows the
/// `Query.viewer` link and reads the viewer's name. Complete only when
/// both are present.
struct ViewerRead;

impl ReadResolver for ViewerRead {
    fn read(&self, store: &mut Store, _operation: &Operation) -> ReadOutcome {
        let viewer_key = match store.link("Query", "viewer") {
            Some(Link::Single(key)) => Some(key.clone()),
            _ => None,
        };
        let Some(viewer_key) = viewer_key else {
            return ReadOutcome {
                response: None,
                is_complete: false,
                dependencies: store.flush_touched(),
            };
        };

        let name = store.record_value(&viewer_key, "name").cloned();
        let dependencies = store.flush_touched();
        match name {
            Some(name) => ReadOutcome {
                response: Some(json!({ "viewer": { "name": name } })),
                is_complete: true,
                dependencies,
            },
            None => ReadOutcome {
                response: None,
                is_complete: false,
                dependencies,
            },
        }
    }
}

/// Normalizes viewer payloads: `{viewer: {...}}` links the query root to
/// `Viewer:1` and writes its fields; `{updateViewer: {...}}` writes the
/// fields of the existing `Viewer:1` entity.
struct ViewerWrite;

impl WriteResolver for ViewerWrite {
    fn write(&self, store: &mut Store, _operation: &Operation, data: &Value) -> WriteOutcome {
        if let Some(viewer) = data.get("viewer").and_then(Value::as_object) {
            store.write_link("Query", "viewer", Some(Link::Single("Viewer:1".to_string())));
            for (field, value) in viewer {
                store.write_record_value("Viewer:1", field, Some(value.clone()));
            }
        }
        if let Some(updated) = data.get("updateViewer").and_then(Value::as_object) {
            for (field, value) in updated {
                store.write_record_value("Viewer:1", field, Some(value.clone()));
            }
        }
        WriteOutcome {
            dependencies: store.flush_touched(),
        }
    }
}

/// Scripted remote service: queries answer with Ada, mutations rename the
/// viewer to Grace.
struct ViewerNetwork;

#[async_trait]
impl NetworkLayer for ViewerNetwork {
    async fn execute(&self, operation: Operation) -> OperationResult {
        let data = match operation.kind {
            OperationKind::Query => json!({ "viewer": { "name": "Ada" } }),
            OperationKind::Mutation => json!({ "updateViewer": { "name": "Grace" } }),
            OperationKind::Subscription => Value::Null,
        };
        OperationResult::from_network(operation, Some(data), None)
    }
}

// == Helper Functions ==

fn spawn_viewer_pipeline(store: Store) -> PipelineHandle {
    spawn_pipeline(CacheConfig::default(), store, ViewerRead, ViewerWrite, ViewerNetwork)
}

async fn next_result(handle: &mut PipelineHandle) -> OperationResult {
    timeout(Duration::from_secs(5), handle.results.recv())
        .await
        .expect("timed out waiting for a result")
        .expect("pipeline closed unexpectedly")
}

// == End-to-End Invalidation ==

#[tokio::test]
async fn test_mutation_invalidates_and_reruns_cached_query() {
    let mut handle = spawn_viewer_pipeline(Store::new());

    // Q1 misses the empty cache and is forwarded to the network
    let q1 = Operation::new(1, OperationKind::Query, "{ viewer { name } }", RequestPolicy::CacheFirst);
    handle.submit(q1).unwrap();

    let first = next_result(&mut handle).await;
    assert_eq!(first.operation.identity, 1);
    assert_eq!(first.data, Some(json!({ "viewer": { "name": "Ada" } })));

    // M1 renames the viewer; its write-back touches Viewer:1 again
    let m1 = Operation::new(
        2,
        OperationKind::Mutation,
        "mutation { updateViewer { name } }",
        RequestPolicy::NetworkOnly,
    );
    handle.submit(m1).unwrap();

    let second = next_result(&mut handle).await;
    assert_eq!(second.operation.identity, 2);
    assert_eq!(second.data, Some(json!({ "updateViewer": { "name": "Grace" } })));

    // Q1 is resubmitted exactly once and now serves the updated name from
    // the cache
    let third = next_result(&mut handle).await;
    assert_eq!(third.operation.identity, 1);
    assert_eq!(third.data, Some(json!({ "viewer": { "name": "Grace" } })));
    assert!(third.is_complete);

    handle.shutdown();
}

#[tokio::test]
async fn test_second_query_served_from_cache() {
    let mut handle = spawn_viewer_pipeline(Store::new());

    let q1 = Operation::new(1, OperationKind::Query, "{ viewer { name } }", RequestPolicy::CacheFirst);
    handle.submit(q1.clone()).unwrap();
    next_result(&mut handle).await;

    // The same logical query now resolves complete without the network
    handle.submit(q1).unwrap();
    let served = next_result(&mut handle).await;
    assert_eq!(served.data, Some(json!({ "viewer": { "name": "Ada" } })));
    assert!(served.error.is_none());

    handle.shutdown();
}

// == Background Refresh ==

#[tokio::test]
async fn test_cache_and_network_serves_then_refreshes() {
    let mut handle = spawn_viewer_pipeline(Store::new());

    // Populate the cache through a first round trip
    let warmup =
        Operation::new(1, OperationKind::Query, "{ viewer { name } }", RequestPolicy::CacheFirst);
    handle.submit(warmup).unwrap();
    next_result(&mut handle).await;

    // cache-and-network: served synchronously from the cache, then the
    // background refresh result arrives through the write-back path
    let q2 = Operation::new(
        7,
        OperationKind::Query,
        "{ viewer { name } }",
        RequestPolicy::CacheAndNetwork,
    );
    handle.submit(q2).unwrap();

    let served = next_result(&mut handle).await;
    assert_eq!(served.operation.identity, 7);
    assert_eq!(served.operation.request_policy(), Some(RequestPolicy::CacheAndNetwork));
    assert_eq!(served.data, Some(json!({ "viewer": { "name": "Ada" } })));

    let refreshed = next_result(&mut handle).await;
    assert_eq!(refreshed.operation.identity, 7);
    assert_eq!(refreshed.operation.request_policy(), Some(RequestPolicy::NetworkOnly));
    assert_eq!(refreshed.data, Some(json!({ "viewer": { "name": "Ada" } })));

    handle.shutdown();
}

// == Snapshot Hydration ==

#[tokio::test]
async fn test_hydrated_store_serves_without_network() {
    // Export a populated store and rebuild a pipeline from its snapshot
    let mut seed = Store::new();
    seed.write_link("Query", "viewer", Some(Link::Single("Viewer:1".to_string())));
    seed.write_record_value("Viewer:1", "name", Some(json!("Ada")));
    let snapshot = seed.snapshot();

    let mut handle = spawn_viewer_pipeline(Store::from_snapshot(snapshot));

    let q1 = Operation::new(1, OperationKind::Query, "{ viewer { name } }", RequestPolicy::CacheFirst);
    handle.submit(q1).unwrap();

    let served = next_result(&mut handle).await;
    assert_eq!(served.data, Some(json!({ "viewer": { "name": "Ada" } })));
    assert!(served.is_complete);

    handle.shutdown();
}

// == Cache-Only Operations ==

#[tokio::test]
async fn test_cache_only_never_reaches_network() {
    let mut handle = spawn_viewer_pipeline(Store::new());

    // Nothing cached: still served, as complete, with an empty payload
    let q1 = Operation::new(3, OperationKind::Query, "{ viewer { name } }", RequestPolicy::CacheOnly);
    handle.submit(q1).unwrap();

    let served = next_result(&mut handle).await;
    assert_eq!(served.operation.identity, 3);
    assert_eq!(served.data, None);
    assert!(served.is_complete);

    handle.shutdown();
}
