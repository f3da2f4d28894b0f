//! normcache - A client-side normalized cache middleware
//!
//! Caches declarative read queries against a normalized entity/link store
//! and automatically invalidates and re-runs them when mutations change the
//! data they depend on.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;

pub use cache::{Store, StoreSnapshot};
pub use config::CacheConfig;
pub use pipeline::spawn_pipeline;
