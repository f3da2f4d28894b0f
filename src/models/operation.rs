//! Operation Model
//!
//! Defines the immutable operation descriptor consumed by the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::OperationId;

// == Operation Kind ==
/// The kind of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Read-only query form
    Query,
    /// Mutating operation
    Mutation,
    /// Long-lived server push
    Subscription,
}

// == Request Policy ==
/// Per-operation strategy selecting how the cache participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestPolicy {
    /// Serve from cache when complete, otherwise forward
    CacheFirst,
    /// Serve from cache when complete and refresh in the background
    CacheAndNetwork,
    /// Serve whatever the cache holds, even partial or absent
    CacheOnly,
    /// Bypass the cache entirely
    NetworkOnly,
}

impl RequestPolicy {
    /// Parses a policy string, returning None for unrecognized values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cache-first" => Some(RequestPolicy::CacheFirst),
            "cache-and-network" => Some(RequestPolicy::CacheAndNetwork),
            "cache-only" => Some(RequestPolicy::CacheOnly),
            "network-only" => Some(RequestPolicy::NetworkOnly),
            _ => None,
        }
    }

    /// Returns the wire spelling of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPolicy::CacheFirst => "cache-first",
            RequestPolicy::CacheAndNetwork => "cache-and-network",
            RequestPolicy::CacheOnly => "cache-only",
            RequestPolicy::NetworkOnly => "network-only",
        }
    }

    /// Returns true if the policy lets a query be resolved from the cache.
    pub fn is_cacheable(&self) -> bool {
        matches!(
            self,
            RequestPolicy::CacheFirst | RequestPolicy::CacheAndNetwork | RequestPolicy::CacheOnly
        )
    }
}

// == Operation Context ==
/// Per-operation context carried through the pipeline.
///
/// The request policy is kept as its wire string so unrecognized values
/// survive round trips verbatim; they parse to no recognized policy and
/// classify as non-cacheable. Fields other than the policy are opaque to
/// this layer and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationContext {
    /// The request policy string, if present
    #[serde(rename = "requestPolicy", default, skip_serializing_if = "Option::is_none")]
    pub request_policy: Option<String>,
    /// Opaque host fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperationContext {
    /// Returns the recognized request policy, if any.
    ///
    /// Missing and unrecognized policies both return None; the caller
    /// decides whether a default applies (only to missing ones).
    pub fn policy(&self) -> Option<RequestPolicy> {
        self.request_policy.as_deref().and_then(RequestPolicy::parse)
    }
}

// == Operation ==
/// An immutable operation descriptor.
///
/// The identity is stable for identical query + variables; two operations
/// with the same identity are the same logical request. The query document
/// is opaque to this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Stable integer identity of the logical request
    pub identity: OperationId,
    /// Operation kind
    pub kind: OperationKind,
    /// The query document, opaque to the cache layer
    pub query: String,
    /// Request context
    #[serde(default)]
    pub context: OperationContext,
}

impl Operation {
    // == Constructor ==
    /// Creates an operation with the given request policy.
    pub fn new(
        identity: OperationId,
        kind: OperationKind,
        query: impl Into<String>,
        policy: RequestPolicy,
    ) -> Self {
        Self {
            identity,
            kind,
            query: query.into(),
            context: OperationContext {
                request_policy: Some(policy.as_str().to_string()),
                extra: Map::new(),
            },
        }
    }

    // == Request Policy ==
    /// Returns the recognized request policy, if any.
    pub fn request_policy(&self) -> Option<RequestPolicy> {
        self.context.policy()
    }

    // == Cacheability ==
    /// Returns true if this operation may be resolved against the cache.
    ///
    /// Only queries with a cache-participating policy qualify; mutations,
    /// subscriptions, network-only queries, and operations with an
    /// unrecognized policy all pass straight through.
    pub fn is_cacheable(&self) -> bool {
        self.kind == OperationKind::Query
            && self.request_policy().is_some_and(|p| p.is_cacheable())
    }

    // == Policy Rewrite ==
    /// Clones the operation with its request policy rewritten, preserving
    /// identity and every other context field.
    pub fn with_policy(&self, policy: RequestPolicy) -> Self {
        let mut operation = self.clone();
        operation.context.request_policy = Some(policy.as_str().to_string());
        operation
    }
}
