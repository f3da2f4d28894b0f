//! Configuration Module
//!
//! Handles loading and managing cache pipeline configuration from
//! environment variables.

use std::env;

use crate::models::RequestPolicy;

/// Cache pipeline configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Request policy applied to operations whose context carries none
    pub default_policy: RequestPolicy,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment
    /// variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_REQUEST_POLICY` - Fallback request policy
    ///   (default: cache-first). Unrecognized values fall back to the
    ///   default rather than failing.
    pub fn from_env() -> Self {
        Self {
            default_policy: env::var("DEFAULT_REQUEST_POLICY")
                .ok()
                .and_then(|v| RequestPolicy::parse(&v))
                .unwrap_or(RequestPolicy::CacheFirst),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_policy: RequestPolicy::CacheFirst,
        }
    }
}
