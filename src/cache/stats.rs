//! Cache Statistics Module
//!
//! Tracks pipeline performance metrics including hits, misses, and
//! invalidation-driven resubmissions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache pipeline metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of cacheable operations served from the store
    pub hits: u64,
    /// Number of cacheable operations redirected to the network
    pub misses: u64,
    /// Number of operations resubmitted by invalidation
    pub resubmissions: u64,
    /// Current number of entity records in the store
    pub records: usize,
    /// Current number of link entries in the store
    pub links: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no cacheable operation has
    /// been resolved.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Resubmission ==
    /// Increments the resubmission counter.
    pub fn record_resubmission(&mut self) {
        self.resubmissions += 1;
    }

    // == Update Store Counts ==
    /// Updates the record and link counts.
    pub fn set_store_counts(&mut self, records: usize, links: usize) {
        self.records = records;
        self.links = links;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.resubmissions, 0);
        assert_eq!(stats.records, 0);
        assert_eq!(stats.links, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_resubmission() {
        let mut stats = CacheStats::new();
        stats.record_resubmission();
        stats.record_resubmission();
        assert_eq!(stats.resubmissions, 2);
    }

    #[test]
    fn test_set_store_counts() {
        let mut stats = CacheStats::new();
        stats.set_store_counts(42, 7);
        assert_eq!(stats.records, 42);
        assert_eq!(stats.links, 7);
    }
}
