//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, origin calls,
//! and eviction activity.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
///
/// Counters accumulate over the cache's lifetime; the `store_entries` and
/// working-set fields are snapshots taken when the stats are read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of gets served from a fresh stored entry
    pub hits: u64,
    /// Number of gets with no stored entry
    pub misses: u64,
    /// Number of gets whose stored entry had outlived its TTL
    pub stale_misses: u64,
    /// Number of queries executed against the origin
    pub origin_calls: u64,
    /// Number of origin executions that failed
    pub origin_failures: u64,
    /// Number of rows removed by persistent-size eviction
    pub size_evictions: u64,
    /// Number of entries evicted from the in-memory working set
    pub working_set_evictions: u64,
    /// Number of store read failures degraded to misses
    pub degraded_reads: u64,
    /// Number of store write or eviction failures absorbed after a
    /// successful origin fetch
    pub degraded_writes: u64,
    /// Current number of rows in the persistent store
    pub store_entries: u64,
    /// Current number of entries in the working set
    pub working_set_entries: usize,
    /// Current accounted byte size of the working set
    pub working_set_bytes: u64,
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
    /// Stale entries count as misses since they cost an origin call.
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.stale_misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the fresh-hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Stale Miss ==
    /// Increments the stale-miss counter.
    pub fn record_stale_miss(&mut self) {
        self.stale_misses += 1;
    }

    // == Record Origin Call ==
    /// Increments the origin-call counter.
    pub fn record_origin_call(&mut self) {
        self.origin_calls += 1;
    }

    // == Record Origin Failure ==
    /// Increments the origin-failure counter.
    pub fn record_origin_failure(&mut self) {
        self.origin_failures += 1;
    }

    // == Record Size Evictions ==
    /// Adds removed rows to the size-eviction counter.
    pub fn record_size_evictions(&mut self, removed: u64) {
        self.size_evictions += removed;
    }

    // == Record Working Set Evictions ==
    /// Adds evicted entries to the working-set eviction counter.
    pub fn record_working_set_evictions(&mut self, evicted: u64) {
        self.working_set_evictions += evicted;
    }

    // == Record Degraded Read ==
    /// Increments the degraded-read counter.
    pub fn record_degraded_read(&mut self) {
        self.degraded_reads += 1;
    }

    // == Record Degraded Write ==
    /// Increments the degraded-write counter.
    pub fn record_degraded_write(&mut self) {
        self.degraded_writes += 1;
    }

    // == Update Store Entries ==
    /// Updates the persistent store row count snapshot.
    pub fn set_store_entries(&mut self, count: u64) {
        self.store_entries = count;
    }

    // == Update Working Set ==
    /// Updates the working set snapshot fields.
    pub fn set_working_set(&mut self, entries: usize, bytes: u64) {
        self.working_set_entries = entries;
        self.working_set_bytes = bytes;
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
        assert_eq!(stats.stale_misses, 0);
        assert_eq!(stats.origin_calls, 0);
        assert_eq!(stats.size_evictions, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_counts_stale_as_miss() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_stale_miss();
        stats.record_stale_miss();
        assert_eq!(stats.hit_rate(), 0.25);
    }

    #[test]
    fn test_eviction_counters_accumulate() {
        let mut stats = CacheStats::new();
        stats.record_size_evictions(10);
        stats.record_size_evictions(3);
        stats.record_working_set_evictions(2);
        assert_eq!(stats.size_evictions, 13);
        assert_eq!(stats.working_set_evictions, 2);
    }

    #[test]
    fn test_degraded_counters() {
        let mut stats = CacheStats::new();
        stats.record_degraded_read();
        stats.record_degraded_write();
        stats.record_degraded_write();
        assert_eq!(stats.degraded_reads, 1);
        assert_eq!(stats.degraded_writes, 2);
    }

    #[test]
    fn test_snapshot_setters() {
        let mut stats = CacheStats::new();
        stats.set_store_entries(42);
        stats.set_working_set(3, 4096);
        assert_eq!(stats.store_entries, 42);
        assert_eq!(stats.working_set_entries, 3);
        assert_eq!(stats.working_set_bytes, 4096);
    }
}
