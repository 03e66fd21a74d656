//! Cache Module
//!
//! The read-through cache core: fingerprint-keyed persistent entries with
//! TTL freshness, dual-axis eviction, and an optional in-memory working set.

mod coordinator;
mod entry;
mod eviction;
mod fifo;
mod stats;
mod working_set;


// Re-export public types
pub use coordinator::QueryCache;
pub use entry::CacheEntry;
pub use eviction::EvictionManager;
pub use fifo::FifoTracker;
pub use stats::CacheStats;
pub use working_set::{WorkingSet, WorkingSetEntry};
