//! Persistent Store Module
//!
//! Durable storage for serialized query results, keyed by fingerprint.

mod sqlite;

// Re-export public types
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;
use crate::error::Result;
use crate::fingerprint::Fingerprint;

// == Result Store Trait ==
/// Persistent storage backend for cached query results.
///
/// Writers insert without a uniqueness constraint, so implementations must
/// tolerate duplicate rows per fingerprint: `get` resolves to the newest row
/// and `delete` removes every row carrying the fingerprint.
pub trait ResultStore: Send + Sync {
    /// Retrieves the newest stored entry for a fingerprint.
    ///
    /// Returns `Ok(None)` when no row exists.
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>>;

    /// Inserts a new entry, leaving any existing rows for the same
    /// fingerprint in place.
    fn put(&self, entry: &CacheEntry) -> Result<()>;

    /// Removes every row stored under the fingerprint.
    ///
    /// Returns the number of rows removed.
    fn delete(&self, fingerprint: &Fingerprint) -> Result<usize>;

    /// Returns fingerprints of the oldest rows, oldest first.
    fn list_oldest(&self, limit: usize) -> Result<Vec<Fingerprint>>;

    /// Returns the physical size of the store in bytes.
    fn physical_size_bytes(&self) -> Result<u64>;

    /// Returns the number of stored rows.
    fn entry_count(&self) -> Result<u64>;

    /// Removes every row inserted at or before `cutoff`.
    ///
    /// Returns the number of rows removed.
    fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
