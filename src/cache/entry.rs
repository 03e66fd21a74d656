//! Cache Entry Module
//!
//! Defines the structure persisted for each cached query result.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::fingerprint::Fingerprint;

// == Cache Entry ==
/// A single persisted cache entry.
///
/// Entries are immutable once written: a stale entry is deleted and a fresh
/// one inserted on the next miss, never updated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cache key derived from the query text
    pub fingerprint: Fingerprint,
    /// The query text exactly as issued by the caller
    pub query_text: String,
    /// JSON-serialized result set
    pub serialized_result: String,
    /// Insertion timestamp
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(
        fingerprint: Fingerprint,
        query_text: impl Into<String>,
        serialized_result: impl Into<String>,
    ) -> Self {
        Self {
            fingerprint,
            query_text: query_text.into(),
            serialized_result: serialized_result.into(),
            inserted_at: Utc::now(),
        }
    }

    // == Age ==
    /// Elapsed time since insertion.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.inserted_at)
    }

    // == Freshness ==
    /// Checks whether the entry is still fresh under the given TTL.
    ///
    /// Boundary condition: an entry is fresh while `now - inserted_at < ttl`
    /// and stale the instant the full TTL has elapsed.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age().num_milliseconds() < ttl.as_millis() as i64
    }

    /// Inverse of [`CacheEntry::is_fresh`].
    pub fn is_stale(&self, ttl: Duration) -> bool {
        !self.is_fresh(ttl)
    }
}
