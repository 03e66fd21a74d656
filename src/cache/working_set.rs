//! Working Set Module
//!
//! Bounded in-memory mirror of recently served query results.
//!
//! The working set never answers lookups; it mirrors what the cache has
//! served so a host can inspect the hot set. Eviction is FIFO by insertion
//! order. Reads do not refresh an entry's position.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::FifoTracker;
use crate::fingerprint::Fingerprint;
use crate::model::ResultSet;

// == Working Set Entry ==
/// A materialized result held in the working set.
#[derive(Debug, Clone)]
pub struct WorkingSetEntry {
    /// The materialized result as served to the caller
    pub result: ResultSet,
    /// Serialized byte size used for budget accounting
    pub size_bytes: usize,
    /// Insertion timestamp
    pub inserted_at: DateTime<Utc>,
}

// == Working Set ==
/// In-memory mirror bounded by a byte budget.
#[derive(Debug)]
pub struct WorkingSet {
    /// Mirrored entries keyed by fingerprint
    entries: HashMap<Fingerprint, WorkingSetEntry>,
    /// Insertion-order tracker driving eviction
    fifo: FifoTracker,
    /// Byte budget for all mirrored results
    max_bytes: u64,
    /// Accounted bytes currently held
    current_bytes: u64,
}

impl WorkingSet {
    // == Constructor ==
    /// Creates a new empty working set with the given byte budget.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            fifo: FifoTracker::new(),
            max_bytes,
            current_bytes: 0,
        }
    }

    // == Admit ==
    /// Admits a served result into the working set.
    ///
    /// If the fingerprint is already mirrored this is a no-op: its value
    /// cannot have changed within one TTL window, and its position never
    /// refreshes. Before inserting, oldest-inserted entries are evicted
    /// until the candidate fits. A candidate larger than the whole budget
    /// is still admitted; the budget is knowingly exceeded for that item.
    ///
    /// Returns the number of entries evicted to make room.
    ///
    /// # Arguments
    /// * `fingerprint` - Cache key of the served result
    /// * `result` - The materialized result
    /// * `size_bytes` - Serialized size used for budget accounting
    pub fn admit(
        &mut self,
        fingerprint: &Fingerprint,
        result: ResultSet,
        size_bytes: usize,
    ) -> usize {
        if self.entries.contains_key(fingerprint) {
            return 0;
        }

        let mut evicted = 0;
        while self.current_bytes + size_bytes as u64 > self.max_bytes && !self.fifo.is_empty() {
            if let Some(oldest) = self.fifo.pop_oldest() {
                if let Some(entry) = self.entries.remove(&oldest) {
                    self.current_bytes -= entry.size_bytes as u64;
                }
                evicted += 1;
            }
        }

        if evicted > 0 {
            debug!(evicted, "working set eviction");
        }

        self.entries.insert(
            fingerprint.clone(),
            WorkingSetEntry {
                result,
                size_bytes,
                inserted_at: Utc::now(),
            },
        );
        self.fifo.record(fingerprint);
        self.current_bytes += size_bytes as u64;

        evicted
    }

    // == Remove ==
    /// Drops a mirrored entry, typically because its store row went stale.
    pub fn remove(&mut self, fingerprint: &Fingerprint) {
        if let Some(entry) = self.entries.remove(fingerprint) {
            self.current_bytes -= entry.size_bytes as u64;
            self.fifo.remove(fingerprint);
        }
    }

    // == Get ==
    /// Returns the mirrored entry for a fingerprint, if present.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&WorkingSetEntry> {
        self.entries.get(fingerprint)
    }

    // == Contains ==
    /// Checks whether a fingerprint is currently mirrored.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    // == Length ==
    /// Returns the number of mirrored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Current Bytes ==
    /// Returns the accounted byte size of all mirrored entries.
    pub fn current_bytes(&self) -> u64 {
        self.current_bytes
    }
}
