//! Eviction Module
//!
//! Enforces the persistent store's size budget by age-based removal.

use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::ResultStore;

// == Eviction Manager ==
/// Keeps the persistent store within its size budget.
///
/// Runs after every write-through. Removal is oldest-first by insertion
/// time, irrespective of TTL freshness, in fixed-size batches. A single
/// batch may not restore the budget, so enforcement loops until the store
/// fits or holds no more entries.
#[derive(Debug, Clone)]
pub struct EvictionManager {
    /// Size budget for the persistent store in bytes
    max_bytes: u64,
    /// Number of oldest entries removed per pass
    batch_size: usize,
}

impl EvictionManager {
    // == Constructor ==
    /// Creates a new eviction manager.
    ///
    /// # Arguments
    /// * `max_bytes` - Persistent store size budget in bytes
    /// * `batch_size` - Oldest entries removed per pass
    pub fn new(max_bytes: u64, batch_size: usize) -> Self {
        Self {
            max_bytes,
            batch_size,
        }
    }

    // == Enforce ==
    /// Evicts oldest entries until the store fits its budget.
    ///
    /// Returns the number of rows removed.
    pub fn enforce(&self, store: &dyn ResultStore) -> Result<usize> {
        let mut removed = 0;

        loop {
            let size = store
                .physical_size_bytes()
                .map_err(|e| CacheError::Eviction(format!("size check: {e}")))?;
            if size <= self.max_bytes {
                break;
            }

            let victims = store
                .list_oldest(self.batch_size)
                .map_err(|e| CacheError::Eviction(format!("list victims: {e}")))?;
            if victims.is_empty() {
                // Nothing left to remove; the schema overhead alone can
                // exceed a tiny budget.
                break;
            }

            let mut pass_removed = 0;
            for fingerprint in &victims {
                pass_removed += store
                    .delete(fingerprint)
                    .map_err(|e| CacheError::Eviction(format!("delete victim: {e}")))?;
            }

            debug!(
                store_bytes = size,
                budget_bytes = self.max_bytes,
                removed = pass_removed,
                "size eviction pass"
            );

            // A pass that removes no rows cannot make progress.
            if pass_removed == 0 {
                break;
            }
            removed += pass_removed;
        }

        Ok(removed)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::cache::CacheEntry;
    use crate::fingerprint::Fingerprint;
    use crate::store::SqliteStore;

    fn file_store(dir: &tempfile::TempDir) -> SqliteStore {
        SqliteStore::open(&dir.path().join("cache.db")).unwrap()
    }

    fn put_sized(store: &SqliteStore, query: &str, size: usize, age_secs: i64) {
        store
            .put(&CacheEntry {
                fingerprint: Fingerprint::of(query),
                query_text: query.to_string(),
                serialized_result: "x".repeat(size),
                inserted_at: Utc::now() - chrono::Duration::seconds(age_secs),
            })
            .unwrap();
    }

    #[test]
    fn test_enforce_under_budget_removes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        put_sized(&store, "SELECT 1", 1024, 0);

        let manager = EvictionManager::new(10 * 1024 * 1024, 10);
        let removed = manager.enforce(&store).unwrap();

        assert_eq!(removed, 0);
        assert_eq!(store.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_enforce_removes_oldest_until_under_budget() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        // Six 200KB entries, oldest first, against a 300KB budget. Only one
        // entry fits, so five passes run before the store is back in budget.
        for i in 0..6 {
            put_sized(&store, &format!("SELECT {i}"), 200 * 1024, 60 - i as i64);
        }

        let budget = 300 * 1024;
        let manager = EvictionManager::new(budget, 1);
        let removed = manager.enforce(&store).unwrap();

        assert_eq!(removed, 5);
        assert!(store.physical_size_bytes().unwrap() <= budget);
        // The newest entry survives; the oldest ones are gone.
        assert!(store.get(&Fingerprint::of("SELECT 5")).unwrap().is_some());
        assert!(store.get(&Fingerprint::of("SELECT 0")).unwrap().is_none());
        assert!(store.get(&Fingerprint::of("SELECT 1")).unwrap().is_none());
    }

    #[test]
    fn test_enforce_removes_whole_batches_between_size_checks() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        for i in 0..6 {
            put_sized(&store, &format!("SELECT {i}"), 200 * 1024, 60 - i as i64);
        }

        // The size check runs between batches, so a batch of four removes
        // four rows even though three would have sufficed.
        let manager = EvictionManager::new(500 * 1024, 4);
        let removed = manager.enforce(&store).unwrap();

        assert_eq!(removed, 4);
        assert_eq!(store.entry_count().unwrap(), 2);
        assert!(store.get(&Fingerprint::of("SELECT 4")).unwrap().is_some());
        assert!(store.get(&Fingerprint::of("SELECT 5")).unwrap().is_some());
    }

    #[test]
    fn test_enforce_terminates_when_store_drains() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        put_sized(&store, "SELECT 1", 1024, 0);

        // Schema pages alone exceed a zero budget, so enforcement drains
        // the table and then stops.
        let manager = EvictionManager::new(0, 10);
        let removed = manager.enforce(&store).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.entry_count().unwrap(), 0);
    }
}
