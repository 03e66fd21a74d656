//! Stale Sweep Task
//!
//! Background task that periodically removes cache entries that have
//! outlived their TTL.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::error::CacheError;

/// Spawns a background task that periodically purges stale cache entries.
///
/// The task sleeps for the specified interval between sweeps and stops on
/// its own once the cache has been closed. Stale entries would also be
/// dropped lazily on their next read; the sweep reclaims store space for
/// entries nobody asks for again.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(QueryCache::open(&config, origin)?);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cache.close();
/// ```
pub fn spawn_cleanup_task(cache: Arc<QueryCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting stale-sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            match cache.purge_stale() {
                Ok(removed) if removed > 0 => {
                    info!("Stale sweep: removed {} expired entries", removed);
                }
                Ok(_) => debug!("Stale sweep: no expired entries found"),
                Err(CacheError::Closed) => {
                    debug!("Stale sweep: cache closed, stopping");
                    break;
                }
                Err(e) => warn!("Stale sweep failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::config::CacheConfig;
    use crate::error::Result;
    use crate::model::{ResultSet, Row, ScalarValue};
    use crate::origin::Origin;
    use crate::store::SqliteStore;

    struct StaticOrigin;

    #[async_trait]
    impl Origin for StaticOrigin {
        async fn execute(&self, _query_text: &str) -> Result<ResultSet> {
            Ok(ResultSet::from_rows(vec![Row::new(vec![ScalarValue::Int(
                1,
            )])]))
        }
    }

    fn test_cache(ttl_seconds: u64) -> Arc<QueryCache> {
        let config = CacheConfig {
            ttl_seconds,
            ..CacheConfig::default()
        };
        let store = SqliteStore::in_memory().unwrap();
        Arc::new(QueryCache::new(Box::new(store), Arc::new(StaticOrigin), &config))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = test_cache(1);
        cache.get("SELECT 1").await.unwrap();
        cache.get("SELECT 2").await.unwrap();

        // Sweep every second; entries expire after one second
        let handle = spawn_cleanup_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(cache.store_entry_count().unwrap(), 0);
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_fresh_entries() {
        let cache = test_cache(3600);
        cache.get("SELECT 1").await.unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.store_entry_count().unwrap(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_after_close() {
        let cache = test_cache(60);

        let handle = spawn_cleanup_task(cache.clone(), 1);
        cache.close();

        // The next sweep observes the closed cache and exits
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(handle.is_finished(), "Task should stop once the cache closes");
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = test_cache(60);

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
