//! Cache Coordinator Module
//!
//! The read-through decision core. A `get` runs fingerprint computation,
//! store lookup, TTL validation, and on miss or expiry an origin call
//! followed by write-through and size eviction.
//!
//! Store-side failures never fail a `get`: read failures degrade to misses
//! and write failures are absorbed after a successful origin fetch. Only an
//! origin failure or use after `close` aborts the call.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, EvictionManager, WorkingSet};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fingerprint::Fingerprint;
use crate::model::ResultSet;
use crate::origin::Origin;
use crate::store::{ResultStore, SqliteStore};

// == Lookup Outcome ==
/// Classification of one store lookup.
enum Lookup {
    /// A fresh entry was found; carries the materialized result and its
    /// serialized size
    Fresh(ResultSet, usize),
    /// A stored entry had outlived its TTL and has been deleted
    Stale,
    /// No usable entry
    Miss,
}

// == Query Cache ==
/// Read-through query result cache.
///
/// Owns the persistent store and the origin handle for its lifetime; both
/// are released by [`QueryCache::close`]. Safe to share across tasks behind
/// an `Arc`.
pub struct QueryCache {
    /// Persistent store; `None` once closed
    store: Mutex<Option<Box<dyn ResultStore>>>,
    /// Origin executor; `None` once closed
    origin: Mutex<Option<Arc<dyn Origin>>>,
    /// Optional in-memory mirror of served results
    working_set: Option<Mutex<WorkingSet>>,
    /// Per-fingerprint in-flight markers coalescing concurrent misses
    flights: Mutex<HashMap<Fingerprint, Weak<tokio::sync::Mutex<()>>>>,
    /// Persistent-size eviction policy
    eviction: EvictionManager,
    /// Entry freshness window
    ttl: Duration,
    /// Performance counters
    stats: Mutex<CacheStats>,
}

impl QueryCache {
    // == Constructors ==
    /// Creates a cache over an already-constructed store and origin.
    ///
    /// # Arguments
    /// * `store` - Persistent store backend
    /// * `origin` - Origin query executor
    /// * `config` - Budgets, TTL, and working set settings
    pub fn new(store: Box<dyn ResultStore>, origin: Arc<dyn Origin>, config: &CacheConfig) -> Self {
        Self {
            store: Mutex::new(Some(store)),
            origin: Mutex::new(Some(origin)),
            working_set: config
                .max_working_set_bytes()
                .map(|bytes| Mutex::new(WorkingSet::new(bytes))),
            flights: Mutex::new(HashMap::new()),
            eviction: EvictionManager::new(
                config.max_persistent_size_bytes(),
                config.eviction_batch_size,
            ),
            ttl: Duration::from_secs(config.ttl_seconds),
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Opens the SQLite-backed store at `config.store_path` and builds the
    /// cache over it.
    pub fn open(config: &CacheConfig, origin: Arc<dyn Origin>) -> Result<Self> {
        let store = SqliteStore::open(&config.store_path)?;
        info!(
            store = %config.store_path.display(),
            budget_mb = config.max_persistent_size_mb,
            ttl_seconds = config.ttl_seconds,
            "query cache opened"
        );
        Ok(Self::new(Box::new(store), origin, config))
    }

    // == Get ==
    /// Serves a query result, reaching the origin only when the store has
    /// no fresh entry.
    ///
    /// Concurrent misses on the same fingerprint coalesce into a single
    /// origin call; the waiters are then served from the store.
    ///
    /// # Arguments
    /// * `query_text` - Query to serve, matched byte-for-byte against
    ///   cached entries
    pub async fn get(&self, query_text: &str) -> Result<ResultSet> {
        let fingerprint = Fingerprint::of(query_text);

        // Fast path: a fresh entry needs no flight lock.
        match self.lookup_store(&fingerprint)? {
            Lookup::Fresh(result, size) => {
                self.stats.lock().record_hit();
                self.admit_working_set(&fingerprint, &result, size);
                return Ok(result);
            }
            Lookup::Stale => self.stats.lock().record_stale_miss(),
            Lookup::Miss => self.stats.lock().record_miss(),
        }

        let flight = self.flight_lock(&fingerprint);
        let _guard = flight.lock().await;

        // Another caller may have refreshed the entry while we waited.
        if let Lookup::Fresh(result, size) = self.lookup_store(&fingerprint)? {
            debug!(fingerprint = %fingerprint, "coalesced into earlier refresh");
            self.admit_working_set(&fingerprint, &result, size);
            return Ok(result);
        }

        self.refresh(&fingerprint, query_text).await
    }

    // == Lookup ==
    /// Checks the store for a usable entry and classifies the outcome.
    ///
    /// Read failures are degraded to misses. Stale or undecodable rows are
    /// deleted here so the refresh path always inserts into a clean slot.
    fn lookup_store(&self, fingerprint: &Fingerprint) -> Result<Lookup> {
        let store_guard = self.store.lock();
        let store = store_guard.as_deref().ok_or(CacheError::Closed)?;

        let entry = match store.get(fingerprint) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "store read failed; treating as miss");
                self.stats.lock().record_degraded_read();
                return Ok(Lookup::Miss);
            }
        };

        let Some(entry) = entry else {
            return Ok(Lookup::Miss);
        };

        if entry.is_stale(self.ttl) {
            debug!(
                fingerprint = %fingerprint,
                age_ms = entry.age().num_milliseconds(),
                "stale entry dropped"
            );
            self.delete_degraded(store, fingerprint);
            self.remove_from_working_set(fingerprint);
            return Ok(Lookup::Stale);
        }

        match ResultSet::from_json(&entry.serialized_result) {
            Ok(result) => {
                debug!(fingerprint = %fingerprint, "fresh hit");
                Ok(Lookup::Fresh(result, entry.serialized_result.len()))
            }
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "undecodable entry dropped");
                self.delete_degraded(store, fingerprint);
                self.remove_from_working_set(fingerprint);
                Ok(Lookup::Miss)
            }
        }
    }

    /// Deletes a store row, absorbing the failure if the delete cannot run.
    fn delete_degraded(&self, store: &dyn ResultStore, fingerprint: &Fingerprint) {
        if let Err(e) = store.delete(fingerprint) {
            warn!(fingerprint = %fingerprint, error = %e, "store delete failed");
            self.stats.lock().record_degraded_write();
        }
    }

    // == Refresh ==
    /// Executes the query against the origin and writes the result through.
    ///
    /// Origin failures abort the call with nothing cached. Write-through
    /// failures are absorbed; the origin result is returned regardless.
    async fn refresh(&self, fingerprint: &Fingerprint, query_text: &str) -> Result<ResultSet> {
        let origin = self
            .origin
            .lock()
            .as_ref()
            .cloned()
            .ok_or(CacheError::Closed)?;

        self.stats.lock().record_origin_call();
        let result = match origin.execute(query_text).await {
            Ok(result) => result,
            Err(e) => {
                self.stats.lock().record_origin_failure();
                warn!(fingerprint = %fingerprint, error = %e, "origin query failed");
                return Err(e);
            }
        };

        let serialized = match result.to_json() {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "result not cacheable");
                self.stats.lock().record_degraded_write();
                return Ok(result);
            }
        };

        let size = serialized.len();
        let entry = CacheEntry::new(fingerprint.clone(), query_text, serialized);
        self.write_through(&entry);

        // The refreshed entry is a new insertion, so its mirror slot is too.
        self.remove_from_working_set(fingerprint);
        self.admit_working_set(fingerprint, &result, size);

        Ok(result)
    }

    // == Write Through ==
    /// Persists a fresh entry and enforces the size budget.
    fn write_through(&self, entry: &CacheEntry) {
        let store_guard = self.store.lock();
        let Some(store) = store_guard.as_deref() else {
            // Closed while the origin call was in flight; the caller still
            // gets its result.
            return;
        };

        if let Err(e) = store.put(entry) {
            warn!(fingerprint = %entry.fingerprint, error = %e, "write-through failed");
            self.stats.lock().record_degraded_write();
            return;
        }

        match self.eviction.enforce(store) {
            Ok(0) => {}
            Ok(removed) => self.stats.lock().record_size_evictions(removed as u64),
            Err(e) => {
                warn!(error = %e, "size eviction failed");
                self.stats.lock().record_degraded_write();
            }
        }
    }

    // == Working Set ==
    fn admit_working_set(&self, fingerprint: &Fingerprint, result: &ResultSet, size: usize) {
        let Some(working_set) = &self.working_set else {
            return;
        };
        let evicted = working_set.lock().admit(fingerprint, result.clone(), size);
        if evicted > 0 {
            self.stats.lock().record_working_set_evictions(evicted as u64);
        }
    }

    fn remove_from_working_set(&self, fingerprint: &Fingerprint) {
        if let Some(working_set) = &self.working_set {
            working_set.lock().remove(fingerprint);
        }
    }

    // == Flight Lock ==
    /// Returns the shared in-flight marker for a fingerprint, creating one
    /// if no refresh is pending.
    fn flight_lock(&self, fingerprint: &Fingerprint) -> Arc<tokio::sync::Mutex<()>> {
        let mut flights = self.flights.lock();
        // Drop markers whose last holder is gone.
        flights.retain(|_, weak| weak.strong_count() > 0);

        if let Some(existing) = flights.get(fingerprint).and_then(Weak::upgrade) {
            return existing;
        }

        let flight = Arc::new(tokio::sync::Mutex::new(()));
        flights.insert(fingerprint.clone(), Arc::downgrade(&flight));
        flight
    }

    // == Purge Stale ==
    /// Removes every stored entry that has outlived the TTL.
    ///
    /// Returns the number of rows removed.
    pub fn purge_stale(&self) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::milliseconds(self.ttl.as_millis() as i64);

        let store_guard = self.store.lock();
        let store = store_guard.as_deref().ok_or(CacheError::Closed)?;

        let removed = store.purge_stale(cutoff)?;
        if removed > 0 {
            debug!(removed, "purged stale entries");
        }
        Ok(removed)
    }

    // == Observability ==
    /// Returns a snapshot of the performance counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        if let Some(store) = self.store.lock().as_deref() {
            if let Ok(count) = store.entry_count() {
                stats.set_store_entries(count);
            }
        }
        if let Some(working_set) = &self.working_set {
            let working_set = working_set.lock();
            stats.set_working_set(working_set.len(), working_set.current_bytes());
        }
        stats
    }

    /// Returns the physical size of the persistent store in bytes.
    pub fn store_size_bytes(&self) -> Result<u64> {
        let store_guard = self.store.lock();
        let store = store_guard.as_deref().ok_or(CacheError::Closed)?;
        store.physical_size_bytes()
    }

    /// Returns the number of rows in the persistent store.
    pub fn store_entry_count(&self) -> Result<u64> {
        let store_guard = self.store.lock();
        let store = store_guard.as_deref().ok_or(CacheError::Closed)?;
        store.entry_count()
    }

    // == Close ==
    /// Releases the store and origin connections.
    ///
    /// Idempotent. Calls in flight finish against the handles they already
    /// hold; subsequent `get` calls fail with [`CacheError::Closed`].
    pub fn close(&self) {
        let store = self.store.lock().take();
        let origin = self.origin.lock().take();
        if store.is_some() || origin.is_some() {
            info!("query cache closed");
        }
    }

    /// Whether [`QueryCache::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.store.lock().is_none()
    }
}
