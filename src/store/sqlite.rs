//! SQLite Store Module
//!
//! File-backed result storage using rusqlite with WAL journaling.
//!
//! The database is opened with `auto_vacuum=FULL` so that deleted rows
//! actually shrink the reported size, which the size-budget eviction loop
//! depends on. Physical size is measured through the page count rather than
//! file metadata so the WAL file never distorts the reading.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};
use crate::fingerprint::Fingerprint;
use crate::store::ResultStore;

// == SQLite Store ==
/// SQLite-backed implementation of [`ResultStore`].
///
/// All operations go through a single connection guarded by a mutex, so
/// store access is serialized.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("conn", &"<sqlite>")
            .finish()
    }
}

impl SqliteStore {
    // == Constructors ==
    /// Opens (or creates) the store database at the given path.
    ///
    /// # Arguments
    /// * `path` - Filesystem location of the database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let conn = Connection::open(path)
            .map_err(|e| CacheError::StoreUnavailable(format!("open {}: {e}", path.display())))?;

        Self::from_connection(conn)
    }

    /// Creates an in-memory store, useful for testing.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CacheError::StoreUnavailable(format!("open in-memory: {e}")))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // auto_vacuum must be set before the first table exists; on an
        // already-initialized database this is a no-op.
        conn.pragma_update(None, "auto_vacuum", "FULL")
            .map_err(|e| CacheError::StoreUnavailable(format!("auto_vacuum: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| CacheError::StoreUnavailable(format!("journal_mode: {e}")))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| CacheError::StoreUnavailable(format!("synchronous: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Counts the rows stored under one fingerprint.
    ///
    /// Under normal operation this is 0 or 1; degraded writes can leave
    /// duplicates behind until the next delete.
    pub fn rows_for(&self, fingerprint: &Fingerprint) -> Result<u64> {
        self.conn
            .lock()
            .query_row(
                "SELECT COUNT(*) FROM query_cache WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count as u64)
            .map_err(|e| CacheError::StoreRead(format!("rows_for: {e}")))
    }

    // == Schema ==
    /// Creates the result table and its indexes if they do not exist yet.
    ///
    /// `inserted_at` is stored as Unix milliseconds. There is deliberately
    /// no uniqueness constraint on `fingerprint`.
    fn init_schema(&self) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS query_cache (
                    fingerprint       TEXT NOT NULL,
                    original_query    TEXT NOT NULL,
                    serialized_result TEXT NOT NULL,
                    inserted_at       INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_query_cache_fingerprint
                    ON query_cache(fingerprint);
                CREATE INDEX IF NOT EXISTS idx_query_cache_inserted_at
                    ON query_cache(inserted_at);",
            )
            .map_err(|e| CacheError::SchemaInit(format!("init schema: {e}")))?;

        Ok(())
    }
}

impl ResultStore for SqliteStore {
    // == Get ==
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            "SELECT original_query, serialized_result, inserted_at
             FROM query_cache
             WHERE fingerprint = ?1
             ORDER BY inserted_at DESC, rowid DESC
             LIMIT 1",
            params![fingerprint.as_str()],
            |row| {
                let query_text: String = row.get(0)?;
                let serialized_result: String = row.get(1)?;
                let inserted_ms: i64 = row.get(2)?;
                Ok((query_text, serialized_result, inserted_ms))
            },
        );

        match result {
            Ok((query_text, serialized_result, inserted_ms)) => {
                let inserted_at = DateTime::from_timestamp_millis(inserted_ms).ok_or_else(
                    || CacheError::StoreRead(format!("invalid timestamp {inserted_ms}")),
                )?;

                Ok(Some(CacheEntry {
                    fingerprint: fingerprint.clone(),
                    query_text,
                    serialized_result,
                    inserted_at,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CacheError::StoreRead(format!("get: {e}"))),
        }
    }

    // == Put ==
    fn put(&self, entry: &CacheEntry) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT INTO query_cache
                 (fingerprint, original_query, serialized_result, inserted_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.fingerprint.as_str(),
                    entry.query_text,
                    entry.serialized_result,
                    entry.inserted_at.timestamp_millis(),
                ],
            )
            .map_err(|e| CacheError::StoreWrite(format!("put: {e}")))?;

        debug!(
            fingerprint = entry.fingerprint.as_str(),
            size = entry.serialized_result.len(),
            "stored result"
        );
        Ok(())
    }

    // == Delete ==
    fn delete(&self, fingerprint: &Fingerprint) -> Result<usize> {
        self.conn
            .lock()
            .execute(
                "DELETE FROM query_cache WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
            )
            .map_err(|e| CacheError::StoreWrite(format!("delete: {e}")))
    }

    // == List Oldest ==
    fn list_oldest(&self, limit: usize) -> Result<Vec<Fingerprint>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(
                "SELECT fingerprint FROM query_cache
                 ORDER BY inserted_at ASC, rowid ASC
                 LIMIT ?1",
            )
            .map_err(|e| CacheError::StoreRead(format!("list_oldest: {e}")))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| row.get::<_, String>(0))
            .map_err(|e| CacheError::StoreRead(format!("list_oldest: {e}")))?;

        let mut fingerprints = Vec::new();
        for row in rows {
            let hex = row.map_err(|e| CacheError::StoreRead(format!("list_oldest: {e}")))?;
            fingerprints.push(Fingerprint::from_hex(hex));
        }

        Ok(fingerprints)
    }

    // == Physical Size ==
    fn physical_size_bytes(&self) -> Result<u64> {
        self.conn
            .lock()
            .query_row(
                "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|bytes| bytes as u64)
            .map_err(|e| CacheError::StoreRead(format!("physical_size: {e}")))
    }

    // == Entry Count ==
    fn entry_count(&self) -> Result<u64> {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM query_cache", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count as u64)
            .map_err(|e| CacheError::StoreRead(format!("entry_count: {e}")))
    }

    // == Purge Stale ==
    fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.conn
            .lock()
            .execute(
                "DELETE FROM query_cache WHERE inserted_at <= ?1",
                params![cutoff.timestamp_millis()],
            )
            .map_err(|e| CacheError::StoreWrite(format!("purge_stale: {e}")))
    }
}
