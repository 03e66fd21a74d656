//! Read-through query result cache
//!
//! Serves previously-computed query results from a persistent, size-bounded
//! SQLite store instead of re-executing expensive queries against the
//! origin data source. Entries expire by TTL and the store is kept within
//! its size budget by oldest-first eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod origin;
pub mod store;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, QueryCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use fingerprint::Fingerprint;
pub use model::{ResultSet, Row, ScalarValue};
pub use origin::{Origin, SqliteOrigin};
pub use store::{ResultStore, SqliteStore};
pub use tasks::spawn_cleanup_task;
