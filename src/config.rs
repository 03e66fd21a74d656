//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;

/// Default entry TTL in seconds.
pub const DEFAULT_TTL_SECS: u64 = 120;

/// Default persistent store size budget in megabytes.
pub const DEFAULT_MAX_STORE_SIZE_MB: u64 = 256;

/// Default number of oldest entries removed per size-eviction pass.
pub const DEFAULT_EVICTION_BATCH_SIZE: usize = 10;

/// Default background stale-sweep interval in seconds.
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;

// == Origin Params ==
/// Connection parameters for the origin data source.
///
/// The cache itself does not dial the origin; hosts use these to construct
/// whatever `Origin` implementation fits their deployment.
#[derive(Clone, Default)]
pub struct OriginParams {
    /// Origin host name or address
    pub host: String,
    /// Database name
    pub database: String,
    /// User name
    pub user: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for OriginParams {
    // Keeps the password out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginParams")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

// == Cache Config ==
/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Path of the persistent store database file
    pub store_path: PathBuf,
    /// Persistent store size budget in megabytes
    pub max_persistent_size_mb: u64,
    /// Entry TTL in seconds
    pub ttl_seconds: u64,
    /// In-memory working set budget in megabytes; None disables the working set
    pub max_working_set_mb: Option<u64>,
    /// Number of oldest entries removed per size-eviction pass
    pub eviction_batch_size: usize,
    /// Background stale-sweep interval in seconds
    pub cleanup_interval_secs: u64,
    /// Origin connection parameters
    pub origin: OriginParams,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_PATH` - Persistent store file path (default: query_cache.db)
    /// - `MAX_STORE_SIZE_MB` - Store size budget in MB (default: 256)
    /// - `TTL_SECONDS` - Entry TTL in seconds (default: 120)
    /// - `MAX_WORKING_SET_MB` - Working set budget in MB (default: unset)
    /// - `EVICTION_BATCH_SIZE` - Entries removed per eviction pass (default: 10)
    /// - `CLEANUP_INTERVAL` - Stale-sweep frequency in seconds (default: 60)
    /// - `ORIGIN_HOST`, `ORIGIN_DATABASE`, `ORIGIN_USER`, `ORIGIN_PASSWORD`
    pub fn from_env() -> Self {
        Self {
            store_path: env::var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("query_cache.db")),
            max_persistent_size_mb: env::var("MAX_STORE_SIZE_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_STORE_SIZE_MB),
            ttl_seconds: env::var("TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
            max_working_set_mb: env::var("MAX_WORKING_SET_MB")
                .ok()
                .and_then(|v| v.parse().ok()),
            eviction_batch_size: env::var("EVICTION_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EVICTION_BATCH_SIZE),
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
            origin: OriginParams {
                host: env::var("ORIGIN_HOST").unwrap_or_default(),
                database: env::var("ORIGIN_DATABASE").unwrap_or_default(),
                user: env::var("ORIGIN_USER").unwrap_or_default(),
                password: env::var("ORIGIN_PASSWORD").unwrap_or_default(),
            },
        }
    }

    /// Persistent store size budget in bytes.
    pub fn max_persistent_size_bytes(&self) -> u64 {
        self.max_persistent_size_mb * 1024 * 1024
    }

    /// Working set budget in bytes, if the working set is enabled.
    pub fn max_working_set_bytes(&self) -> Option<u64> {
        self.max_working_set_mb.map(|mb| mb * 1024 * 1024)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("query_cache.db"),
            max_persistent_size_mb: DEFAULT_MAX_STORE_SIZE_MB,
            ttl_seconds: DEFAULT_TTL_SECS,
            max_working_set_mb: None,
            eviction_batch_size: DEFAULT_EVICTION_BATCH_SIZE,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            origin: OriginParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.store_path, PathBuf::from("query_cache.db"));
        assert_eq!(config.max_persistent_size_mb, 256);
        assert_eq!(config.ttl_seconds, 120);
        assert_eq!(config.max_working_set_mb, None);
        assert_eq!(config.eviction_batch_size, 10);
        assert_eq!(config.cleanup_interval_secs, 60);
    }

    #[test]
    fn test_budget_conversions() {
        let mut config = CacheConfig::default();
        config.max_persistent_size_mb = 1;
        config.max_working_set_mb = Some(2);
        assert_eq!(config.max_persistent_size_bytes(), 1024 * 1024);
        assert_eq!(config.max_working_set_bytes(), Some(2 * 1024 * 1024));
    }

    #[test]
    fn test_working_set_disabled_by_default() {
        assert_eq!(CacheConfig::default().max_working_set_bytes(), None);
    }

    #[test]
    fn test_origin_params_debug_redacts_password() {
        let params = OriginParams {
            host: "db.example.com".to_string(),
            database: "app".to_string(),
            user: "reader".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{params:?}");
        assert!(debug.contains("db.example.com"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
