//! Error types for the query result cache
//!
//! Provides unified error handling using thiserror.
//!
//! Only origin failures and use-after-close abort a `get` call; store-side
//! failures degrade toward "always able to answer via the origin" and are
//! reported through tracing and the statistics counters instead.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the query result cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The persistent store could not be opened or created
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Creating the cache schema failed
    #[error("schema initialization failed: {0}")]
    SchemaInit(String),

    /// A read against the persistent store failed
    #[error("store read failed: {0}")]
    StoreRead(String),

    /// A write against the persistent store failed
    #[error("store write failed: {0}")]
    StoreWrite(String),

    /// The origin data source could not be opened
    #[error("origin unavailable: {0}")]
    OriginUnavailable(String),

    /// The origin query executor reported a failure
    #[error("origin query failed: {0}")]
    OriginQuery(String),

    /// Size-budget eviction could not complete
    #[error("eviction failed: {0}")]
    Eviction(String),

    /// A result set could not be serialized or deserialized
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The cache has been closed
    #[error("cache is closed")]
    Closed,
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query result cache.
pub type Result<T> = std::result::Result<T, CacheError>;
