//! Origin Module
//!
//! The authoritative relational data source sitting behind the cache.

mod sqlite;

// Re-export public types
pub use sqlite::SqliteOrigin;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::ResultSet;

// == Origin Trait ==
/// Executes queries against the authoritative data source.
///
/// The cache treats implementations as opaque: query text is passed through
/// verbatim, and a failure here surfaces directly to the caller rather than
/// being cached.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Executes the query and returns its full result set.
    async fn execute(&self, query_text: &str) -> Result<ResultSet>;
}
