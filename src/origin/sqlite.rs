//! SQLite Origin Module
//!
//! Origin adapter backed by a local SQLite database file.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::Connection;

use crate::error::{CacheError, Result};
use crate::model::{ResultSet, Row, ScalarValue};
use crate::origin::Origin;

// == SQLite Origin ==
/// [`Origin`] implementation that runs queries against a SQLite database.
///
/// Queries run synchronously on the calling task and block it for the
/// duration of the read.
pub struct SqliteOrigin {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteOrigin")
            .field("conn", &"<sqlite>")
            .finish()
    }
}

impl SqliteOrigin {
    // == Constructors ==
    /// Opens the origin database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            CacheError::OriginUnavailable(format!("open {}: {e}", path.display()))
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory origin database, useful for testing.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CacheError::OriginUnavailable(format!("open in-memory: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // == Batch Execution ==
    /// Runs statements that produce no result rows, such as schema setup or
    /// data seeding.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| CacheError::OriginQuery(format!("batch: {e}")))
    }
}

#[async_trait]
impl Origin for SqliteOrigin {
    async fn execute(&self, query_text: &str) -> Result<ResultSet> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(query_text)
            .map_err(|e| CacheError::OriginQuery(format!("prepare: {e}")))?;
        let column_count = stmt.column_count();

        let mut rows = stmt
            .query([])
            .map_err(|e| CacheError::OriginQuery(format!("query: {e}")))?;

        let mut result = ResultSet::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| CacheError::OriginQuery(format!("fetch row: {e}")))?
        {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value: Value = row
                    .get(index)
                    .map_err(|e| CacheError::OriginQuery(format!("column {index}: {e}")))?;
                values.push(scalar_from_sqlite(value));
            }
            result.push_row(Row::new(values));
        }

        Ok(result)
    }
}

fn scalar_from_sqlite(value: Value) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::Null,
        Value::Integer(i) => ScalarValue::Int(i),
        Value::Real(f) => ScalarValue::Float(f),
        Value::Text(t) => ScalarValue::Text(t),
        Value::Blob(b) => ScalarValue::Blob(b),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_origin() -> SqliteOrigin {
        let origin = SqliteOrigin::in_memory().unwrap();
        origin
            .execute_batch(
                "CREATE TABLE users (id INTEGER, name TEXT, score REAL, avatar BLOB);
                 INSERT INTO users VALUES (1, 'alice', 9.5, x'0102');
                 INSERT INTO users VALUES (2, 'bob', NULL, NULL);",
            )
            .unwrap();
        origin
    }

    #[tokio::test]
    async fn test_execute_maps_column_types() {
        let origin = seeded_origin();

        let result = origin
            .execute("SELECT id, name, score, avatar FROM users ORDER BY id")
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(
            result.rows()[0].0,
            vec![
                ScalarValue::Int(1),
                ScalarValue::Text("alice".to_string()),
                ScalarValue::Float(9.5),
                ScalarValue::Blob(vec![1, 2]),
            ]
        );
        assert_eq!(result.rows()[1].0[2], ScalarValue::Null);
    }

    #[tokio::test]
    async fn test_execute_empty_result() {
        let origin = seeded_origin();

        let result = origin
            .execute("SELECT * FROM users WHERE id = 999")
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_execute_invalid_sql_is_an_origin_error() {
        let origin = seeded_origin();

        let result = origin.execute("SELECT * FROM missing_table").await;
        assert!(matches!(result, Err(CacheError::OriginQuery(_))));
    }
}
