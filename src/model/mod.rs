//! Data model for materialized query results
//!
//! Defines the scalar values, rows, and result sets that flow between the
//! origin, the persistent store, and callers.

pub mod result_set;
pub mod value;

pub use result_set::{ResultSet, Row};
pub use value::ScalarValue;
