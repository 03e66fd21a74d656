//! Scalar Value Module
//!
//! A single cell of a query result row.
//!
//! Values serialize untagged, so a stored result reads as plain JSON:
//! `null`, `true`, `42`, `1.5`, `"text"`, or a byte array for blobs.
//! Variant order matters for deserialization: integers are tried before
//! floats so `42` round-trips as `Int`.

use serde::{Deserialize, Serialize};

// == Scalar Value ==
/// A single scalar value within a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// Text value
    Text(String),
    /// Raw byte value
    Blob(Vec<u8>),
}

impl ScalarValue {
    /// Returns true if this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}
