//! Result Set Module
//!
//! An ordered sequence of rows, each row an ordered sequence of scalar
//! values: the materialized form of an origin query result.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ScalarValue;

// == Row ==
/// One row of a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<ScalarValue>);

impl Row {
    /// Creates a row from its values.
    pub fn new(values: Vec<ScalarValue>) -> Self {
        Self(values)
    }

    /// Returns the value at the given column index, if present.
    pub fn get(&self, index: usize) -> Option<&ScalarValue> {
        self.0.get(index)
    }

    /// Returns the number of values in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// == Result Set ==
/// A fully materialized query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Rows in origin order
    rows: Vec<Row>,
}

impl ResultSet {
    // == Constructors ==
    /// Creates an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a result set from pre-built rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    // == Accessors ==
    /// Returns the rows in origin order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the result set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // == Serialization ==
    /// Serializes the result set to the JSON text stored by the cache.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes a result set from stored JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
