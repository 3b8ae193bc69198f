//! Generic data models for the `query` crate.
//!
//! These models define the loosely typed shapes that cross the data access
//! boundary: scalar values bound into statements, the client supplied [`Row`]
//! payload, and the [`Record`] maps returned for every fetched row.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::errors::QueryError;
use crate::identifier::Identifier;

/// Name of the key that switches an upsert from INSERT to UPDATE.
pub const ID_COLUMN: &str = "id";

/// One fetched row, keyed by column name in the order the database returned them.
pub type Record = serde_json::Map<String, JsonValue>;

/// Ordered rows produced by one statement.
pub type QueryResult = Vec<Record>;

/// A scalar bound into a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    fn from_json(column: &str, value: JsonValue) -> Result<Self, QueryError> {
        match value {
            JsonValue::Null => Ok(SqlValue::Null),
            JsonValue::Bool(b) => Ok(SqlValue::Bool(b)),
            JsonValue::String(s) => Ok(SqlValue::Text(s)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(SqlValue::Float(f))
                } else {
                    Err(QueryError::InvalidValue {
                        column: column.to_string(),
                        reason: format!("number {} is out of range", n),
                    })
                }
            }
            JsonValue::Array(_) | JsonValue::Object(_) => Err(QueryError::InvalidValue {
                column: column.to_string(),
                reason: "only strings, numbers, booleans and null are supported".to_string(),
            }),
        }
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// A single record sent by the client, columns kept in payload order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(Identifier, SqlValue)>,
}

impl Row {
    /// Builds a row from a decoded JSON object. Every key is validated as a
    /// column name because it ends up in the SQL text.
    pub fn from_json(object: serde_json::Map<String, JsonValue>) -> Result<Self, QueryError> {
        let mut columns = Vec::with_capacity(object.len());
        for (key, value) in object {
            let column = Identifier::column(&key)?;
            let value = SqlValue::from_json(&key, value)?;
            columns.push((column, value));
        }
        Ok(Self { columns })
    }

    pub fn push(&mut self, column: Identifier, value: SqlValue) {
        self.columns.push((column, value));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name.as_str() == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &(Identifier, SqlValue)> {
        self.columns.iter()
    }

    /// Separates the `id` entry from the rest. A null id counts as absent.
    pub fn split_id(self) -> (Option<SqlValue>, Vec<(Identifier, SqlValue)>) {
        let mut id = None;
        let mut fields = Vec::with_capacity(self.columns.len());
        for (column, value) in self.columns {
            if column.as_str() == ID_COLUMN {
                id = Some(value).filter(|v| !v.is_null());
            } else {
                fields.push((column, value));
            }
        }
        (id, fields)
    }
}
