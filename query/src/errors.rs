//! Custom error types specific to the `query` crate.
//!
//! This module defines errors that can occur while validating client supplied
//! names and values, compiling statements, or executing them against the
//! database, providing a unified error type for the whole data access layer.

use std::fmt;

use thiserror::Error;

/// What kind of SQL name an [`crate::Identifier`] was parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Schema,
    Table,
    Column,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentifierKind::Schema => "schema",
            IdentifierKind::Table => "table",
            IdentifierKind::Column => "column",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid {kind} name: {name}")]
    InvalidIdentifier { kind: IdentifierKind, name: String },

    #[error("Invalid value for column {column}: {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("Update requires at least one column besides id")]
    EmptyUpdate,

    #[error("Statement references :{0} but no value was bound for it")]
    MissingParameter(String),

    #[error("Statement execution failed: {0}")]
    Execution(#[from] sqlx::Error),

    #[error("Cannot decode column {column}: {reason}")]
    Decode { column: String, reason: String },
}

impl QueryError {
    /// Errors caused by the request itself. Nothing was sent to the database.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidIdentifier { .. }
                | QueryError::InvalidValue { .. }
                | QueryError::EmptyUpdate
        )
    }
}
