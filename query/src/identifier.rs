//! Safelisting of table, column and schema names.
//!
//! Names cannot be bound as statement parameters, so every name that reaches
//! SQL text goes through [`Identifier::parse`] first. Only ASCII letters,
//! digits and underscore are accepted; nothing is escaped.

use std::fmt;

use crate::errors::{IdentifierKind, QueryError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(kind: IdentifierKind, name: &str) -> Result<Self, QueryError> {
        if is_valid(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(QueryError::InvalidIdentifier {
                kind,
                name: name.to_string(),
            })
        }
    }

    pub fn table(name: &str) -> Result<Self, QueryError> {
        Self::parse(IdentifierKind::Table, name)
    }

    pub fn column(name: &str) -> Result<Self, QueryError> {
        Self::parse(IdentifierKind::Column, name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `^[A-Za-z0-9_]+$`
pub fn is_valid(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
