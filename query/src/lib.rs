//! Core `query` crate for safe dynamic SQL over a relational database.
//!
//! This crate defines the `DataExecutor` trait, which outlines the generic
//! operations the data service needs from a database, the statement builders
//! for generic table CRUD and the fixed report catalog, and the PostgreSQL
//! implementation used in production.

pub mod crud;
pub mod errors;
pub mod identifier;
pub mod models;
pub mod postgres;
pub mod relations;
pub mod reports;
pub mod statement;

use async_trait::async_trait;

pub use crud::{CrudBuilder, UpsertKind};
pub use errors::{IdentifierKind, QueryError};
pub use identifier::Identifier;
pub use models::{QueryResult, Record, Row, SqlValue};
pub use postgres::PgExecutor;
pub use relations::RelationMeta;
pub use reports::{FilterSet, ReportInfo, ReportKind};
pub use statement::{CompiledStatement, Statement};

/// One database round trip per call. Implementations compile the statement,
/// bind its values and run it on a shared pool.
#[async_trait]
pub trait DataExecutor: Send + Sync {
    /// Runs a row-returning statement.
    async fn fetch(&self, statement: &Statement) -> Result<QueryResult, QueryError>;

    /// Runs a write statement and returns the number of affected rows.
    async fn execute(&self, statement: &Statement) -> Result<u64, QueryError>;

    async fn ping(&self) -> Result<(), QueryError>;
}
