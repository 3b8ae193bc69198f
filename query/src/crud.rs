//! Generic CRUD statements over any table of the configured schema.
//!
//! Table and column names must already be [`Identifier`]s; values always go
//! through bound parameters.

use crate::errors::QueryError;
use crate::identifier::Identifier;
use crate::models::{Row, SqlValue, ID_COLUMN};
use crate::statement::Statement;

/// Builds table-level statements qualified with one schema.
#[derive(Debug, Clone)]
pub struct CrudBuilder {
    schema: Identifier,
}

/// Which statement an upsert resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Insert,
    Update,
}

impl CrudBuilder {
    pub fn new(schema: Identifier) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Identifier {
        &self.schema
    }

    /// `SELECT *` with no row cap.
    pub fn select_all(&self, table: &Identifier) -> Statement {
        Statement::new(format!("SELECT * FROM {}.{}", self.schema, table))
    }

    /// Equality lookup on one column. `value` is bound as an integer when it
    /// parses as a 32-bit integer and as text otherwise.
    pub fn select_by_column(&self, table: &Identifier, column: &Identifier, value: &str) -> Statement {
        Statement::new(format!(
            "SELECT * FROM {}.{} WHERE {} = ?",
            self.schema, table, column
        ))
        .bind_positional(coerce_lookup_value(value))
    }

    /// INSERT when the row carries no `id` (or a null one), otherwise UPDATE by id.
    pub fn upsert(&self, table: &Identifier, row: Row) -> Result<(UpsertKind, Statement), QueryError> {
        let (id, fields) = row.split_id();

        match id {
            None => Ok((UpsertKind::Insert, self.insert(table, fields))),
            Some(id) => {
                if fields.is_empty() {
                    return Err(QueryError::EmptyUpdate);
                }
                let set_part = fields
                    .iter()
                    .map(|(column, _)| format!("{} = :{}", column, column))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE {}.{} SET {} WHERE {} = :{}",
                    self.schema, table, set_part, ID_COLUMN, ID_COLUMN
                );
                let stmt = fields
                    .into_iter()
                    .fold(Statement::new(sql), |stmt, (column, value)| {
                        stmt.bind(column.as_str(), value)
                    })
                    .bind(ID_COLUMN, id);
                Ok((UpsertKind::Update, stmt))
            }
        }
    }

    fn insert(&self, table: &Identifier, fields: Vec<(Identifier, SqlValue)>) -> Statement {
        if fields.is_empty() {
            return Statement::new(format!(
                "INSERT INTO {}.{} DEFAULT VALUES",
                self.schema, table
            ));
        }

        let cols = fields
            .iter()
            .map(|(column, _)| column.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let params = fields
            .iter()
            .map(|(column, _)| format!(":{}", column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {}.{} ({}) VALUES ({})",
            self.schema, table, cols, params
        );

        fields
            .into_iter()
            .fold(Statement::new(sql), |stmt, (column, value)| {
                stmt.bind(column.as_str(), value)
            })
    }

    pub fn delete_by_id(&self, table: &Identifier, id: i64) -> Statement {
        Statement::new(format!(
            "DELETE FROM {}.{} WHERE {} = :{}",
            self.schema, table, ID_COLUMN, ID_COLUMN
        ))
        .bind(ID_COLUMN, id)
    }
}

pub fn coerce_lookup_value(value: &str) -> SqlValue {
    match value.parse::<i32>() {
        Ok(n) => SqlValue::from(n),
        Err(_) => SqlValue::from(value),
    }
}
