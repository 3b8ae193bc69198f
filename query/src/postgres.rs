//! PostgreSQL implementation of the [`DataExecutor`] trait.
//!
//! This file contains the pool wrapper, the binding of [`SqlValue`]s onto
//! sqlx queries, and the conversion of result rows of arbitrary shape into
//! JSON [`Record`]s.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Executor, PgPool, Postgres, Row, TypeInfo};

use crate::errors::QueryError;
use crate::identifier::Identifier;
use crate::models::{QueryResult, Record, SqlValue};
use crate::statement::{CompiledStatement, Statement};
use crate::DataExecutor;

#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool whose connections resolve unqualified names in `schema`,
    /// the same schema the CRUD statements qualify with.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        schema: &Identifier,
    ) -> Result<Self, QueryError> {
        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DataExecutor for PgExecutor {
    async fn fetch(&self, statement: &Statement) -> Result<QueryResult, QueryError> {
        let compiled = statement.compile()?;
        tracing::debug!(sql = %compiled.sql, binds = compiled.binds.len(), "fetching rows");
        tracing::trace!(binds = ?compiled.binds, "bind values");

        let rows = build_query(&compiled).fetch_all(&self.pool).await?;
        tracing::debug!(rows = rows.len(), "rows fetched");

        rows.iter().map(row_to_record).collect()
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, QueryError> {
        let compiled = statement.compile()?;
        tracing::debug!(sql = %compiled.sql, binds = compiled.binds.len(), "executing statement");
        tracing::trace!(binds = ?compiled.binds, "bind values");

        let result = build_query(&compiled).execute(&self.pool).await?;
        tracing::debug!(rows_affected = result.rows_affected(), "statement executed");
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), QueryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn build_query(compiled: &CompiledStatement) -> Query<'_, Postgres, PgArguments> {
    compiled
        .binds
        .iter()
        .fold(sqlx::query(&compiled.sql), |query, value| match value {
            // compile() inlines nulls, so this only guards hand-built binds.
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
        })
}

fn decode<'r, T>(row: &'r PgRow, index: usize, column: &str) -> Result<Option<T>, QueryError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(index)
        .map_err(|err| QueryError::Decode {
            column: column.to_string(),
            reason: err.to_string(),
        })
}

fn row_to_record(row: &PgRow) -> Result<Record, QueryError> {
    let mut record = Record::new();

    for column in row.columns() {
        let index = column.ordinal();
        let name = column.name();

        let value = match column.type_info().name() {
            "BOOL" => decode::<bool>(row, index, name)?.map(JsonValue::from),
            "INT2" => decode::<i16>(row, index, name)?.map(JsonValue::from),
            "INT4" => decode::<i32>(row, index, name)?.map(JsonValue::from),
            "INT8" => decode::<i64>(row, index, name)?.map(JsonValue::from),
            "FLOAT4" => decode::<f32>(row, index, name)?.map(JsonValue::from),
            "FLOAT8" => decode::<f64>(row, index, name)?.map(JsonValue::from),
            // Digits and scale are kept exactly as stored.
            "NUMERIC" => decode::<rust_decimal::Decimal>(row, index, name)?.map(|d| {
                let text = d.to_string();
                text.parse::<serde_json::Number>()
                    .map(JsonValue::Number)
                    .unwrap_or_else(|_| json!(text))
            }),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                decode::<String>(row, index, name)?.map(JsonValue::from)
            }
            "UUID" => decode::<uuid::Uuid>(row, index, name)?.map(|u| json!(u.to_string())),
            "JSON" | "JSONB" => decode::<JsonValue>(row, index, name)?,
            "DATE" => decode::<chrono::NaiveDate>(row, index, name)?.map(|d| json!(d.to_string())),
            "TIME" => decode::<chrono::NaiveTime>(row, index, name)?.map(|t| json!(t.to_string())),
            "TIMESTAMP" => decode::<chrono::NaiveDateTime>(row, index, name)?
                .map(|dt| json!(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
            "TIMESTAMPTZ" => decode::<chrono::DateTime<chrono::Utc>>(row, index, name)?
                .map(|dt| json!(dt.to_rfc3339())),
            // Enums, domains and other types without a native mapping are
            // read as their text form.
            other => row
                .try_get_unchecked::<Option<String>, _>(index)
                .map_err(|err| {
                    tracing::debug!(column = name, type_name = other, error = %err, "column type has no text form");
                    QueryError::Decode {
                        column: name.to_string(),
                        reason: format!("unsupported column type {}: {}", other, err),
                    }
                })?
                .map(JsonValue::from),
        };

        record.insert(name.to_string(), value.unwrap_or(JsonValue::Null));
    }

    Ok(record)
}
