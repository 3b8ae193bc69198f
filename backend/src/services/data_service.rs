//! Table and report operations of the data service.
//!
//! Every operation validates the names it was given, builds exactly one
//! statement and runs it through the shared [`DataExecutor`]. Nothing is
//! retried and no state outlives the call.

use std::sync::Arc;

use dealerdb_query::reports::{self, ReportInfo};
use dealerdb_query::{
    relations, CrudBuilder, DataExecutor, FilterSet, Identifier, QueryError, QueryResult,
    RelationMeta, ReportKind, Row, UpsertKind,
};

#[derive(Clone)]
pub struct DataService {
    executor: Arc<dyn DataExecutor>,
    crud: CrudBuilder,
}

impl DataService {
    pub fn new(executor: Arc<dyn DataExecutor>, schema: Identifier) -> Self {
        Self {
            executor,
            crud: CrudBuilder::new(schema),
        }
    }

    pub async fn fetch_all(&self, table: &str) -> Result<QueryResult, QueryError> {
        let table = Identifier::table(table)?;
        let rows = self.executor.fetch(&self.crud.select_all(&table)).await?;
        tracing::debug!(table = %table, rows = rows.len(), "fetched table");
        Ok(rows)
    }

    pub async fn fetch_by_fk(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<QueryResult, QueryError> {
        let table = Identifier::table(table)?;
        let column = Identifier::column(column)?;
        let stmt = self.crud.select_by_column(&table, &column, value);
        let rows = self.executor.fetch(&stmt).await?;
        tracing::debug!(table = %table, column = %column, rows = rows.len(), "fetched by foreign key");
        Ok(rows)
    }

    pub async fn save_row(&self, table: &str, row: Row) -> Result<UpsertKind, QueryError> {
        let table = Identifier::table(table)?;
        let (kind, stmt) = self.crud.upsert(&table, row)?;
        let rows_affected = self.executor.execute(&stmt).await?;
        tracing::info!(table = %table, kind = ?kind, rows_affected, "row saved");
        Ok(kind)
    }

    pub async fn delete_row(&self, table: &str, id: i64) -> Result<u64, QueryError> {
        let table = Identifier::table(table)?;
        let rows_affected = self.executor.execute(&self.crud.delete_by_id(&table, id)).await?;
        tracing::info!(table = %table, id, rows_affected, "row deleted");
        Ok(rows_affected)
    }

    pub async fn report(&self, name: &str, filters: &FilterSet) -> Result<QueryResult, QueryError> {
        let kind = ReportKind::parse(name);
        if let ReportKind::Unknown(name) = &kind {
            tracing::warn!(report = %name, "unknown report requested, running diagnostic query");
        }
        let stmt = kind.statement(filters)?;
        let rows = self.executor.fetch(&stmt).await?;
        tracing::debug!(report = %kind, rows = rows.len(), "report executed");
        Ok(rows)
    }

    pub fn reports(&self) -> Vec<ReportInfo> {
        reports::catalog()
    }

    pub async fn relations(&self, table: Option<&str>) -> Result<Vec<RelationMeta>, QueryError> {
        let table = table.map(Identifier::table).transpose()?;
        let stmt = relations::relations_statement(self.crud.schema(), table.as_ref());
        relations::from_records(self.executor.fetch(&stmt).await?)
    }

    pub async fn ready(&self) -> bool {
        match self.executor.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "database ping failed");
                false
            }
        }
    }
}
