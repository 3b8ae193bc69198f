//! Foreign-key metadata for the configured schema.
//!
//! UIs use these relations to offer one-to-many navigation, which is then
//! served by the `by-fk` lookup of the CRUD builder.

use serde::{Deserialize, Serialize};

use crate::errors::QueryError;
use crate::identifier::Identifier;
use crate::models::Record;
use crate::statement::Statement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMeta {
    pub constraint_name: String,
    pub fk_table: String,
    pub pk_table: String,
    pub fk_column: String,
    pub pk_column: String,
}

// information_schema columns are sql_identifier domains, cast so they decode as text.
const RELATIONS_SQL: &str = "SELECT tc.constraint_name::text AS constraint_name, \
       tc.table_name::text AS fk_table, \
       ccu.table_name::text AS pk_table, \
       kcu.column_name::text AS fk_column, \
       ccu.column_name::text AS pk_column \
FROM information_schema.table_constraints tc \
JOIN information_schema.key_column_usage kcu \
  ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
JOIN information_schema.constraint_column_usage ccu \
  ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema \
WHERE tc.constraint_type = 'FOREIGN KEY' \
  AND tc.table_schema = :schema";

const ORDER_BY: &str = " ORDER BY tc.table_name, tc.constraint_name, kcu.column_name";

/// Lists foreign keys of `schema`, optionally only those touching `table` on either side.
pub fn relations_statement(schema: &Identifier, table: Option<&Identifier>) -> Statement {
    match table {
        Some(table) => Statement::new(format!(
            "{} AND (tc.table_name = :table OR ccu.table_name = :table){}",
            RELATIONS_SQL, ORDER_BY
        ))
        .bind("schema", schema.as_str())
        .bind("table", table.as_str()),
        None => Statement::new(format!("{}{}", RELATIONS_SQL, ORDER_BY))
            .bind("schema", schema.as_str()),
    }
}

pub fn from_records(records: Vec<Record>) -> Result<Vec<RelationMeta>, QueryError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(serde_json::Value::Object(record)).map_err(|err| {
                QueryError::Decode {
                    column: "relation".to_string(),
                    reason: err.to_string(),
                }
            })
        })
        .collect()
}
