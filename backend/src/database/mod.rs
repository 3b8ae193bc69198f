//! Module for database connection setup.
//!
//! The pool is created once at startup and handed to the services as a
//! `DataExecutor`; its lifetime is the lifetime of the process. Every
//! connection's `search_path` is the configured schema. No statement timeout
//! is configured, so queries inherit server and transport defaults.

use crate::config::{ServiceConfig, StartupError};
use dealerdb_query::PgExecutor;

pub async fn connect(config: &ServiceConfig) -> Result<PgExecutor, StartupError> {
    let executor = PgExecutor::connect(
        &config.db_url,
        config.db_max_connections,
        &config.db_schema,
    )
    .await
    .map_err(|err| StartupError {
        code: "ERR_DB_UNAVAILABLE",
        message: format!("failed to initialize database pool: {}", err),
    })?;

    tracing::info!(
        schema = %config.db_schema,
        max_connections = config.db_max_connections,
        "connected to database"
    );
    Ok(executor)
}
