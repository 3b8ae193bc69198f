//! HTTP surface of the data service.
//!
//! Table, report and relation routers are nested under `/api`; the health checks
//! live at the root so load balancers can reach them without CORS.

pub mod health;
pub mod relations;
pub mod reports;
pub mod tables;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use dealerdb_query::{DataExecutor, QueryError};
use tower_http::cors::CorsLayer;

use crate::config::{ServiceConfig, StartupError};
use crate::errors::ApiError;
use crate::services::DataService;
use crate::{database, middleware};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DataService>,
    pub expose_db_errors: bool,
}

impl AppState {
    pub fn new(executor: Arc<dyn DataExecutor>, config: &ServiceConfig) -> Self {
        Self {
            service: Arc::new(DataService::new(executor, config.db_schema.clone())),
            expose_db_errors: config.expose_db_errors,
        }
    }

    pub(crate) fn fail(&self, err: QueryError) -> ApiError {
        ApiError::from_query(err, self.expose_db_errors)
    }
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .merge(tables::routes::table_router())
        .merge(reports::routes::report_router())
        .merge(relations::routes::relation_router())
        .layer(cors);

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .nest("/api", api)
        .layer(middleware::trace_layer())
        .with_state(state)
}

/// Connects to the database and assembles the full application router.
pub async fn router(config: &ServiceConfig) -> Result<Router, StartupError> {
    let executor = database::connect(config).await?;
    let cors = middleware::cors_layer(&config.cors_allowed_origins)?;
    let state = AppState::new(Arc::new(executor), config);
    Ok(build_router(state, cors))
}
