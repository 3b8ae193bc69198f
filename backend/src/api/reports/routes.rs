//! Defines the HTTP routes for reports.

use axum::routing::get;
use axum::Router;

use super::handlers::{list_reports, run_report};
use crate::api::AppState;

pub fn report_router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/:report", get(run_report))
}
