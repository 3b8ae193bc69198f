//! Handler functions for report endpoints.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use dealerdb_query::reports::ReportInfo;
use dealerdb_query::{FilterSet, QueryResult};

use crate::api::AppState;
use crate::errors::ApiError;

pub async fn list_reports(State(state): State<AppState>) -> Json<Vec<ReportInfo>> {
    Json(state.service.reports())
}

/// Runs a named report. Unknown names yield the diagnostic row rather than 404.
pub async fn run_report(
    State(state): State<AppState>,
    Path(report): Path<String>,
    filters: Result<Query<FilterSet>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Query(filters) =
        filters.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let rows = state
        .service
        .report(&report, &filters)
        .await
        .map_err(|err| state.fail(err))?;
    Ok(Json(rows))
}
