//! Handler functions for the generic table API.
//!
//! These functions extract the table name and payload, delegate to the
//! `DataService`, and return rows as JSON or an empty success.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use dealerdb_query::{QueryResult, Row};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::api::AppState;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct ByFkParams {
    pub column: String,
    pub value: String,
}

pub async fn get_table(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Path(table) = path.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let rows = state
        .service
        .fetch_all(&table)
        .await
        .map_err(|err| state.fail(err))?;
    Ok(Json(rows))
}

pub async fn save_row(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<serde_json::Map<String, JsonValue>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(table) = path.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let Json(object) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let row = Row::from_json(object).map_err(|err| state.fail(err))?;
    state
        .service
        .save_row(&table, row)
        .await
        .map_err(|err| state.fail(err))?;
    Ok(StatusCode::OK)
}

pub async fn delete_row(
    State(state): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((table, id)) = path.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    state
        .service
        .delete_row(&table, id)
        .await
        .map_err(|err| state.fail(err))?;
    Ok(StatusCode::OK)
}

pub async fn get_by_fk(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<ByFkParams>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Path(table) = path.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let Query(params) = params.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let rows = state
        .service
        .fetch_by_fk(&table, &params.column, &params.value)
        .await
        .map_err(|err| state.fail(err))?;
    Ok(Json(rows))
}
