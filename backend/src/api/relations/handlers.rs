//! Handler for foreign-key metadata.
//!
//! `?table=` narrows the listing to relations touching one table; a blank
//! value lists the whole schema.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use dealerdb_query::RelationMeta;
use serde::Deserialize;

use crate::api::AppState;
use crate::errors::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct RelationParams {
    pub table: Option<String>,
}

pub async fn list_relations(
    State(state): State<AppState>,
    params: Result<Query<RelationParams>, QueryRejection>,
) -> Result<Json<Vec<RelationMeta>>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let table = params.table.as_deref().filter(|t| !t.trim().is_empty());
    let relations = state
        .service
        .relations(table)
        .await
        .map_err(|err| state.fail(err))?;
    Ok(Json(relations))
}
