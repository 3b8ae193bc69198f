//! Defines the HTTP routes for generic table access.

use axum::routing::{delete, get};
use axum::Router;

use super::handlers::{delete_row, get_by_fk, get_table, save_row};
use crate::api::AppState;

pub fn table_router() -> Router<AppState> {
    Router::new()
        .route("/tables/:table", get(get_table).post(save_row))
        .route("/tables/:table/by-fk", get(get_by_fk))
        .route("/tables/:table/:id", delete(delete_row))
}
