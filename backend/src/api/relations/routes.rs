//! Route for `/relations`.

use axum::routing::get;
use axum::Router;

use super::handlers::list_relations;
use crate::api::AppState;

pub fn relation_router() -> Router<AppState> {
    Router::new().route("/relations", get(list_relations))
}
