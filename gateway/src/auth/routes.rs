//! Public routes for signing in and out.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{login, login_page, logout};
use crate::http::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}
