//! Request authentication and role-based path checks.
//!
//! A live session cookie wins; otherwise HTTP Basic credentials are tried.
//! The resolved [`Principal`] is stored in the request extensions for the
//! proxy to forward.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::errors::AuthError;
use super::models::Principal;
use crate::http::AppState;

pub const SESSION_COOKIE: &str = "DEALERDB_SESSION";

const ADMIN_PREFIX: &str = "/api/admin";

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = authenticate(&state, req.headers()).await?;

    let path = req.uri().path();
    if requires_admin(path) && !principal.is_admin() {
        tracing::warn!(principal = %principal.username, path, "admin path denied");
        return Err(AuthError::Forbidden(path.to_string()));
    }

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, AuthError> {
    if let Some(token) = session_token(headers) {
        if let Some(principal) = state.auth.sessions().lookup(token).await {
            return Ok(principal);
        }
        tracing::debug!("session cookie unknown or expired");
    }

    match basic_credentials(headers)? {
        Some((username, password)) => state.auth.basic(&username, &password),
        None => Err(AuthError::MissingCredentials),
    }
}

pub fn requires_admin(path: &str) -> bool {
    path == ADMIN_PREFIX
        || path
            .strip_prefix(ADMIN_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let encoded = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Basic "))
        .ok_or(AuthError::InvalidCredentials)?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(AuthError::InvalidCredentials)?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or(AuthError::InvalidCredentials)?;

    Ok(Some((username.to_string(), password.to_string())))
}
