//! Authentication and authorization failures and their HTTP form.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const BASIC_CHALLENGE: &str = "Basic realm=\"dealerdb\"";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
    /// A failed form or JSON login; no Basic challenge so browsers stay on the form.
    #[error("invalid username or password")]
    LoginFailed,
    #[error("access to {0} requires the ADMIN role")]
    Forbidden(String),
    #[error("malformed login request: {0}")]
    BadLogin(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidCredentials | AuthError::LoginFailed => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::BadLogin(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "ERR_AUTH_REQUIRED",
            AuthError::InvalidCredentials | AuthError::LoginFailed => "ERR_AUTH_INVALID",
            AuthError::Forbidden(_) => "ERR_FORBIDDEN",
            AuthError::BadLogin(_) => "ERR_BAD_REQUEST",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let challenge = matches!(
            self,
            AuthError::MissingCredentials | AuthError::InvalidCredentials
        );
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        let mut response = (self.status(), Json(body)).into_response();
        if challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BASIC_CHALLENGE),
            );
        }
        response
    }
}
