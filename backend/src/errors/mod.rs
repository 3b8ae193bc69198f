//! Global application error types and handlers.
//!
//! This module maps data access failures and malformed requests onto HTTP
//! responses with a small JSON body, so every handler reports errors the
//! same way.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dealerdb_query::QueryError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "ERR_BAD_REQUEST", message)
    }

    /// Database error text only reaches the client when `expose_db_errors` is set.
    pub fn from_query(err: QueryError, expose_db_errors: bool) -> Self {
        if err.is_client_error() {
            tracing::debug!(error = %err, "request rejected");
        }
        match &err {
            QueryError::InvalidIdentifier { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "ERR_INVALID_IDENTIFIER", err.to_string())
            }
            QueryError::InvalidValue { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "ERR_INVALID_VALUE", err.to_string())
            }
            QueryError::EmptyUpdate => {
                Self::new(StatusCode::BAD_REQUEST, "ERR_EMPTY_UPDATE", err.to_string())
            }
            QueryError::Execution(_) | QueryError::Decode { .. } => {
                tracing::error!(error = %err, "statement failed");
                let message = if expose_db_errors {
                    err.to_string()
                } else {
                    "database statement failed".to_string()
                };
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "ERR_EXECUTION", message)
            }
            QueryError::MissingParameter(_) => {
                tracing::error!(error = %err, "statement template is inconsistent");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ERR_INTERNAL",
                    "internal error",
                )
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
