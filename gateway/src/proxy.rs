//! Forwards authenticated `/api/**` requests to the data service.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::Principal;

pub const PRINCIPAL_HEADER: &str = "x-dealerdb-principal";

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("request body could not be read: {0}")]
    Body(String),
    #[error("unsupported method {0}")]
    Method(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("upstream response could not be relayed: {0}")]
    Relay(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ProxyError::Body(_) | ProxyError::Method(_) => {
                (StatusCode::BAD_REQUEST, "ERR_BAD_REQUEST")
            }
            ProxyError::Upstream(_) | ProxyError::Relay(_) => {
                tracing::error!(error = %self, "proxy failure");
                (StatusCode::BAD_GATEWAY, "ERR_UPSTREAM")
            }
        };
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    upstream: String,
}

impl ProxyClient {
    pub fn new(upstream: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            upstream: upstream.into(),
        })
    }

    /// Relays method, path, query, body and content type; returns the upstream
    /// status, content type and body unchanged.
    pub async fn forward(&self, principal: &Principal, req: Request) -> Result<Response, ProxyError> {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| parts.uri.path());
        let url = format!("{}{}", self.upstream, path_and_query);

        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
            .map_err(|_| ProxyError::Method(parts.method.to_string()))?;
        let bytes = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|err| ProxyError::Body(err.to_string()))?;

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(PRINCIPAL_HEADER, principal.username.as_str());
        for name in [header::CONTENT_TYPE, header::ACCEPT] {
            if let Some(value) = parts.headers.get(&name).and_then(|v| v.to_str().ok()) {
                request = request.header(name.as_str(), value);
            }
        }

        let upstream = request.body(bytes).send().await?;
        let status =
            StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = upstream
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let payload = upstream.bytes().await?;

        tracing::debug!(
            principal = %principal.username,
            method = %method,
            path = parts.uri.path(),
            status = status.as_u16(),
            "request proxied"
        );

        let mut response = Response::builder().status(status);
        if let Some(content_type) = content_type {
            response = response.header(header::CONTENT_TYPE, content_type);
        }
        response
            .body(Body::from(payload))
            .map_err(|err| ProxyError::Relay(err.to_string()))
    }
}
