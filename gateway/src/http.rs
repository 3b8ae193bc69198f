//! Gateway router: public login and health routes, everything else behind
//! authentication.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::routing::{any, get};
use axum::{Extension, Router};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::auth::routes::auth_router;
use crate::auth::{AuthService, Principal};
use crate::config::{GatewayConfig, StartupError};
use crate::proxy::{ProxyClient, ProxyError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub auth: AuthService,
    pub proxy: ProxyClient,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let proxy = ProxyClient::new(config.upstream_url.clone()).map_err(|err| StartupError {
            code: "ERR_HTTP_CLIENT",
            message: format!("failed to build upstream client: {}", err),
        })?;
        let auth = AuthService::new(
            config.users.clone(),
            Duration::from_secs(config.session_ttl_secs),
        );
        Ok(Self {
            config: Arc::new(config),
            auth,
            proxy,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let mut protected = Router::new().route("/api/*path", any(proxy));

    protected = match &state.config.static_dir {
        Some(dir) => protected
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .fallback_service(ServeDir::new(dir)),
        None => protected.route("/", get(banner)),
    };

    let protected = protected.layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(auth_router())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn banner(Extension(principal): Extension<Principal>) -> String {
    format!("DealerDB gateway. Signed in as {}.", principal.username)
}

async fn proxy(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    req: Request,
) -> Result<Response, ProxyError> {
    state.proxy.forward(&principal, req).await
}
