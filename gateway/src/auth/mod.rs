//! Authentication for the gateway: configured users, login sessions,
//! HTTP Basic fallback and the ADMIN check on `/api/admin/**`.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;

pub use errors::AuthError;
pub use models::{Principal, Role, UserRecord};
pub use service::AuthService;
