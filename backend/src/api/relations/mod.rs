//! Foreign-key relation metadata endpoint.

pub mod handlers;
pub mod routes;
