//! DealerDB data service.
//!
//! Exposes generic table access, the fixed report catalog and foreign-key
//! metadata over HTTP, backed by a PostgreSQL pool.

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;
