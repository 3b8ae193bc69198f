//! DealerDB access gateway.
//!
//! Authenticates browser and API callers, enforces the ADMIN role on
//! `/api/admin/**`, serves the static UI and reverse-proxies `/api/**` to the
//! data service.

pub mod auth;
pub mod config;
pub mod http;
pub mod proxy;
