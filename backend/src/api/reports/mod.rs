//! Report endpoints: the catalog listing and report execution.

pub mod handlers;
pub mod routes;
