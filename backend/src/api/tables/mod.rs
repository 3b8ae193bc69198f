//! Generic table endpoints: read all, upsert, delete by id, and the
//! foreign-key lookup used for one-to-many navigation.

pub mod handlers;
pub mod routes;
