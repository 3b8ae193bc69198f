//! Module for core business logic services.
//!
//! This module encapsulates the services that turn validated request input
//! into database statements and orchestrate their execution.

pub mod data_service;

pub use data_service::DataService;
