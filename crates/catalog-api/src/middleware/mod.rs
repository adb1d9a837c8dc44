//! # Middleware Modules
//!
//! Tower middleware layers for the API service.

pub mod access_log;
pub mod metrics;
pub mod translate;
