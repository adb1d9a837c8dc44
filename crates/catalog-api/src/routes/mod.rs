//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area.
//! Routers are assembled in `lib.rs` into the application.

pub mod health;
pub mod metrics;
pub mod products;

use catalog_core::AppError;

use crate::invoke::Failure;

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> Failure {
    AppError::not_found("Resource not found").into()
}
