//! # catalog-core — Foundational Types for the Catalog API
//!
//! This crate is the leaf of the workspace DAG. It defines the vocabulary
//! every other crate uses to talk about failure and paging:
//!
//! 1. **Closed error taxonomy.** [`AppError`] is the only error type that
//!    reaches the wire. Its [`ErrorKind`] fixes the HTTP status and the
//!    default message-exposure policy.
//!
//! 2. **Violations belong to validation.** A [`Violation`] list can only be
//!    attached through [`AppError::validation`]; no other constructor
//!    accepts one.
//!
//! 3. **Explicit phrase table.** [`StatusPhrases`] is read-only
//!    configuration injected into the pipeline, never ambient state.
//!
//! 4. **Pure pagination.** [`paginate`] computes offsets and echo metadata
//!    without touching any datastore.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `catalog-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod pagination;
pub mod status;

// Re-export primary types for ergonomic imports.
pub use error::{AppError, ErrorKind, Violation};
pub use pagination::{
    paginate, PageWindow, PaginationMeta, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, MAX_PAGE,
};
pub use status::StatusPhrases;
