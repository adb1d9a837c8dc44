//! # catalog-schema — Declarative Request Validation
//!
//! Every endpoint declares the shape of the request parts it reads
//! (path params, JSON body, query string). This crate checks raw input
//! against those shapes before any business code runs.
//!
//! ## Components
//!
//! - [`Shape`] / [`Field`] — ordered field declarations with coercion,
//!   defaults, bounds and custom refinements.
//! - [`SchemaValidator`] — validates one value, or a whole request via
//!   [`SchemaValidator::validate_request`], collecting every violation
//!   across all declared parts instead of stopping at the first.
//! - [`Schema`] — ties a typed request struct to its shape; `()` stands
//!   for an undeclared part.
//!
//! ## Crate Policy
//!
//! - Depends only on `catalog-core` internally.
//! - Validation output replaces the raw input: unknown keys are dropped,
//!   coerced values and defaults are materialized, so handlers never see
//!   unvalidated data.

pub mod contract;
pub mod shape;
pub mod validate;

pub use contract::{DecodeError, Part, RawBody, RawParts, RequestContract, Schema, ValidatedParts};
pub use shape::{Field, FieldKind, Presence, Shape};
pub use validate::{SchemaValidator, REQUIRED};
