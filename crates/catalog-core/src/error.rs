//! # Error Taxonomy
//!
//! Defines [`AppError`], the closed set of failures the API can report,
//! and [`Violation`], one field-level validation failure.
//!
//! ## Exposure Policy
//!
//! Every [`ErrorKind`] carries a default exposure. Public errors reach the
//! client verbatim; private errors are replaced by the canonical phrase of
//! their status code (see [`StatusPhrases`](crate::StatusPhrases)) and their
//! real message is only logged.
//!
//! | Kind                 | Status | Default  |
//! |----------------------|--------|----------|
//! | `ValidationFailed`   | 400    | public   |
//! | `NotFound`           | 404    | public   |
//! | `UnprocessableState` | 422    | public   |
//! | `Internal`           | 500    | private  |
//!
//! ## Violations
//!
//! Only [`AppError::validation`] attaches violations. The other
//! constructors take a message alone, so a `NotFound` carrying field
//! details cannot be built.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::StatusPhrases;

/// Message used for every validation failure.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// A single field-level validation failure.
///
/// `field` is a dotted path into the validated part (`price`,
/// `dimensions.width`, `tags.0`). It is absent when the failure concerns
/// the part as a whole, e.g. a body that is not a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path to the offending field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable reason.
    pub reason: String,
}

impl Violation {
    /// Violation attached to a field path.
    pub fn at(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// Violation concerning a whole request part.
    pub fn root(reason: impl Into<String>) -> Self {
        Self {
            field: None,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.reason),
            None => write!(f, "(root): {}", self.reason),
        }
    }
}

/// The closed set of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request input did not match the declared shape (400).
    ValidationFailed,
    /// The addressed resource does not exist (404).
    NotFound,
    /// A lookup that must be unique matched more than one record (422).
    UnprocessableState,
    /// Anything else (500).
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub const fn status_code(self) -> u16 {
        match self {
            Self::ValidationFailed => 400,
            Self::NotFound => 404,
            Self::UnprocessableState => 422,
            Self::Internal => 500,
        }
    }

    /// Whether messages of this kind reach the client unless overridden.
    pub const fn public_by_default(self) -> bool {
        !matches!(self, Self::Internal)
    }

    /// Machine-readable code used in log records.
    pub const fn code(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::UnprocessableState => "UNPROCESSABLE_STATE",
            Self::Internal => "INTERNAL",
        }
    }
}

/// Application-level error with status, exposure flag and violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    is_public: bool,
    violations: Vec<Violation>,
}

impl AppError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            is_public: kind.public_by_default(),
            violations: Vec::new(),
        }
    }

    /// Validation failure carrying every violation found (400, public).
    pub fn validation(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            ..Self::new(ErrorKind::ValidationFailed, VALIDATION_FAILED_MESSAGE)
        }
    }

    /// Resource not found (404, public).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// A supposedly unique lookup yielded several results (422, public).
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnprocessableState, message)
    }

    /// Internal failure (500, private).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Mark the message as safe to show to clients.
    pub fn expose(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Hide the message from clients.
    pub fn conceal(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// The error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// The real message. May be private; use [`AppError::client_message`]
    /// for anything that leaves the process.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the message may reach the client.
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Violations, empty for every kind except `ValidationFailed`.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The message to put on the wire.
    pub fn client_message<'a>(&'a self, phrases: &'a StatusPhrases) -> &'a str {
        if self.is_public {
            &self.message
        } else {
            phrases.phrase(self.status_code())
        }
    }
}
