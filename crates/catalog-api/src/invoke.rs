//! # Handler Failures
//!
//! Everything a handler or extractor can fail with, and how that failure
//! reaches the error translator.
//!
//! A [`Failure`] is either a deliberate [`AppError`] or anything else
//! (collaborator errors, decode mismatches, panics). It is never rendered
//! here: converting a `Failure` into a response produces an empty response
//! with the right status and the failure stashed in its extensions as a
//! [`CapturedFailure`]. The translator middleware takes it out and writes
//! the one error envelope for the request.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_core::AppError;
use catalog_schema::DecodeError;
use parking_lot::Mutex;

/// Outcome of a handler invocation that did not succeed.
#[derive(Debug)]
pub enum Failure {
    /// Raised on purpose; its message and exposure are already decided.
    App(AppError),
    /// Anything else. Its message is never shown to clients.
    Unknown(UnknownFailure),
}

impl Failure {
    /// Wrap an untyped error.
    pub fn unknown(err: impl Into<anyhow::Error>) -> Self {
        Self::Unknown(UnknownFailure { error: err.into() })
    }

    /// HTTP status the failure will be reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::App(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App(err) => write!(f, "{err}"),
            Self::Unknown(unknown) => write!(f, "{}", unknown.message()),
        }
    }
}

impl From<AppError> for Failure {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::Unknown(UnknownFailure { error: err })
    }
}

impl From<DecodeError> for Failure {
    fn from(err: DecodeError) -> Self {
        Self::unknown(err)
    }
}

/// An error nobody raised on purpose.
///
/// Keeps the original error so the audit log can show its cause chain.
#[derive(Debug)]
pub struct UnknownFailure {
    error: anyhow::Error,
}

impl UnknownFailure {
    /// Top-level message of the original error.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Cause chain, plus the backtrace when one was captured.
    pub fn stack(&self) -> String {
        format!("{:?}", self.error)
    }
}

/// Response extension carrying a failure to the translator.
///
/// Cloneable because response extensions must be; the failure itself can
/// be taken only once.
#[derive(Clone)]
pub struct CapturedFailure(Arc<Mutex<Option<Failure>>>);

impl CapturedFailure {
    fn new(failure: Failure) -> Self {
        Self(Arc::new(Mutex::new(Some(failure))))
    }

    /// Take the failure out. Returns `None` on every call after the first.
    pub fn take(&self) -> Option<Failure> {
        self.0.lock().take()
    }
}

impl fmt::Debug for CapturedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapturedFailure").field(&*self.0.lock()).finish()
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(CapturedFailure::new(self));
        response
    }
}

/// Panic handler for `CatchPanicLayer::custom`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    Failure::unknown(anyhow::anyhow!("panic: {message}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_failure_keeps_its_status() {
        let failure = Failure::from(AppError::not_found("Widget 42 not found"));
        assert_eq!(failure.status(), StatusCode::NOT_FOUND);
        assert_eq!(failure.to_string(), "Widget 42 not found");
    }

    #[test]
    fn anyhow_errors_are_unknown() {
        let failure = Failure::from(anyhow::anyhow!("connection reset"));
        assert_eq!(failure.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match failure {
            Failure::Unknown(unknown) => assert_eq!(unknown.message(), "connection reset"),
            Failure::App(_) => panic!("expected Unknown"),
        }
    }

    #[test]
    fn stack_includes_the_cause_chain() {
        let err = anyhow::anyhow!("socket closed").context("count query failed");
        let Failure::Unknown(unknown) = Failure::from(err) else {
            panic!("expected Unknown");
        };
        assert_eq!(unknown.message(), "count query failed");
        assert!(unknown.stack().contains("socket closed"));
    }

    #[test]
    fn into_response_is_bodiless_and_captures_once() {
        let response = Failure::from(AppError::unprocessable("stuck")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let captured = response.extensions().get::<CapturedFailure>().unwrap().clone();
        assert!(matches!(captured.take(), Some(Failure::App(_))));
        assert!(captured.take().is_none());
    }

    #[test]
    fn panic_payloads_become_unknown_failures() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let failure = response
            .extensions()
            .get::<CapturedFailure>()
            .and_then(CapturedFailure::take)
            .unwrap();
        assert_eq!(failure.to_string(), "panic: boom");

        let response = panic_response(Box::new(String::from("owned boom")));
        let failure = response
            .extensions()
            .get::<CapturedFailure>()
            .and_then(CapturedFailure::take)
            .unwrap();
        assert_eq!(failure.to_string(), "panic: owned boom");
    }
}
