//! # Error Translator
//!
//! The single place where a failure becomes a client response.
//!
//! Per request the translator is either `NORMAL` (no failure seen) or
//! `ERROR` (a handler, extractor or panic left a [`CapturedFailure`] on the
//! response). `NORMAL` responses pass through untouched. In `ERROR` the
//! translator:
//!
//! 1. Normalises the failure: an `AppError` is used as is, anything else
//!    becomes a private `Internal` error carrying the original message.
//! 2. Writes one audit record with the request context and, for unknown
//!    failures, the cause chain.
//! 3. Counts the error by status.
//! 4. Replaces the response with the error envelope. Private messages are
//!    swapped for the phrase of the status.
//!
//! The failure is taken out of the response, so a request is translated at
//! most once.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::{AppError, StatusPhrases};

use crate::envelope::{with_request_meta, ErrorEnvelope, Meta};
use crate::invoke::{CapturedFailure, Failure};
use crate::middleware::metrics::HTTP_ERRORS_TOTAL;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Read-only translator configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    phrases: Arc<StatusPhrases>,
    response_meta: bool,
}

impl Pipeline {
    pub fn new(phrases: StatusPhrases, response_meta: bool) -> Self {
        Self {
            phrases: Arc::new(phrases),
            response_meta,
        }
    }

    pub fn phrases(&self) -> &StatusPhrases {
        &self.phrases
    }

    /// Turn a failure into the error envelope response, logging and
    /// counting it on the way.
    pub fn render(&self, failure: Failure, context: &RequestContext, meta: Option<Meta>) -> Response {
        let (error, stack) = match failure {
            Failure::App(err) => (err, None),
            Failure::Unknown(unknown) => (AppError::internal(unknown.message()), Some(unknown.stack())),
        };

        audit(&error, stack.as_deref(), context);
        metrics::counter!(HTTP_ERRORS_TOTAL, "status" => error.status_code().to_string()).increment(1);

        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::new(&error, &self.phrases, meta);
        (status, Json(envelope)).into_response()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(StatusPhrases::new(), true)
    }
}

/// Request facts captured before the handler consumes the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub method: String,
    /// Path and query as received.
    pub path: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn capture(request: &Request) -> Self {
        let headers = request.headers();
        let ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .or_else(|| forwarded_for(headers));
        Self {
            method: request.method().to_string(),
            path: request
                .uri()
                .path_and_query()
                .map_or_else(|| request.uri().path().to_string(), ToString::to_string),
            ip,
            user_agent: header(headers, "user-agent"),
            request_id: header(headers, REQUEST_ID_HEADER),
        }
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// First hop of `X-Forwarded-For`.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-forwarded-for")?
        .split(',')
        .map(str::trim)
        .find(|hop| !hop.is_empty())
        .map(str::to_string)
}

/// One audit record per failure. Both levels carry the same fields.
fn audit(error: &AppError, stack: Option<&str>, context: &RequestContext) {
    macro_rules! record {
        ($level:ident) => {
            tracing::$level!(
                method = %context.method,
                path = %context.path,
                status = error.status_code(),
                is_public = error.is_public(),
                violations = ?error
                    .violations()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
                stack = stack.unwrap_or_default(),
                ip = context.ip.as_deref().unwrap_or_default(),
                user_agent = context.user_agent.as_deref().unwrap_or_default(),
                request_id = context.request_id.as_deref().unwrap_or_default(),
                "{} {} - {}",
                context.method,
                context.path,
                error.message()
            )
        };
    }

    if error.status_code() >= 500 {
        record!(error);
    } else {
        record!(warn);
    }
}

/// Axum middleware installing the translator around the whole router.
pub async fn translate(State(pipeline): State<Pipeline>, request: Request, next: Next) -> Response {
    let context = RequestContext::capture(&request);
    let meta = pipeline
        .response_meta
        .then(|| Meta::for_request(context.request_id.clone()));

    let response = with_request_meta(meta.clone(), next.run(request)).await;

    let captured = response
        .extensions()
        .get::<CapturedFailure>()
        .and_then(CapturedFailure::take);
    match captured {
        None => response,
        Some(failure) => pipeline.render(failure, &context, meta),
    }
}
