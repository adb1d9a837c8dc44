//! # HTTP Access Log
//!
//! One `info` line per request in the familiar
//! `METHOD URL STATUS LENGTH - N ms` layout, skipping configured path
//! prefixes (health probes, docs). Every request also runs inside a span
//! carrying the service label and request id, so any event logged while
//! handling it is attributed to both.

use std::sync::Arc;
use std::time::Instant;

use axum::body::HttpBody;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::middleware::translate::REQUEST_ID_HEADER;

/// Access-log settings.
#[derive(Debug, Clone)]
pub struct AccessLog {
    label: Arc<str>,
    ignored: Arc<[String]>,
}

impl AccessLog {
    pub fn new(label: impl Into<String>, ignored: Vec<String>) -> Self {
        Self {
            label: Arc::from(label.into()),
            ignored: ignored.into(),
        }
    }

    /// Whether `path` starts with an ignored prefix.
    pub fn ignores(&self, path: &str) -> bool {
        self.ignored
            .iter()
            .any(|prefix| !prefix.is_empty() && path.starts_with(prefix.as_str()))
    }
}

pub async fn log_request(State(log): State<AccessLog>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let span = tracing::info_span!("request", service = %log.label, request_id = %request_id);

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;

    if !log.ignores(uri.path()) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let length = response
            .body()
            .size_hint()
            .exact()
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        span.in_scope(|| {
            tracing::info!(
                "{} {} {} {} - {:.3} ms",
                method,
                uri,
                response.status().as_u16(),
                length,
                elapsed_ms
            );
        });
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_configured_prefixes() {
        let log = AccessLog::new("CATALOG-API", vec!["/api-docs".into(), "/health-check".into()]);
        assert!(log.ignores("/health-check"));
        assert!(log.ignores("/api-docs/swagger.json"));
        assert!(!log.ignores("/api/products"));
    }

    #[test]
    fn empty_prefixes_ignore_nothing() {
        let log = AccessLog::new("CATALOG-API", vec![String::new()]);
        assert!(!log.ignores("/api/products"));
    }
}
