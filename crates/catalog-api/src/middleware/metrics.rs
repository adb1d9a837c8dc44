//! # Prometheus Metrics
//!
//! HTTP request counter and latency histogram recorded through the
//! `metrics` facade. Without an installed recorder the macros are no-ops,
//! so tests run without a Prometheus exporter.
//!
//! The error counter is recorded by the translator, which is the only
//! stage that knows a response is an error.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

pub const HTTP_REQUESTS_TOTAL: &str = "catalog_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "catalog_http_request_duration_seconds";
pub const HTTP_ERRORS_TOTAL: &str = "catalog_http_errors_total";

/// Register help text for the HTTP metrics. Call once after installing
/// the recorder.
pub fn describe() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP requests by method and status");
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    metrics::describe_counter!(HTTP_ERRORS_TOTAL, "Error envelopes sent, by status");
}

/// Middleware recording request count and latency by method and status.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "status" => status)
        .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method)
        .record(started.elapsed().as_secs_f64());

    response
}
