//! # catalog-api — Axum API Service
//!
//! HTTP service for the product catalog, built on Axum/Tower/Tokio.
//! Every endpoint runs through the same request pipeline:
//!
//! ```text
//! request → Validated<P, B, Q> → handler → Reply<T>      → success envelope
//!                  │                  │
//!                  └── Failure ───────┴── CapturedFailure → translator → error envelope
//! ```
//!
//! ## Routes
//!
//! - `/api/products/*` — product resource
//! - `/health-check` — liveness probe
//! - `/metrics` — Prometheus exposition, when a recorder is installed
//!
//! Unmatched paths and methods answer 404 "Resource not found".
//!
//! ## Middleware Stack (Tower), outermost first
//!
//! SetRequestId → PropagateRequestId → AccessLog → Metrics → ErrorTranslator
//! → CatchPanic → router
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG.
//! - Handlers never build error responses; they return a [`Failure`] and
//!   the translator renders it.
//! - Client-facing messages of unexpected failures are always masked.

pub mod config;
pub mod envelope;
pub mod extractors;
pub mod invoke;
pub mod middleware;
pub mod product;
pub mod repository;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::middleware::access_log::AccessLog;

pub use config::Config;
pub use envelope::Reply;
pub use extractors::Validated;
pub use invoke::Failure;
pub use state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let pipeline = state.pipeline.clone();
    let access_log = AccessLog::new(
        state.config.log_label.clone(),
        state.config.log_ignored_routes.clone(),
    );

    Router::new()
        .merge(routes::health::router())
        .merge(routes::products::router())
        .merge(routes::metrics::router())
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(invoke::panic_response))
        .layer(from_fn_with_state(pipeline, middleware::translate::translate))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(from_fn_with_state(access_log, middleware::access_log::log_request))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
