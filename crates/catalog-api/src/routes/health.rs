//! # Health Check
//!
//! `GET /health-check` answers `200 OK` with a plain-text body while the
//! process is serving.

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health-check", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}
