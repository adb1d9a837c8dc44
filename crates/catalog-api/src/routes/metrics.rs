//! # Metrics Endpoint
//!
//! `GET /metrics` renders the Prometheus text exposition when a recorder
//! is installed. Otherwise the route behaves like any unknown path.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::invoke::Failure;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(render))
}

async fn render(State(state): State<AppState>) -> Result<impl IntoResponse, Failure> {
    let Some(handle) = state.metrics.as_ref() else {
        return Err(super::not_found().await);
    };
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
