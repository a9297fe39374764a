//! Liveness, metrics, and fallback handlers.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::json_response;
use crate::metrics::record_hot_cache_stats;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub time: String,
}

/// GET / - Plain-text banner
pub async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, "ParkPal API ok")
}

/// GET /v1/health - Liveness, no upstream calls
pub async fn health_handler() -> Response {
    let body = HealthResponse {
        ok: true,
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    json_response(StatusCode::OK, &body, 0)
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    record_hot_cache_stats(&state.cache.hot().stats());

    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

/// Anything unrouted
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
