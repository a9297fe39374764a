//! Router assembly.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::handlers;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const CF_RAY_HEADER: &str = "cf-ray";

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health::root_handler))
        .route("/v1/health", get(handlers::health::health_handler))
        .route("/v1/status", get(handlers::status::status_handler))
        .route("/v1/regions", get(handlers::catalog::regions_handler))
        .route("/v1/destinations", get(handlers::catalog::destinations_handler))
        .route("/v1/rides", get(handlers::rides::rides_handler))
        .route("/v1/summary", post(handlers::summary::summary_handler))
        .route("/v1/parks/:park_id", get(handlers::parks::park_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .fallback(handlers::health::not_found_handler)
        // Middleware
        .layer(Extension(state))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

/// Echo the caller's request id (or edge ray id) on the response, minting
/// one when absent.
async fn request_id(request: Request, next: Next) -> Response {
    let id = [REQUEST_ID_HEADER, CF_RAY_HEADER]
        .iter()
        .find_map(|name| request.headers().get(*name).cloned())
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(HeaderName::from_static(REQUEST_ID_HEADER), id);
    response
}
