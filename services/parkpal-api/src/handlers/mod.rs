//! HTTP request handlers for the ParkPal API.

pub mod catalog;
pub mod health;
pub mod parks;
pub mod rides;
pub mod status;
pub mod summary;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use parkpal_common::ParkPalError;

/// Cache lifetime advertised on successful data responses.
pub const DATA_MAX_AGE: u32 = 60;
/// Cache lifetime advertised on registry listings.
pub const LISTING_MAX_AGE: u32 = 300;

/// Serialize `body` with the standard JSON and cache headers.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T, max_age: u32) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = (status, bytes).into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            );
            if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", max_age)) {
                headers.insert(header::CACHE_CONTROL, value);
            }
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

/// Error wrapper rendered as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError(pub ParkPalError);

impl From<ParkPalError> for ApiError {
    fn from(err: ParkPalError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.is_upstream() {
            tracing::warn!(error = %self.0, "Upstream failure surfaced to caller");
        } else if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        json_response(status, &serde_json::json!({ "error": self.0.to_string() }), 0)
    }
}

/// Integer ids from a JSON array, ignoring non-integers and keeping at most
/// `max_len`. A missing, non-array or empty value yields `fallback`.
pub fn parse_ids(value: Option<&Value>, fallback: &[i64], max_len: usize) -> Vec<i64> {
    match value.and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items
            .iter()
            .filter_map(integer_id)
            .take(max_len)
            .collect(),
        _ => fallback.to_vec(),
    }
}

fn integer_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
