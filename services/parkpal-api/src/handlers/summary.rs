//! Main endpoint: ride waits plus weather for a destination.
//!
//! `POST /v1/summary` with body
//! `{ region?, units?, parks?: [id], favorite_ride_ids?: [id] }`.

use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderValue, StatusCode},
    response::Response,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use parkpal_common::{ParkPalError, ParkRides, Scope, Units, WeatherSnapshot};

use super::{json_response, parse_ids, ApiError, DATA_MAX_AGE};
use crate::aggregator::{AggregationRequest, Fetched};
use crate::state::AppState;

/// Most parks a caller may select.
pub const MAX_PARKS: usize = 8;
/// Most favorite rides a caller may filter by.
pub const MAX_FAVORITES: usize = 50;

pub const CACHE_HEADER: &str = "x-parkpal-cache";

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub region: String,
    pub units: Units,
    pub updated_at: DateTime<Utc>,
    pub server_time: String,
    pub weather: Option<WeatherSnapshot>,
    pub parks: Vec<ParkRides>,
    pub errors: Vec<String>,
    pub source: &'static str,
}

/// Body returned when every upstream failed.
#[derive(Debug, Serialize)]
pub struct UnavailableResponse {
    pub region: String,
    pub units: Units,
    pub updated_at: String,
    pub weather: Option<WeatherSnapshot>,
    pub parks: Vec<ParkRides>,
    pub errors: Vec<String>,
}

/// Parsed summary request.
#[derive(Debug, PartialEq)]
pub struct SummaryRequest {
    pub region: String,
    pub units: Units,
    pub park_ids: Vec<i64>,
    pub favorites: HashSet<i64>,
}

/// POST /v1/summary
pub async fn summary_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ParkPalError::InvalidParameter {
        param: "body".to_string(),
        message: "Invalid JSON body".to_string(),
    })?;
    let request = parse_request(&state, &value);

    let aggregation =
        AggregationRequest::summary(Scope::Region(request.region.clone()), request.units);
    let fetched = state
        .aggregator
        .get_complete(&aggregation, &request.park_ids)
        .await?;

    Ok(summary_response(&fetched, &request))
}

fn parse_request(state: &AppState, body: &Value) -> SummaryRequest {
    let dest = state
        .registry
        .region_or_default(body.get("region").and_then(Value::as_str));
    let units = Units::parse_lenient(body.get("units").and_then(Value::as_str));
    let park_ids = parse_ids(body.get("parks"), &dest.park_ids(), MAX_PARKS);
    let favorites = parse_ids(body.get("favorite_ride_ids"), &[], MAX_FAVORITES)
        .into_iter()
        .collect();

    SummaryRequest {
        region: dest.id.clone(),
        units,
        park_ids,
        favorites,
    }
}

/// Render a fetched payload for the requested parks and favorites.
///
/// Total failures become a 503 with the error tokens and no data.
pub fn summary_response(fetched: &Fetched, request: &SummaryRequest) -> Response {
    let payload = &fetched.payload;

    if payload.is_total_failure() {
        let body = UnavailableResponse {
            region: request.region.clone(),
            units: request.units,
            updated_at: now_rfc3339(),
            weather: None,
            parks: Vec::new(),
            errors: payload.errors.clone(),
        };
        return json_response(StatusCode::SERVICE_UNAVAILABLE, &body, 0);
    }

    let body = SummaryResponse {
        region: request.region.clone(),
        units: request.units,
        updated_at: payload.updated_at,
        server_time: now_rfc3339(),
        weather: payload.weather.clone(),
        parks: select_parks(&payload.parks, &request.park_ids, &request.favorites),
        errors: payload.errors.clone(),
        source: fetched.origin.as_str(),
    };

    let mut response = json_response(StatusCode::OK, &body, DATA_MAX_AGE);
    response.headers_mut().insert(
        CACHE_HEADER,
        HeaderValue::from_static(fetched.origin.cache_header()),
    );
    response
}

/// Keep requested parks; with favorites, keep only favorite rides and drop
/// parks left empty.
fn select_parks(parks: &[ParkRides], park_ids: &[i64], favorites: &HashSet<i64>) -> Vec<ParkRides> {
    let selected = parks.iter().filter(|p| park_ids.contains(&p.id)).cloned();

    if favorites.is_empty() {
        return selected.collect();
    }

    selected
        .map(|mut park| {
            park.rides.retain(|r| favorites.contains(&r.id));
            park
        })
        .filter(|park| !park.rides.is_empty())
        .collect()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
