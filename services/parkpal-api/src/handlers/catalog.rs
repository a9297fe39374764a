//! Registry listings: regions and destinations.

use axum::{extract::Extension, http::StatusCode, response::Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use parkpal_common::Coordinates;

use super::{json_response, LISTING_MAX_AGE};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegionEntry {
    pub coords: Coordinates,
    pub parks: Vec<ParkEntry>,
}

#[derive(Serialize)]
pub struct ParkEntry {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize)]
pub struct DestinationsResponse {
    pub updated_at: String,
    pub destinations: Vec<DestinationEntry>,
    pub errors: Vec<String>,
}

#[derive(Serialize)]
pub struct DestinationEntry {
    pub id: String,
    pub name: String,
    pub parks: Vec<DestinationPark>,
}

#[derive(Serialize)]
pub struct DestinationPark {
    pub id: i64,
    pub name: String,
    pub provider: String,
}

/// GET /v1/regions - region id to coordinates and parks
pub async fn regions_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let regions: BTreeMap<&str, RegionEntry> = state
        .registry
        .destinations()
        .iter()
        .map(|dest| {
            let entry = RegionEntry {
                coords: dest.coords,
                parks: dest
                    .parks
                    .iter()
                    .map(|p| ParkEntry {
                        id: p.id,
                        name: p.name.clone(),
                    })
                    .collect(),
            };
            (dest.id.as_str(), entry)
        })
        .collect();

    json_response(StatusCode::OK, &regions, LISTING_MAX_AGE)
}

/// GET /v1/destinations - registry listing for park pickers
pub async fn destinations_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let destinations = state
        .registry
        .destinations()
        .iter()
        .map(|dest| DestinationEntry {
            id: dest.id.clone(),
            name: dest.name.clone(),
            parks: dest
                .parks
                .iter()
                .map(|p| DestinationPark {
                    id: p.id,
                    name: p.name.clone(),
                    provider: p.provider.clone(),
                })
                .collect(),
        })
        .collect();

    let body = DestinationsResponse {
        updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        destinations,
        errors: Vec::new(),
    };
    json_response(StatusCode::OK, &body, LISTING_MAX_AGE)
}
