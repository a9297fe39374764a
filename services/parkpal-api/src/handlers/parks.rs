//! Single-park summary: `GET /v1/parks/:park_id?units=metric`.

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use parkpal_common::{ParkPalError, Scope, Units};

use super::summary::{summary_response, SummaryRequest};
use super::ApiError;
use crate::aggregator::AggregationRequest;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ParkQuery {
    pub units: Option<String>,
}

/// GET /v1/parks/:park_id
pub async fn park_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(park_id): Path<String>,
    Query(query): Query<ParkQuery>,
) -> Result<Response, ApiError> {
    let park_id: i64 = park_id
        .trim()
        .parse()
        .map_err(|_| ParkPalError::InvalidParameter {
            param: "park_id".to_string(),
            message: format!("not an integer: {:?}", park_id),
        })?;
    let units = Units::parse_lenient(query.units.as_deref());

    let aggregation = AggregationRequest::summary(Scope::Park(park_id), units);
    let fetched = state
        .aggregator
        .get_complete(&aggregation, &[park_id])
        .await?;

    let request = SummaryRequest {
        region: fetched.payload.region.clone(),
        units,
        park_ids: vec![park_id],
        favorites: HashSet::new(),
    };
    Ok(summary_response(&fetched, &request))
}
