//! Ride catalog: ids and names per park.
//!
//! `GET /v1/rides?park=6`, `?park=6,5,7`, `?region=tokyo`, optionally with
//! `&include_single_rider=1`.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use parkpal_common::{ParkPalError, ParkRegistry, Payload, RideRecord, Scope};

use super::{json_response, ApiError, DATA_MAX_AGE};
use crate::aggregator::AggregationRequest;
use crate::state::AppState;

const SINGLE_RIDER_MARKER: &str = "Single Rider";

#[derive(Debug, Default, Deserialize)]
pub struct RidesQuery {
    pub park: Option<String>,
    pub region: Option<String>,
    pub include_single_rider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RidesResponse {
    pub updated_at: DateTime<Utc>,
    pub region: String,
    pub parks: Vec<CatalogPark>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CatalogPark {
    pub park_id: i64,
    pub name: String,
    pub rides: Vec<CatalogRide>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CatalogRide {
    pub id: i64,
    pub name: String,
}

/// GET /v1/rides
pub async fn rides_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<RidesQuery>,
) -> Result<Response, ApiError> {
    let (region, park_ids) = resolve_request(&state.registry, &query)?;
    let include_single_rider = query.include_single_rider.as_deref() == Some("1");

    let request = AggregationRequest::catalog(Scope::Region(region.clone()));
    let fetched = state.aggregator.get_complete(&request, &park_ids).await?;

    if fetched.payload.is_total_failure() {
        return Err(ParkPalError::ServiceUnavailable("no data".to_string()).into());
    }

    let body = RidesResponse {
        updated_at: fetched.payload.updated_at,
        region,
        parks: catalog_parks(
            &state.registry,
            &fetched.payload,
            &park_ids,
            include_single_rider,
        ),
    };
    Ok(json_response(StatusCode::OK, &body, DATA_MAX_AGE))
}

/// Pick the region and park ids a query covers.
///
/// A known `region` wins; otherwise `park` is a comma-separated id list
/// filtered to registered parks, and the region is the first park's.
fn resolve_request(
    registry: &ParkRegistry,
    query: &RidesQuery,
) -> Result<(String, Vec<i64>), ParkPalError> {
    if let Some(dest) = query.region.as_deref().and_then(|r| registry.region(r)) {
        return Ok((dest.id.clone(), dest.park_ids()));
    }

    let Some(park_param) = query.park.as_deref() else {
        return Err(ParkPalError::MissingParameter("park or region".to_string()));
    };

    let park_ids: Vec<i64> = park_param
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .filter(|id| registry.contains_park(*id))
        .collect();

    let Some(first) = park_ids.first() else {
        return Err(ParkPalError::InvalidParameter {
            param: "park".to_string(),
            message: "no valid park IDs".to_string(),
        });
    };

    Ok((registry.region_for_park(*first).id.clone(), park_ids))
}

/// One entry per requested id, in request order; parks missing from the
/// payload appear with no rides.
fn catalog_parks(
    registry: &ParkRegistry,
    payload: &Payload,
    park_ids: &[i64],
    include_single_rider: bool,
) -> Vec<CatalogPark> {
    park_ids
        .iter()
        .map(|id| {
            let (name, rides) = match payload.park(*id) {
                Some(park) => (park.name.clone(), park.rides.as_slice()),
                None => (registry.park_name(*id), &[][..]),
            };
            CatalogPark {
                park_id: *id,
                name,
                rides: rides
                    .iter()
                    .filter(|r| include_single_rider || !is_single_rider(r))
                    .map(|r| CatalogRide {
                        id: r.id,
                        name: r.name.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}

fn is_single_rider(ride: &RideRecord) -> bool {
    ride.name.contains(SINGLE_RIDER_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{park, payload_with_parks, ride};

    fn query(park: Option<&str>, region: Option<&str>) -> RidesQuery {
        RidesQuery {
            park: park.map(str::to_string),
            region: region.map(str::to_string),
            include_single_rider: None,
        }
    }

    #[test]
    fn test_region_query() {
        let registry = ParkRegistry::builtin();
        let (region, ids) = resolve_request(&registry, &query(None, Some("Tokyo"))).unwrap();
        assert_eq!(region, "tokyo");
        assert_eq!(ids, vec![274, 275]);
    }

    #[test]
    fn test_park_list_query() {
        let registry = ParkRegistry::builtin();
        let (region, ids) =
            resolve_request(&registry, &query(Some("16, 999,abc,17"), None)).unwrap();
        assert_eq!(region, "california");
        assert_eq!(ids, vec![16, 17]);

        // Unknown region falls through to the park list
        let (region, ids) =
            resolve_request(&registry, &query(Some("6"), Some("atlantis"))).unwrap();
        assert_eq!(region, "orlando");
        assert_eq!(ids, vec![6]);
    }

    #[test]
    fn test_bad_queries() {
        let registry = ParkRegistry::builtin();
        assert!(matches!(
            resolve_request(&registry, &query(None, None)),
            Err(ParkPalError::MissingParameter(_))
        ));
        assert!(matches!(
            resolve_request(&registry, &query(None, Some("atlantis"))),
            Err(ParkPalError::MissingParameter(_))
        ));
        assert!(matches!(
            resolve_request(&registry, &query(Some("999,x"), None)),
            Err(ParkPalError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_single_rider_filter_and_placeholders() {
        let registry = ParkRegistry::builtin();
        let payload = payload_with_parks(
            "california",
            Utc::now(),
            vec![park(
                17,
                "Disney California Adventure",
                vec![ride(1, "Incredicoaster", 30), ride(2, "Incredicoaster Single Rider", 5)],
            )],
        );

        let parks = catalog_parks(&registry, &payload, &[17, 16], false);
        assert_eq!(parks.len(), 2);
        assert_eq!(
            parks[0].rides,
            vec![CatalogRide {
                id: 1,
                name: "Incredicoaster".to_string()
            }]
        );
        assert_eq!(parks[1].park_id, 16);
        assert_eq!(parks[1].name, "Disneyland");
        assert!(parks[1].rides.is_empty());

        let parks = catalog_parks(&registry, &payload, &[17], true);
        assert_eq!(parks[0].rides.len(), 2);
    }
}
