//! Ride list normalization.
//!
//! The wait-time provider answers in two shapes, sometimes both at once:
//!
//! ```text
//! { "park": "...", "lands": [ { "rides": [ ... ] } ], "rides": [ ... ] }
//! ```
//!
//! Some parks nest every ride under `lands`; others return only a flat
//! `rides` array, and a few send `"lands": []` next to a populated flat list.
//! [`RideFeed::classify`] resolves the body into one variant up front and
//! [`RideFeed::into_park_feed`] merges it into a single list keyed by ride id.

use serde_json::Value;
use std::collections::HashSet;

use crate::error::{ParkPalError, ParkPalResult};
use crate::payload::RideRecord;

const UNKNOWN_RIDE: &str = "Unknown Ride";

/// An upstream ride response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RideFeed {
    /// Rides grouped into sections, with an optional flat list alongside.
    Sectioned {
        park_name: Option<String>,
        sections: Vec<Vec<RideRecord>>,
        flat: Vec<RideRecord>,
    },
    /// Only a flat ride list.
    Flat {
        park_name: Option<String>,
        rides: Vec<RideRecord>,
    },
    /// Neither shape could be found.
    Malformed(String),
}

/// Normalized rides for a single park.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParkFeed {
    /// Park name reported upstream, if any.
    pub park_name: Option<String>,
    pub rides: Vec<RideRecord>,
}

impl RideFeed {
    /// Classify a raw response body.
    pub fn classify(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(e) => RideFeed::Malformed(format!("invalid JSON: {}", e)),
        }
    }

    /// Classify an already-parsed JSON document.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return RideFeed::Malformed("response is not a JSON object".to_string());
        };

        let park_name = obj
            .get("park")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let flat = obj.get("rides").and_then(Value::as_array).map(|rides| parse_rides(rides));

        match obj.get("lands").and_then(Value::as_array) {
            Some(lands) => {
                let sections = lands
                    .iter()
                    .map(|land| {
                        land.get("rides")
                            .and_then(Value::as_array)
                            .map(|rides| parse_rides(rides))
                            .unwrap_or_default()
                    })
                    .collect();
                RideFeed::Sectioned {
                    park_name,
                    sections,
                    flat: flat.unwrap_or_default(),
                }
            }
            None => match flat {
                Some(rides) => RideFeed::Flat { park_name, rides },
                None => RideFeed::Malformed("missing both `lands` and `rides`".to_string()),
            },
        }
    }

    /// Merge into one list deduplicated by ride id.
    ///
    /// Sectioned entries are inserted first, so they win over flat entries
    /// sharing the same id. Within a source the first occurrence wins.
    pub fn into_park_feed(self) -> ParkPalResult<ParkFeed> {
        match self {
            RideFeed::Sectioned {
                park_name,
                sections,
                flat,
            } => Ok(ParkFeed {
                park_name,
                rides: merge_rides(sections.into_iter().flatten().chain(flat)),
            }),
            RideFeed::Flat { park_name, rides } => Ok(ParkFeed {
                park_name,
                rides: merge_rides(rides),
            }),
            RideFeed::Malformed(reason) => Err(ParkPalError::MalformedResponse(reason)),
        }
    }
}

/// Deduplicate rides by id, keeping the first occurrence and input order.
pub fn merge_rides(rides: impl IntoIterator<Item = RideRecord>) -> Vec<RideRecord> {
    let mut seen = HashSet::new();
    rides.into_iter().filter(|r| seen.insert(r.id)).collect()
}

fn parse_rides(values: &[Value]) -> Vec<RideRecord> {
    values.iter().filter_map(parse_ride).collect()
}

/// Entries without a usable id are skipped.
fn parse_ride(value: &Value) -> Option<RideRecord> {
    let obj = value.as_object()?;
    let id = obj.get("id").and_then(as_integer)?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_RIDE)
        .to_string();

    let wait_time = obj
        .get("wait_time")
        .and_then(as_integer)
        .unwrap_or(0)
        .clamp(0, u32::MAX as i64) as u32;

    Some(RideRecord {
        id,
        name,
        is_open: obj.get("is_open").map(is_truthy).unwrap_or(false),
        wait_time,
    })
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}
