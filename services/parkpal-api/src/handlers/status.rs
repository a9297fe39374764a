//! Cache status, read from the cache only.

use axum::{extract::Extension, http::StatusCode, response::Response};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use parkpal_common::{Payload, Scope, Units};
use storage::HotCacheStatsSnapshot;

use super::json_response;
use crate::aggregator::AggregationRequest;
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub now: String,
    pub regions: BTreeMap<String, RegionStatus>,
    pub hot_cache: HotCacheStatsSnapshot,
    pub durable_backend: &'static str,
}

#[derive(Serialize)]
pub struct RegionStatus {
    pub imperial: EntryStatus,
    pub metric: EntryStatus,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EntryStatus {
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl EntryStatus {
    fn describe(payload: Option<&Payload>, now: DateTime<Utc>) -> Self {
        match payload {
            Some(p) => Self {
                present: true,
                updated_at: Some(p.updated_at),
                age_seconds: Some(p.age_seconds(now)),
                errors: Some(p.errors.clone()),
            },
            None => Self {
                present: false,
                updated_at: None,
                age_seconds: None,
                errors: None,
            },
        }
    }
}

/// GET /v1/status - summary cache state per region and units
pub async fn status_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let now = Utc::now();
    let mut regions = BTreeMap::new();

    for dest in state.registry.destinations() {
        let scope = Scope::Region(dest.id.clone());
        let imperial = state
            .aggregator
            .cached(&AggregationRequest::summary(scope.clone(), Units::Imperial))
            .await;
        let metric = state
            .aggregator
            .cached(&AggregationRequest::summary(scope, Units::Metric))
            .await;

        regions.insert(
            dest.id.clone(),
            RegionStatus {
                imperial: EntryStatus::describe(imperial.as_deref(), now),
                metric: EntryStatus::describe(metric.as_deref(), now),
            },
        );
    }

    let body = StatusResponse {
        now: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        regions,
        hot_cache: state.cache.hot().stats(),
        durable_backend: state.cache.durable_backend(),
    };
    json_response(StatusCode::OK, &body, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_utils::payload_with_parks;

    #[test]
    fn test_describe_present_entry() {
        let now = Utc::now();
        let mut payload = payload_with_parks("orlando", now - Duration::seconds(90), vec![]);
        payload.errors = vec!["weather_timeout".to_string()];

        let status = EntryStatus::describe(Some(&payload), now);
        assert!(status.present);
        assert_eq!(status.age_seconds, Some(90));
        assert_eq!(status.errors, Some(vec!["weather_timeout".to_string()]));
    }

    #[test]
    fn test_describe_absent_entry() {
        let status = EntryStatus::describe(None, Utc::now());
        assert!(!status.present);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({ "present": false })
        );
    }
}
