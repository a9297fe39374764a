//! Cache-or-aggregate orchestration.
//!
//! ```text
//! get_or_fetch(request, force)
//!   ├─ !force: CacheStore::get ──hit──▶ Fetched { origin: Cache }
//!   └─ miss or force:
//!        join(parks..., weather)     each call isolated, bounded by timeout
//!        assemble Payload (updated_at = now, errors = tokens)
//!        CacheStore::put (failure logged only)
//!        ──▶ Fetched { origin: Live }
//! ```
//!
//! Concurrent cold requests are not coalesced: each aggregates and writes,
//! and the last write wins.

use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use parkpal_common::{
    Coordinates, ParkConfig, ParkPalError, ParkPalResult, ParkRegistry, ParkRides, Payload,
    ResolvedScope, Scope, Units, WeatherSnapshot,
};
use storage::{CacheFamily, CacheKey, CacheStore};
use upstream::{RideSource, WeatherSource};

use crate::completeness::needs_refresh;
use crate::config::ServiceConfig;
use crate::metrics;

/// What to aggregate and how it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub family: CacheFamily,
    pub scope: Scope,
    pub units: Units,
}

impl AggregationRequest {
    /// Ride waits plus weather.
    pub fn summary(scope: Scope, units: Units) -> Self {
        Self {
            family: CacheFamily::Summary,
            scope,
            units,
        }
    }

    /// Ride ids and names. Units do not affect the result, so catalogs
    /// always share the metric key.
    pub fn catalog(scope: Scope) -> Self {
        Self {
            family: CacheFamily::Catalog,
            scope,
            units: Units::Metric,
        }
    }
}

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Live,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Cache => "cache",
            Origin::Live => "live",
        }
    }

    /// Value for the `x-parkpal-cache` response header.
    pub fn cache_header(&self) -> &'static str {
        match self {
            Origin::Cache => "HIT",
            Origin::Live => "MISS",
        }
    }
}

/// A payload and its origin.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub payload: Arc<Payload>,
    pub origin: Origin,
}

/// Orchestrator knobs.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub cache_version: String,
    pub cache_total_failures: bool,
    pub upstream_timeout: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::from(&ServiceConfig::default())
    }
}

impl From<&ServiceConfig> for AggregatorSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            cache_version: config.cache_version.clone(),
            cache_total_failures: config.cache_total_failures,
            upstream_timeout: config.upstream_timeout(),
        }
    }
}

/// Serves payloads from the cache or aggregates them live.
pub struct Aggregator {
    registry: Arc<ParkRegistry>,
    cache: Arc<CacheStore>,
    rides: Arc<dyn RideSource>,
    weather: Arc<dyn WeatherSource>,
    settings: AggregatorSettings,
}

impl Aggregator {
    pub fn new(
        registry: Arc<ParkRegistry>,
        cache: Arc<CacheStore>,
        rides: Arc<dyn RideSource>,
        weather: Arc<dyn WeatherSource>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            registry,
            cache,
            rides,
            weather,
            settings,
        }
    }

    pub fn registry(&self) -> &ParkRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    pub fn key(&self, request: &AggregationRequest) -> CacheKey {
        CacheKey::new(
            self.settings.cache_version.clone(),
            request.family,
            request.scope.clone(),
            request.units,
        )
    }

    /// Cache-only read; never calls upstream.
    pub async fn cached(&self, request: &AggregationRequest) -> Option<Arc<Payload>> {
        self.cache.get(&self.key(request)).await
    }

    /// Serve from the cache unless `force_refresh`, otherwise aggregate live
    /// and write the result back.
    #[instrument(skip(self, request), fields(key = %self.key(request)))]
    pub async fn get_or_fetch(
        &self,
        request: &AggregationRequest,
        force_refresh: bool,
    ) -> ParkPalResult<Fetched> {
        let resolved = self.registry.resolve(&request.scope)?;
        let key = self.key(request);

        if !force_refresh {
            let cached = self.cache.get(&key).await;
            metrics::record_cache_lookup(request.family, cached.is_some());
            if let Some(payload) = cached {
                return Ok(Fetched {
                    payload,
                    origin: Origin::Cache,
                });
            }
        }

        let payload = Arc::new(self.aggregate(request, &resolved).await);
        metrics::record_aggregation(request.family);

        if payload.is_total_failure() && !self.settings.cache_total_failures {
            warn!(key = %key, errors = ?payload.errors, "Every upstream failed, not caching");
        } else if let Err(e) = self.cache.put(&key, Arc::clone(&payload)).await {
            metrics::record_cache_write_failure();
            warn!(key = %key, error = %e, "Durable cache write failed");
        }

        Ok(Fetched {
            payload,
            origin: Origin::Live,
        })
    }

    /// [`get_or_fetch`](Self::get_or_fetch), refreshing a cache hit once if
    /// it lacks rides for any of `requested_ids`.
    ///
    /// Ids outside the request's scope are ignored. The refreshed payload is
    /// returned as is, complete or not. A cached summary total failure is
    /// served without a refresh.
    pub async fn get_complete(
        &self,
        request: &AggregationRequest,
        requested_ids: &[i64],
    ) -> ParkPalResult<Fetched> {
        let resolved = self.registry.resolve(&request.scope)?;
        let in_scope = requested_ids
            .iter()
            .copied()
            .filter(|id| resolved.parks.iter().any(|park| park.id == *id))
            .collect::<Vec<_>>();

        let fetched = self.get_or_fetch(request, false).await?;

        let shielded =
            request.family == CacheFamily::Summary && fetched.payload.is_total_failure();
        if fetched.origin == Origin::Cache && !shielded && needs_refresh(&fetched.payload, &in_scope)
        {
            info!(
                scope = %request.scope,
                family = request.family.as_str(),
                "Cached payload incomplete, refreshing"
            );
            return self.get_or_fetch(request, true).await;
        }

        Ok(fetched)
    }

    async fn aggregate(&self, request: &AggregationRequest, resolved: &ResolvedScope) -> Payload {
        let park_fetches = join_all(resolved.parks.iter().map(|park| self.fetch_park(park)));
        let weather_fetch = async {
            if request.family.includes_weather() {
                Some(self.fetch_weather(resolved.coords, request.units).await)
            } else {
                None
            }
        };

        let (park_results, weather_result) = tokio::join!(park_fetches, weather_fetch);

        let mut errors = Vec::new();
        let parks = park_results
            .into_iter()
            .map(|(park, token)| {
                errors.extend(token);
                park
            })
            .collect::<Vec<_>>();
        let weather = weather_result.map(|(snapshot, token)| {
            errors.extend(token);
            snapshot
        });

        debug!(
            region = %resolved.region,
            parks = parks.len(),
            errors = errors.len(),
            "Aggregated"
        );

        Payload {
            updated_at: Utc::now(),
            region: resolved.region.clone(),
            units: request.units,
            weather,
            parks,
            errors,
        }
    }

    /// A failed park contributes an empty ride list and one error token.
    async fn fetch_park(&self, park: &ParkConfig) -> (ParkRides, Option<String>) {
        match with_deadline(self.settings.upstream_timeout, self.rides.fetch_rides(park)).await {
            Ok(feed) => (
                ParkRides {
                    id: park.id,
                    name: feed.park_name.unwrap_or_else(|| park.name.clone()),
                    rides: feed.rides,
                },
                None,
            ),
            Err(e) => {
                metrics::record_upstream_error("rides");
                warn!(park_id = park.id, error = %e, "Ride fetch failed");
                (
                    ParkRides {
                        id: park.id,
                        name: park.name.clone(),
                        rides: Vec::new(),
                    },
                    Some(format!("park_{}_{}", park.id, e.token_reason())),
                )
            }
        }
    }

    async fn fetch_weather(
        &self,
        coords: Coordinates,
        units: Units,
    ) -> (WeatherSnapshot, Option<String>) {
        match with_deadline(
            self.settings.upstream_timeout,
            self.weather.fetch_weather(coords, units),
        )
        .await
        {
            Ok(snapshot) => (snapshot, None),
            Err(e) => {
                metrics::record_upstream_error("weather");
                warn!(error = %e, "Weather fetch failed");
                (
                    WeatherSnapshot::unavailable(),
                    Some(format!("weather_{}", e.token_reason())),
                )
            }
        }
    }
}

async fn with_deadline<T>(
    limit: Duration,
    fut: impl Future<Output = ParkPalResult<T>>,
) -> ParkPalResult<T> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(ParkPalError::Timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkpal_common::ParkFeed;
    use storage::{CacheTtls, DurableStore, HotCache, MemoryStore};
    use test_utils::{
        assert_error_tokens, clear_weather, feed, park, payload_with_parks, ride, FakeRides,
        FakeWeather, FlakyStore, Scripted,
    };

    const ORLANDO: [i64; 4] = [6, 7, 8, 5];

    struct Harness {
        aggregator: Aggregator,
        rides: Arc<FakeRides>,
        weather: Arc<FakeWeather>,
    }

    fn healthy_rides() -> FakeRides {
        ORLANDO.iter().fold(FakeRides::new(), |rides, id| {
            rides.with_park(*id, feed(vec![ride(id * 100, "Ride", 15), ride(id * 100 + 1, "Other", 0)]))
        })
    }

    fn harness_with(
        rides: FakeRides,
        weather: FakeWeather,
        durable: Arc<dyn DurableStore>,
        settings: AggregatorSettings,
    ) -> Harness {
        let rides = Arc::new(rides);
        let weather = Arc::new(weather);
        let cache = Arc::new(CacheStore::new(
            Arc::new(HotCache::new(64)),
            durable,
            CacheTtls::default(),
        ));
        let aggregator = Aggregator::new(
            Arc::new(ParkRegistry::builtin()),
            cache,
            rides.clone(),
            weather.clone(),
            settings,
        );
        Harness {
            aggregator,
            rides,
            weather,
        }
    }

    fn harness(rides: FakeRides, weather: FakeWeather) -> Harness {
        harness_with(
            rides,
            weather,
            Arc::new(MemoryStore::new()),
            AggregatorSettings::default(),
        )
    }

    fn orlando_summary() -> AggregationRequest {
        AggregationRequest::summary(Scope::Region("orlando".to_string()), Units::Imperial)
    }

    #[tokio::test]
    async fn test_cold_request_aggregates_then_serves_from_cache() {
        let h = harness(healthy_rides(), FakeWeather::always(clear_weather()));
        let request = orlando_summary();

        let first = h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert_eq!(first.origin, Origin::Live);
        assert_eq!(first.payload.region, "orlando");
        assert_eq!(first.payload.parks.len(), 4);
        assert_eq!(first.payload.parks[0].name, "Magic Kingdom");
        assert_eq!(first.payload.weather, Some(clear_weather()));
        assert_error_tokens!(first.payload, []);
        assert_eq!(h.rides.total_calls(), 4);
        assert_eq!(h.weather.calls(), 1);
        assert_eq!(h.weather.last_units(), Some(Units::Imperial));

        let second = h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert_eq!(second.origin, Origin::Cache);
        assert_eq!(*second.payload, *first.payload);
        assert_eq!(h.rides.total_calls(), 4);
        assert_eq!(h.weather.calls(), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let h = harness(healthy_rides(), FakeWeather::always(clear_weather()));
        let request = orlando_summary();

        h.aggregator.get_or_fetch(&request, false).await.unwrap();
        let refreshed = h.aggregator.get_or_fetch(&request, true).await.unwrap();

        assert_eq!(refreshed.origin, Origin::Live);
        assert_eq!(h.rides.total_calls(), 8);
    }

    #[tokio::test]
    async fn test_ride_failure_is_isolated() {
        let rides = healthy_rides().with_script(7, vec![Scripted::Status(500)]);
        let h = harness(rides, FakeWeather::always(clear_weather()));

        let fetched = h.aggregator.get_or_fetch(&orlando_summary(), false).await.unwrap();
        let payload = &fetched.payload;

        assert_error_tokens!(payload, ["park_7_HTTP_500"]);
        let failed = payload.park(7).unwrap();
        assert_eq!(failed.name, "Hollywood Studios");
        assert!(failed.rides.is_empty());
        for id in [6, 8, 5] {
            assert_eq!(payload.park(id).unwrap().rides.len(), 2);
        }
        assert!(!payload.is_total_failure());
    }

    #[tokio::test]
    async fn test_weather_timeout_keeps_rides() {
        let h = harness(healthy_rides(), FakeWeather::failing(Scripted::Timeout));

        let fetched = h.aggregator.get_or_fetch(&orlando_summary(), false).await.unwrap();

        assert_error_tokens!(fetched.payload, ["weather_timeout"]);
        assert_eq!(fetched.payload.weather, Some(WeatherSnapshot::unavailable()));
        assert!(fetched.payload.parks.iter().all(|p| p.rides.len() == 2));
    }

    #[tokio::test]
    async fn test_slow_weather_hits_deadline() {
        let settings = AggregatorSettings {
            upstream_timeout: Duration::from_millis(50),
            ..AggregatorSettings::default()
        };
        let h = harness_with(
            healthy_rides(),
            FakeWeather::failing(Scripted::Slow(Duration::from_secs(5), clear_weather())),
            Arc::new(MemoryStore::new()),
            settings,
        );

        let fetched = h.aggregator.get_or_fetch(&orlando_summary(), false).await.unwrap();

        assert_error_tokens!(fetched.payload, ["weather_timeout"]);
        assert!(fetched.payload.has_ride_data());
    }

    #[tokio::test]
    async fn test_error_tokens_per_failure_kind() {
        let rides = healthy_rides()
            .with_script(6, vec![Scripted::Malformed])
            .with_script(8, vec![Scripted::Timeout]);
        let h = harness(rides, FakeWeather::failing(Scripted::Status(401)));

        let fetched = h.aggregator.get_or_fetch(&orlando_summary(), false).await.unwrap();

        assert_error_tokens!(
            fetched.payload,
            ["park_6_malformed", "park_8_timeout", "weather_HTTP_401"]
        );
    }

    #[tokio::test]
    async fn test_incomplete_hit_refreshes_exactly_once() {
        let h = harness(healthy_rides(), FakeWeather::always(clear_weather()));
        let request = orlando_summary();

        // Cached while park 8 was failing
        let stale_shape = payload_with_parks(
            "orlando",
            Utc::now(),
            vec![
                park(6, "Magic Kingdom", vec![ride(1, "A", 5)]),
                park(7, "Hollywood Studios", vec![ride(2, "B", 5)]),
                park(8, "Animal Kingdom", vec![]),
                park(5, "EPCOT", vec![ride(3, "C", 5)]),
            ],
        );
        h.aggregator
            .cache()
            .put(&h.aggregator.key(&request), Arc::new(stale_shape))
            .await
            .unwrap();

        let fetched = h.aggregator.get_complete(&request, &ORLANDO).await.unwrap();

        assert_eq!(fetched.origin, Origin::Live);
        assert_eq!(h.rides.total_calls(), 4);
        assert_eq!(fetched.payload.park(8).unwrap().rides.len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_result_is_not_rechecked() {
        let rides = healthy_rides().with_script(8, vec![Scripted::Status(503)]);
        let h = harness(rides, FakeWeather::always(clear_weather()));
        let request = orlando_summary();

        h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert_eq!(h.rides.calls_for(8), 1);

        // Cached payload lacks park 8: one refresh, which still lacks it
        let fetched = h.aggregator.get_complete(&request, &ORLANDO).await.unwrap();
        assert_eq!(fetched.origin, Origin::Live);
        assert_eq!(h.rides.calls_for(8), 2);
        assert_error_tokens!(fetched.payload, ["park_8_HTTP_503"]);
    }

    #[tokio::test]
    async fn test_complete_hit_is_served_from_cache() {
        let h = harness(healthy_rides(), FakeWeather::always(clear_weather()));
        let request = orlando_summary();

        h.aggregator.get_or_fetch(&request, false).await.unwrap();
        let fetched = h.aggregator.get_complete(&request, &[6, 7]).await.unwrap();

        assert_eq!(fetched.origin, Origin::Cache);
        assert_eq!(h.rides.total_calls(), 4);
    }

    #[tokio::test]
    async fn test_ids_outside_scope_do_not_force_refresh() {
        let h = harness(healthy_rides(), FakeWeather::always(clear_weather()));
        let request = orlando_summary();

        let first = h.aggregator.get_complete(&request, &[6, 999]).await.unwrap();
        assert_eq!(first.origin, Origin::Live);

        for ids in [&[6, 999][..], &[6, 274][..], &[999][..]] {
            let fetched = h.aggregator.get_complete(&request, ids).await.unwrap();
            assert_eq!(fetched.origin, Origin::Cache);
        }
        assert_eq!(h.rides.total_calls(), 4);
        assert_eq!(h.rides.calls_for(274), 0);
    }

    #[tokio::test]
    async fn test_upstream_park_name_wins() {
        let rides = FakeRides::new()
            .with_park(
                275,
                ParkFeed {
                    park_name: Some("Tokyo DisneySea (upstream)".to_string()),
                    rides: vec![ride(1, "Soaring", 60)],
                },
            )
            .with_script(274, vec![Scripted::Status(500)]);
        let h = harness(rides, FakeWeather::always(clear_weather()));
        let request = AggregationRequest::catalog(Scope::Region("tokyo".to_string()));

        let fetched = h.aggregator.get_or_fetch(&request, false).await.unwrap();

        assert_eq!(fetched.payload.park(275).unwrap().name, "Tokyo DisneySea (upstream)");
        // Failed parks keep the registry name
        assert_eq!(fetched.payload.park(274).unwrap().name, "Tokyo Disneyland");
    }

    fn total_failure_harness(cache_total_failures: bool) -> Harness {
        let rides = ORLANDO.iter().fold(FakeRides::new(), |rides, id| {
            rides.with_script(*id, vec![Scripted::Status(502)])
        });
        let settings = AggregatorSettings {
            cache_total_failures,
            ..AggregatorSettings::default()
        };
        harness_with(
            rides,
            FakeWeather::failing(Scripted::Timeout),
            Arc::new(MemoryStore::new()),
            settings,
        )
    }

    #[tokio::test]
    async fn test_total_failure_cached_when_enabled() {
        let h = total_failure_harness(true);
        let request = orlando_summary();

        let fetched = h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert!(fetched.payload.is_total_failure());
        assert_eq!(fetched.payload.errors.len(), 5);

        let cached = h.aggregator.cached(&request).await;
        assert!(cached.is_some_and(|p| p.is_total_failure()));

        // Served from cache, not refreshed by the completeness check
        let again = h.aggregator.get_complete(&request, &ORLANDO).await.unwrap();
        assert_eq!(again.origin, Origin::Cache);
        assert_eq!(h.rides.total_calls(), 4);
    }

    #[tokio::test]
    async fn test_cached_catalog_total_failure_is_refreshed_once() {
        let h = total_failure_harness(true);
        let request = AggregationRequest::catalog(Scope::Region("orlando".to_string()));

        h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert!(h.aggregator.cached(&request).await.is_some());

        let again = h.aggregator.get_complete(&request, &ORLANDO).await.unwrap();
        assert_eq!(again.origin, Origin::Live);
        assert!(again.payload.is_total_failure());
        assert_eq!(h.rides.total_calls(), 8);
    }

    #[tokio::test]
    async fn test_total_failure_not_cached_when_disabled() {
        let h = total_failure_harness(false);
        let request = orlando_summary();

        let fetched = h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert!(fetched.payload.is_total_failure());
        assert!(h.aggregator.cached(&request).await.is_none());

        h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert_eq!(h.rides.total_calls(), 8);
    }

    #[tokio::test]
    async fn test_durable_write_failure_does_not_fail_request() {
        let store = Arc::new(FlakyStore::failing_writes());
        let h = harness_with(
            healthy_rides(),
            FakeWeather::always(clear_weather()),
            store.clone(),
            AggregatorSettings::default(),
        );
        let request = orlando_summary();

        let fetched = h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert_eq!(fetched.origin, Origin::Live);
        assert_eq!(store.stores(), 1);

        // Hot tier still holds the payload
        let again = h.aggregator.get_or_fetch(&request, false).await.unwrap();
        assert_eq!(again.origin, Origin::Cache);
        assert_eq!(h.rides.total_calls(), 4);
    }

    #[tokio::test]
    async fn test_unavailable_durable_tier_still_aggregates() {
        let h = harness_with(
            healthy_rides(),
            FakeWeather::always(clear_weather()),
            Arc::new(FlakyStore::unavailable()),
            AggregatorSettings::default(),
        );

        let fetched = h.aggregator.get_or_fetch(&orlando_summary(), false).await.unwrap();
        assert_eq!(fetched.origin, Origin::Live);
        assert!(fetched.payload.has_ride_data());
    }

    #[tokio::test]
    async fn test_catalog_skips_weather() {
        let h = harness(healthy_rides(), FakeWeather::always(clear_weather()));
        let request = AggregationRequest::catalog(Scope::Region("orlando".to_string()));

        let fetched = h.aggregator.get_or_fetch(&request, false).await.unwrap();

        assert!(fetched.payload.weather.is_none());
        assert_eq!(fetched.payload.units, Units::Metric);
        assert_eq!(h.weather.calls(), 0);
        assert_eq!(
            h.aggregator.key(&request).to_string(),
            "parkpal:v1:catalog:region=orlando:units=metric"
        );
    }

    #[tokio::test]
    async fn test_park_scope_fetches_one_park() {
        let rides = FakeRides::new().with_park(275, feed(vec![ride(1, "Soaring", 60)]));
        let h = harness(rides, FakeWeather::always(clear_weather()));
        let request = AggregationRequest::summary(Scope::Park(275), Units::Metric);

        let fetched = h.aggregator.get_or_fetch(&request, false).await.unwrap();

        assert_eq!(fetched.payload.region, "tokyo");
        assert_eq!(fetched.payload.parks.len(), 1);
        assert_eq!(fetched.payload.parks[0].name, "Tokyo DisneySea");
        assert_eq!(h.rides.calls_for(275), 1);
        assert_eq!(h.rides.total_calls(), 1);
        assert_eq!(h.weather.last_units(), Some(Units::Metric));
        assert_eq!(
            h.aggregator.key(&request).to_string(),
            "parkpal:v1:summary:park=275:units=metric"
        );
    }

    #[tokio::test]
    async fn test_unknown_scope_is_an_error() {
        let h = harness(healthy_rides(), FakeWeather::always(clear_weather()));

        let err = h
            .aggregator
            .get_or_fetch(
                &AggregationRequest::summary(Scope::Region("paris".to_string()), Units::Metric),
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ParkPalError::RegionNotFound(_)));

        let err = h
            .aggregator
            .get_or_fetch(&AggregationRequest::summary(Scope::Park(1), Units::Metric), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ParkPalError::ParkNotFound(1)));
        assert_eq!(h.rides.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_cold_requests_both_aggregate() {
        let rides = ORLANDO.iter().fold(FakeRides::new(), |rides, id| {
            rides.with_script(
                *id,
                vec![Scripted::Slow(Duration::from_millis(20), feed(vec![ride(*id, "R", 1)]))],
            )
        });
        let h = harness(rides, FakeWeather::always(clear_weather()));
        let request = orlando_summary();

        let (a, b) = tokio::join!(
            h.aggregator.get_or_fetch(&request, false),
            h.aggregator.get_or_fetch(&request, false)
        );

        assert_eq!(a.unwrap().origin, Origin::Live);
        assert_eq!(b.unwrap().origin, Origin::Live);
        assert_eq!(h.rides.total_calls(), 8);
        assert!(h.aggregator.cached(&request).await.is_some());
    }
}
