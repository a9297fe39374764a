//! Application state for the ParkPal API.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{info, warn};

use parkpal_common::ParkRegistry;
use storage::{CacheStore, DurableStore, HotCache, MemoryStore, RedisStore};
use upstream::{HttpClient, OpenWeatherClient, QueueTimesClient, RideSource, WeatherSource};

use crate::aggregator::{Aggregator, AggregatorSettings};
use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    pub config: ServiceConfig,

    /// Destinations and parks, loaded once.
    pub registry: Arc<ParkRegistry>,

    /// Two-tier payload cache.
    pub cache: Arc<CacheStore>,

    pub aggregator: Aggregator,

    /// Renders `/metrics`; absent when no recorder was installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from configuration, connecting to Redis when configured.
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let registry = match &config.registry {
            Some(path) => ParkRegistry::load_from_file(path)
                .with_context(|| format!("Failed to load park registry from {:?}", path))?,
            None => ParkRegistry::builtin(),
        };

        let durable: Arc<dyn DurableStore> = match &config.redis_url {
            Some(url) => {
                let store = RedisStore::connect(url)
                    .await
                    .context("Failed to connect to durable cache tier")?;
                info!("Durable cache tier: redis");
                Arc::new(store)
            }
            None => {
                warn!("REDIS_URL not set, durable cache tier is in-memory");
                Arc::new(MemoryStore::new())
            }
        };

        if config.owm_api_key.is_empty() {
            warn!("OWM_API_KEY not set, weather calls will be rejected upstream");
        }

        let http = HttpClient::new(&config.upstream_config())?;
        let rides = Arc::new(QueueTimesClient::new(http.clone()));
        let weather = Arc::new(OpenWeatherClient::new(
            http,
            config.weather_base_url.clone(),
            config.owm_api_key.clone(),
        ));

        Ok(Self::from_parts(config, registry, durable, rides, weather))
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        config: ServiceConfig,
        registry: ParkRegistry,
        durable: Arc<dyn DurableStore>,
        rides: Arc<dyn RideSource>,
        weather: Arc<dyn WeatherSource>,
    ) -> Self {
        let registry = Arc::new(registry);
        let cache = Arc::new(CacheStore::new(
            Arc::new(HotCache::new(config.hot_cache_entries)),
            durable,
            config.cache_ttls(),
        ));
        let aggregator = Aggregator::new(
            Arc::clone(&registry),
            Arc::clone(&cache),
            rides,
            weather,
            AggregatorSettings::from(&config),
        );

        Self {
            config,
            registry,
            cache,
            aggregator,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
