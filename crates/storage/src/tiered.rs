//! Two-tier payload cache.
//!
//! ```text
//! get:  hot tier ──hit──▶ return
//!         │ miss/expired (evict)
//!         ▼
//!       durable tier ──absent / corrupt / stale──▶ None
//!         │ fresh (updated_at + TTL > now)
//!         ▼
//!       promote to hot tier, return
//!
//! put:  hot tier (expires now + TTL), then durable tier (best effort)
//! ```
//!
//! Freshness of durable entries is derived from the payload's `updated_at`,
//! never from the backend's own expiry, so every reader applies the same
//! staleness rule whichever tier served it.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use parkpal_common::{ParkPalError, ParkPalResult, Payload};

use crate::durable::DurableStore;
use crate::hot::HotCache;
use crate::key::{CacheFamily, CacheKey};

/// Time-to-live per cache family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub summary: Duration,
    pub catalog: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            summary: Duration::seconds(1800),
            catalog: Duration::seconds(86_400),
        }
    }
}

impl CacheTtls {
    pub fn for_family(&self, family: CacheFamily) -> Duration {
        match family {
            CacheFamily::Summary => self.summary,
            CacheFamily::Catalog => self.catalog,
        }
    }
}

/// Hot tier in front of a durable tier.
pub struct CacheStore {
    hot: Arc<HotCache>,
    durable: Arc<dyn DurableStore>,
    ttls: CacheTtls,
}

impl CacheStore {
    pub fn new(hot: Arc<HotCache>, durable: Arc<dyn DurableStore>, ttls: CacheTtls) -> Self {
        Self { hot, durable, ttls }
    }

    pub fn hot(&self) -> &HotCache {
        &self.hot
    }

    pub fn durable_backend(&self) -> &'static str {
        self.durable.backend_name()
    }

    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// Get a fresh payload, or `None`.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Payload>> {
        self.get_at(key, Utc::now()).await
    }

    /// [`get`](Self::get) evaluated at an explicit instant.
    pub async fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Arc<Payload>> {
        let key_str = key.to_string();

        if let Some(payload) = self.hot.get(&key_str, now).await {
            debug!(key = %key_str, tier = "hot", "Cache hit");
            return Some(payload);
        }

        let raw = match self.durable.load(&key_str).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key_str, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key_str, error = %e, "Durable tier read failed, treating as miss");
                return None;
            }
        };

        let payload = match decode(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key_str, error = %e, "Ignoring corrupt cache entry");
                return None;
            }
        };

        let ttl = self.ttls.for_family(key.family);
        if !payload.is_fresh_at(now, ttl) {
            // Left in place; the durable copy ages out on its own
            debug!(
                key = %key_str,
                updated_at = %payload.updated_at,
                "Durable entry is stale"
            );
            return None;
        }

        let payload = Arc::new(payload);
        self.hot
            .insert(&key_str, Arc::clone(&payload), payload.expires_at(ttl))
            .await;
        debug!(key = %key_str, tier = "durable", "Cache hit, promoted to hot tier");
        Some(payload)
    }

    /// Write a payload to both tiers.
    ///
    /// The hot tier is always updated. A durable-tier failure is returned so
    /// the caller can observe it; it must never fail the request that
    /// produced the payload.
    pub async fn put(&self, key: &CacheKey, payload: Arc<Payload>) -> ParkPalResult<()> {
        self.put_at(key, payload, Utc::now()).await
    }

    /// [`put`](Self::put) evaluated at an explicit instant.
    pub async fn put_at(
        &self,
        key: &CacheKey,
        payload: Arc<Payload>,
        now: DateTime<Utc>,
    ) -> ParkPalResult<()> {
        let key_str = key.to_string();
        let ttl = self.ttls.for_family(key.family);

        let serialized = serde_json::to_string(payload.as_ref())?;
        self.hot.insert(&key_str, payload, now + ttl).await;

        let retention = ttl.to_std().unwrap_or_default();
        self.durable.store(&key_str, serialized, retention).await
    }
}

fn decode(raw: &str) -> ParkPalResult<Payload> {
    serde_json::from_str(raw).map_err(|e| ParkPalError::CacheCorrupt(e.to_string()))
}
