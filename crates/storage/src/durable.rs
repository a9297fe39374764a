//! Durable (shared) cache tier.
//!
//! Stores serialized payloads under the versioned cache key. The tier's own
//! expiry only bounds retention; freshness is always recomputed from the
//! payload's `updated_at` by [`CacheStore`](crate::CacheStore).

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use parkpal_common::{ParkPalError, ParkPalResult};

/// Key/value backend for the durable tier.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch the raw serialized value for a key.
    async fn load(&self, key: &str) -> ParkPalResult<Option<String>>;

    /// Store a serialized value, retained for at most `retention`.
    async fn store(&self, key: &str, value: String, retention: Duration) -> ParkPalResult<()>;

    /// Short backend name for logs and status output.
    fn backend_name(&self) -> &'static str;
}

/// Redis-backed durable tier.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> ParkPalResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| ParkPalError::CacheError(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ParkPalError::CacheError(format!("Redis connection failed: {}", e)))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl DurableStore for RedisStore {
    async fn load(&self, key: &str) -> ParkPalResult<Option<String>> {
        // Multiplexed connections are cheap to clone and share one socket
        let mut conn = self.conn.clone();

        conn.get(key)
            .await
            .map_err(|e| ParkPalError::CacheError(format!("Cache get failed: {}", e)))
    }

    async fn store(&self, key: &str, value: String, retention: Duration) -> ParkPalResult<()> {
        let mut conn = self.conn.clone();
        let seconds = retention.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| ParkPalError::CacheError(format!("Cache set failed: {}", e)))
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// In-memory durable tier for development setups without Redis.
///
/// Retention is not enforced; freshness checks in the store make stale
/// entries unreachable anyway.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load(&self, key: &str) -> ParkPalResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: String, _retention: Duration) -> ParkPalResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
