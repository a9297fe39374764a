//! In-process hot tier for aggregated payloads.
//!
//! Sits in front of the durable tier so warm processes answer without a
//! network round trip. One instance lives for the whole process and is
//! handed to [`CacheStore`](crate::CacheStore); entries are only ever
//! overwritten, evicted by LRU pressure, or dropped lazily once expired.
//!
//! ## Metrics
//!
//! Hits, misses, lazy expirations, LRU evictions and the current entry
//! count are tracked as atomics for the status endpoint.

use chrono::{DateTime, Utc};
use lru::LruCache;
use parkpal_common::Payload;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local LRU cache of payloads with an explicit expiry per entry.
///
/// Design considerations:
/// - RwLock guards the map; overwrites are last-writer-wins
/// - TTL enforcement on read (lazy expiration)
/// - Entry-count bound with LRU eviction (payloads are small and uniform)
pub struct HotCache {
    cache: RwLock<LruCache<String, HotEntry>>,
    stats: Arc<HotCacheStats>,
}

struct HotEntry {
    payload: Arc<Payload>,
    expires_at: DateTime<Utc>,
}

impl HotEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Statistics for the hot tier.
///
/// All fields are atomic for lock-free reads from the status endpoint.
#[derive(Default)]
pub struct HotCacheStats {
    /// Total cache hits
    pub hits: AtomicU64,
    /// Total cache misses (expired entries count as misses)
    pub misses: AtomicU64,
    /// Total entries dropped because they expired
    pub expired: AtomicU64,
    /// Total entries evicted by LRU pressure
    pub evictions: AtomicU64,
    /// Current number of entries
    pub entry_count: AtomicU64,
}

/// Point-in-time copy of [`HotCacheStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HotCacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub evictions: u64,
    pub entry_count: u64,
}

impl HotCacheStatsSnapshot {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl HotCache {
    /// Create a hot tier holding at most `max_entries` payloads.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            stats: Arc::new(HotCacheStats::default()),
        }
    }

    /// Get a payload that has not expired at `now`.
    ///
    /// An expired entry is removed and reported as a miss.
    pub async fn get(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<Payload>> {
        // LruCache::get updates recency, so even reads need the write lock
        let mut cache = self.cache.write().await;

        let expired = match cache.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.payload));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            cache.pop(key);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
            self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
            debug!(key = %key, "Hot tier entry expired");
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a payload until `expires_at`, replacing any previous entry.
    pub async fn insert(&self, key: &str, payload: Arc<Payload>, expires_at: DateTime<Utc>) {
        let mut cache = self.cache.write().await;

        let entry = HotEntry {
            payload,
            expires_at,
        };

        if cache.contains(key) {
            // Replacement: count unchanged
            cache.put(key.to_string(), entry);
            return;
        }

        // New key: push hands back the displaced LRU entry when at capacity
        match cache.push(key.to_string(), entry) {
            Some((evicted_key, _)) => {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %evicted_key, "Hot tier LRU eviction");
            }
            None => {
                self.stats.entry_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get current statistics.
    pub fn stats(&self) -> HotCacheStatsSnapshot {
        HotCacheStatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            expired: self.stats.expired.load(Ordering::Relaxed),
            evictions: self.stats.evictions.load(Ordering::Relaxed),
            entry_count: self.stats.entry_count.load(Ordering::Relaxed),
        }
    }

    /// Current number of entries in cache.
    pub fn len(&self) -> usize {
        self.stats.entry_count.load(Ordering::Relaxed) as usize
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
