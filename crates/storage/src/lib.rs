//! Storage abstractions for ParkPal services.
//!
//! Provides:
//! - A process-local hot tier (LRU, explicit expiry per entry)
//! - Durable tiers: Redis, or an in-memory map for development and tests
//! - [`CacheStore`], the two-tier store that recomputes freshness from the
//!   payload's own `updated_at` on every durable read

pub mod durable;
pub mod hot;
pub mod key;
pub mod tiered;

pub use durable::{DurableStore, MemoryStore, RedisStore};
pub use hot::{HotCache, HotCacheStats, HotCacheStatsSnapshot};
pub use key::{CacheFamily, CacheKey};
pub use tiered::{CacheStore, CacheTtls};
