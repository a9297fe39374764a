//! Prometheus counters and gauges.
//!
//! Recorded through the `metrics` facade; the exporter installed in `main`
//! renders them at `/metrics`. Without an installed recorder every call is a
//! no-op, which keeps tests free of global state.

use metrics::{counter, gauge};
use storage::{CacheFamily, HotCacheStatsSnapshot};

/// Record the outcome of a cache read for one family.
pub fn record_cache_lookup(family: CacheFamily, hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!(
        "parkpal_cache_lookups_total",
        "family" => family.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a live aggregation.
pub fn record_aggregation(family: CacheFamily) {
    counter!("parkpal_aggregations_total", "family" => family.as_str()).increment(1);
}

/// Record a failed upstream call (`rides` or `weather`).
pub fn record_upstream_error(upstream: &'static str) {
    counter!("parkpal_upstream_errors_total", "upstream" => upstream).increment(1);
}

/// Record a durable-tier write that did not go through.
pub fn record_cache_write_failure() {
    counter!("parkpal_cache_write_failures_total").increment(1);
}

/// Mirror hot tier statistics into gauges.
pub fn record_hot_cache_stats(stats: &HotCacheStatsSnapshot) {
    gauge!("parkpal_hot_cache_hits").set(stats.hits as f64);
    gauge!("parkpal_hot_cache_misses").set(stats.misses as f64);
    gauge!("parkpal_hot_cache_expired").set(stats.expired as f64);
    gauge!("parkpal_hot_cache_evictions").set(stats.evictions as f64);
    gauge!("parkpal_hot_cache_entries").set(stats.entry_count as f64);
    gauge!("parkpal_hot_cache_hit_rate_percent").set(stats.hit_rate());
}
