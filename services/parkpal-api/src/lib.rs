//! ParkPal API Service Library
//!
//! Aggregates theme-park ride waits and weather behind a two-tier cache and
//! serves them over HTTP.

pub mod aggregator;
pub mod app;
pub mod completeness;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod state;

pub use aggregator::{AggregationRequest, Aggregator, AggregatorSettings, Fetched, Origin};
pub use app::router;
pub use config::ServiceConfig;
pub use state::AppState;
