//! Upstream provider clients.
//!
//! Each fetch is a single bounded-timeout HTTP GET, normalized into
//! ParkPal types. Failures come back as [`ParkPalError`] values
//! (`Timeout`, `UpstreamStatus`, `MalformedResponse`, `UpstreamTransport`)
//! so callers can turn them into payload error tokens.
//!
//! [`ParkPalError`]: parkpal_common::ParkPalError

pub mod client;
pub mod rides;
pub mod weather;

pub use client::{HttpClient, UpstreamConfig};
pub use rides::{QueueTimesClient, RideSource};
pub use weather::{OpenWeatherClient, WeatherSource};
