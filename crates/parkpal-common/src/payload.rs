//! Aggregation payload: the JSON shape that is cached and served.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement system requested from the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    #[default]
    Imperial,
}

impl Units {
    /// Lenient parse used for request input: anything starting with `m`
    /// (case-insensitive) is metric, everything else is imperial.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().to_ascii_lowercase().starts_with('m') => Units::Metric,
            _ => Units::Imperial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current conditions at a destination.
///
/// The shape never changes: a failed fetch yields [`WeatherSnapshot::unavailable`]
/// rather than `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeatherSnapshot {
    pub temp: i64,
    pub desc: String,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

impl WeatherSnapshot {
    /// Zero-valued snapshot used when the weather fetch fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Whether this snapshot carries real observations.
    ///
    /// A temperature of zero is a legitimate reading, so usability is judged
    /// on the description and solar times instead.
    pub fn is_usable(&self) -> bool {
        !self.desc.is_empty() || self.sunrise.is_some() || self.sunset.is_some()
    }
}

/// A single attraction with its current wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRecord {
    pub id: i64,
    pub name: String,
    pub is_open: bool,
    pub wait_time: u32,
}

/// Rides for one park.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkRides {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub rides: Vec<RideRecord>,
}

/// Result of one live aggregation.
///
/// Immutable once written to cache; a newer aggregation supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub updated_at: DateTime<Utc>,
    pub region: String,
    pub units: Units,
    pub weather: Option<WeatherSnapshot>,
    pub parks: Vec<ParkRides>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Payload {
    /// Look up a park by id.
    pub fn park(&self, id: i64) -> Option<&ParkRides> {
        self.parks.iter().find(|p| p.id == id)
    }

    /// True if at least one park has ride data.
    pub fn has_ride_data(&self) -> bool {
        self.parks.iter().any(|p| !p.rides.is_empty())
    }

    /// True if weather is present and not the zero fallback.
    pub fn has_usable_weather(&self) -> bool {
        self.weather.as_ref().is_some_and(WeatherSnapshot::is_usable)
    }

    /// No ride data, no usable weather, and at least one recorded error.
    pub fn is_total_failure(&self) -> bool {
        !self.has_ride_data() && !self.has_usable_weather() && !self.errors.is_empty()
    }

    /// Instant after which this payload must no longer be served.
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.updated_at + ttl
    }

    /// Whether the payload is still fresh at `now` for the given TTL.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now < self.expires_at(ttl)
    }

    /// Whole seconds elapsed since `updated_at`, clamped at zero.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_seconds().max(0)
    }
}
