//! Cache keys shared by both tiers.

use std::fmt;

use parkpal_common::{Scope, Units};

const NAMESPACE: &str = "parkpal";

/// Cache families differ in how long their payloads stay fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheFamily {
    /// Ride waits plus weather; changes minute to minute.
    Summary,
    /// Ride ids and names; changes rarely.
    Catalog,
}

impl CacheFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheFamily::Summary => "summary",
            CacheFamily::Catalog => "catalog",
        }
    }

    /// Whether aggregations for this family fetch weather.
    pub fn includes_weather(&self) -> bool {
        matches!(self, CacheFamily::Summary)
    }
}

/// Deterministic key, identical in the hot and durable tiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub version: String,
    pub family: CacheFamily,
    pub scope: Scope,
    pub units: Units,
}

impl CacheKey {
    pub fn new(version: impl Into<String>, family: CacheFamily, scope: Scope, units: Units) -> Self {
        Self {
            version: version.into(),
            family,
            scope,
            units,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:units={}",
            NAMESPACE,
            self.version,
            self.family.as_str(),
            self.scope,
            self.units
        )
    }
}
