//! Park registry: destinations, their parks, and where to fetch them.
//!
//! Loaded once at startup, either from the built-in table or from a YAML
//! file with the same shape:
//!
//! ```yaml
//! destinations:
//!   - id: orlando
//!     name: Walt Disney World
//!     coords: { lat: 28.3772, lon: -81.5707 }
//!     parks:
//!       - { id: 6, name: Magic Kingdom, url: "https://queue-times.com/parks/6/queue_times.json" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{ParkPalError, ParkPalResult};

const QUEUE_TIMES: &str = "queue-times";

/// Latitude/longitude pair used for weather lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A single park and its wait-time source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkConfig {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub url: String,
}

fn default_provider() -> String {
    QUEUE_TIMES.to_string()
}

/// A resort destination grouping several parks under one weather location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub coords: Coordinates,
    pub parks: Vec<ParkConfig>,
}

impl Destination {
    pub fn park_ids(&self) -> Vec<i64> {
        self.parks.iter().map(|p| p.id).collect()
    }
}

/// What a single aggregation covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every park of a destination.
    Region(String),
    /// One park.
    Park(i64),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Region(region) => write!(f, "region={}", region),
            Scope::Park(id) => write!(f, "park={}", id),
        }
    }
}

/// A scope resolved against the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScope {
    pub region: String,
    pub coords: Coordinates,
    pub parks: Vec<ParkConfig>,
}

/// Data-driven registry of destinations and parks.
///
/// Always holds at least one destination with unique region and park ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkRegistry {
    destinations: Vec<Destination>,
}

#[derive(Deserialize)]
struct RegistryFile {
    destinations: Vec<Destination>,
}

impl Default for ParkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ParkRegistry {
    /// Build a registry, rejecting empty or ambiguous tables.
    pub fn new(destinations: Vec<Destination>) -> ParkPalResult<Self> {
        let registry = Self { destinations };
        registry.validate()?;
        Ok(registry)
    }

    /// The built-in destination table.
    pub fn builtin() -> Self {
        fn park(id: i64, name: &str) -> ParkConfig {
            ParkConfig {
                id,
                name: name.to_string(),
                provider: QUEUE_TIMES.to_string(),
                url: format!("https://queue-times.com/parks/{}/queue_times.json", id),
            }
        }

        Self {
            destinations: vec![
                Destination {
                    id: "orlando".to_string(),
                    name: "Walt Disney World".to_string(),
                    coords: Coordinates {
                        lat: 28.3772,
                        lon: -81.5707,
                    },
                    parks: vec![
                        park(6, "Magic Kingdom"),
                        park(7, "Hollywood Studios"),
                        park(8, "Animal Kingdom"),
                        park(5, "EPCOT"),
                    ],
                },
                Destination {
                    id: "tokyo".to_string(),
                    name: "Tokyo Disney Resort".to_string(),
                    coords: Coordinates {
                        lat: 35.6329,
                        lon: 139.8804,
                    },
                    parks: vec![park(274, "Tokyo Disneyland"), park(275, "Tokyo DisneySea")],
                },
                Destination {
                    id: "california".to_string(),
                    name: "Disneyland Resort".to_string(),
                    coords: Coordinates {
                        lat: 33.8121,
                        lon: -117.9190,
                    },
                    parks: vec![park(16, "Disneyland"), park(17, "Disney California Adventure")],
                },
            ],
        }
    }

    /// Parse a registry from YAML (JSON is accepted too).
    pub fn from_yaml_str(content: &str) -> ParkPalResult<Self> {
        let file: RegistryFile = serde_yaml::from_str(content)?;
        Self::new(file.destinations)
    }

    /// Load a registry file.
    pub fn load_from_file(path: impl AsRef<Path>) -> ParkPalResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ParkPalError::Config(format!("Failed to read registry {:?}: {}", path, e))
        })?;
        let registry = Self::from_yaml_str(&content)?;

        tracing::info!(
            destinations = registry.destinations.len(),
            path = %path.display(),
            "Loaded park registry"
        );
        Ok(registry)
    }

    fn validate(&self) -> ParkPalResult<()> {
        if self.destinations.is_empty() {
            return Err(ParkPalError::Config("registry has no destinations".to_string()));
        }

        let mut regions = HashSet::new();
        let mut parks = HashSet::new();
        for dest in &self.destinations {
            if !regions.insert(dest.id.as_str()) {
                return Err(ParkPalError::Config(format!("duplicate region id: {}", dest.id)));
            }
            if dest.parks.is_empty() {
                return Err(ParkPalError::Config(format!("region {} has no parks", dest.id)));
            }
            for park in &dest.parks {
                if !parks.insert(park.id) {
                    return Err(ParkPalError::Config(format!("duplicate park id: {}", park.id)));
                }
            }
        }
        Ok(())
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// The fallback destination: the first one listed.
    pub fn default_region(&self) -> &Destination {
        // validate() guarantees at least one destination
        &self.destinations[0]
    }

    /// Find a destination by id (case-insensitive).
    pub fn region(&self, id: &str) -> Option<&Destination> {
        self.destinations
            .iter()
            .find(|d| d.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Resolve a requested region, falling back to the default one.
    pub fn region_or_default(&self, id: Option<&str>) -> &Destination {
        id.and_then(|id| self.region(id))
            .unwrap_or_else(|| self.default_region())
    }

    /// Find a park and the destination it belongs to.
    pub fn park(&self, id: i64) -> Option<(&Destination, &ParkConfig)> {
        self.destinations.iter().find_map(|d| {
            d.parks.iter().find(|p| p.id == id).map(|p| (d, p))
        })
    }

    pub fn contains_park(&self, id: i64) -> bool {
        self.park(id).is_some()
    }

    /// Destination that owns a park, or the default destination.
    pub fn region_for_park(&self, id: i64) -> &Destination {
        self.park(id)
            .map(|(d, _)| d)
            .unwrap_or_else(|| self.default_region())
    }

    /// Display name for a park, `Park {id}` when unknown.
    pub fn park_name(&self, id: i64) -> String {
        self.park(id)
            .map(|(_, p)| p.name.clone())
            .unwrap_or_else(|| format!("Park {}", id))
    }

    /// Resolve a scope into the parks and coordinates it covers.
    pub fn resolve(&self, scope: &Scope) -> ParkPalResult<ResolvedScope> {
        match scope {
            Scope::Region(region) => {
                let dest = self
                    .region(region)
                    .ok_or_else(|| ParkPalError::RegionNotFound(region.clone()))?;
                Ok(ResolvedScope {
                    region: dest.id.clone(),
                    coords: dest.coords,
                    parks: dest.parks.clone(),
                })
            }
            Scope::Park(id) => {
                let (dest, park) = self.park(*id).ok_or(ParkPalError::ParkNotFound(*id))?;
                Ok(ResolvedScope {
                    region: dest.id.clone(),
                    coords: dest.coords,
                    parks: vec![park.clone()],
                })
            }
        }
    }
}
