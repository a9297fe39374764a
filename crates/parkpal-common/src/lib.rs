//! Common types and utilities shared across all ParkPal crates.

pub mod error;
pub mod payload;
pub mod registry;
pub mod rides;

pub use error::{ParkPalError, ParkPalResult};
pub use payload::{ParkRides, Payload, RideRecord, Units, WeatherSnapshot};
pub use registry::{Coordinates, Destination, ParkConfig, ParkRegistry, ResolvedScope, Scope};
pub use rides::{ParkFeed, RideFeed};
