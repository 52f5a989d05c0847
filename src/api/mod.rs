pub mod geocoder;
pub mod overpass;

use anyhow::Result;

use crate::domain::{Coordinate, RawPoiRecord};

pub use geocoder::{HttpGeocoder, geocode_query};
pub use overpass::{OverpassPoiSource, OverpassResponse, build_query};

/// Resolves a (city, address) pair to one best-guess coordinate
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the provider has no match, `Err` on provider faults.
    /// Callers pass non-blank, trimmed input.
    fn resolve(&self, city: &str, address: &str) -> Result<Option<Coordinate>>;
}

/// Retrieves bakeries within a radius of a coordinate
pub trait PoiSource: Send + Sync {
    /// Records in provider order; `Err` on provider faults.
    fn fetch_bakeries(&self, center: Coordinate, radius_m: f64) -> Result<Vec<RawPoiRecord>>;
}
