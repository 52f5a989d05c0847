use serde::{Deserialize, Serialize};

/// A WGS84 point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a coordinate only if both components are finite and in range
    pub fn checked(lat: f64, lon: f64) -> Option<Self> {
        let coordinate = Self::new(lat, lon);
        coordinate.is_valid().then_some(coordinate)
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}
