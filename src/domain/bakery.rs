use serde::Serialize;
use std::collections::HashMap;

use super::Coordinate;

/// A shop as it came back from the POI provider, tags untouched
#[derive(Debug, Clone)]
pub struct RawPoiRecord {
    pub coordinate: Coordinate,
    pub tags: HashMap<String, String>,
}

impl RawPoiRecord {
    pub fn new(coordinate: Coordinate, tags: HashMap<String, String>) -> Self {
        Self { coordinate, tags }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// A normalized bakery, ready to be returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BakeryRecord {
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    /// Great-circle distance from the search center, 0 until ranked
    pub distance_meters: f64,
}

impl BakeryRecord {
    pub fn with_distance(self, distance_meters: f64) -> Self {
        Self {
            distance_meters,
            ..self
        }
    }
}

/// Payload of one search: the resolved center and bakeries sorted by distance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub search_center: Coordinate,
    pub bakeries: Vec<BakeryRecord>,
    pub source_label: String,
}
