use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::PoiSource;
use crate::config::OverpassConfig;
use crate::domain::{Coordinate, RawPoiRecord};

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A single element from Overpass: a node with `lat`/`lon` or a way with `center`
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
}

#[derive(Debug, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Element {
    fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Coordinate::checked(lat, lon),
            (_, _, Some(center)) => Coordinate::checked(center.lat, center.lon),
            _ => None,
        }
    }
}

/// Overpass QL for shop=bakery nodes and ways within `radius_m` of `center`
///
/// `f64` Display always uses '.' as the decimal separator.
pub fn build_query(center: Coordinate, radius_m: f64, server_timeout_secs: u64) -> String {
    let around = format!("(around:{},{},{})", radius_m, center.lat, center.lon);
    format!(
        r#"[out:json][timeout:{timeout}];(node["shop"="bakery"]{around};way["shop"="bakery"]{around};);out center;"#,
        timeout = server_timeout_secs,
        around = around
    )
}

/// Convert elements to raw records in provider order
///
/// Elements without a usable coordinate are dropped.
pub fn into_records(response: OverpassResponse) -> Vec<RawPoiRecord> {
    response
        .elements
        .into_iter()
        .filter_map(|element| {
            let Some(coordinate) = element.coordinate() else {
                tracing::debug!(
                    kind = %element.type_,
                    id = element.id,
                    "skipping element without coordinates"
                );
                return None;
            };
            Some(RawPoiRecord::new(coordinate, element.tags.unwrap_or_default()))
        })
        .collect()
}

/// POI source backed by an Overpass API interpreter endpoint
pub struct OverpassPoiSource {
    client: reqwest::blocking::Client,
    config: OverpassConfig,
}

impl OverpassPoiSource {
    pub fn new(config: OverpassConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }
}

impl PoiSource for OverpassPoiSource {
    fn fetch_bakeries(&self, center: Coordinate, radius_m: f64) -> Result<Vec<RawPoiRecord>> {
        let query = build_query(center, radius_m, self.config.server_timeout_secs);

        // Overpass expects form-encoded POST data: data=<query>
        let response = self
            .client
            .post(&self.config.url)
            .form(&[("data", query.as_str())])
            .send()
            .context("Failed to send request to Overpass API")?;

        if !response.status().is_success() {
            bail!("Overpass API returned error status: {}", response.status());
        }

        let body: OverpassResponse = response
            .json()
            .context("Failed to parse Overpass JSON response")?;

        let records = into_records(body);
        tracing::debug!(count = records.len(), radius_m, "fetched bakeries");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query() {
        let query = build_query(Coordinate::new(50.45, 30.52), 1500.0, 10);
        assert_eq!(
            query,
            r#"[out:json][timeout:10];(node["shop"="bakery"](around:1500,50.45,30.52);way["shop"="bakery"](around:1500,50.45,30.52););out center;"#
        );
    }

    #[test]
    fn test_build_query_negative_and_fractional() {
        let query = build_query(Coordinate::new(-33.8688, -151.2093), 1250.5, 25);
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains("(around:1250.5,-33.8688,-151.2093)"));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 50.451, "lon": 30.521,
                 "tags": {"shop": "bakery", "name": "Хлібня"}},
                {"type": "way", "id": 2, "center": {"lat": 50.452, "lon": 30.522},
                 "tags": {"shop": "bakery"}},
                {"type": "node", "id": 3, "lat": 50.453, "lon": 30.523}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        let records = into_records(response);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].coordinate, Coordinate::new(50.451, 30.521));
        assert_eq!(records[0].tag("name"), Some("Хлібня"));
        assert_eq!(records[1].coordinate, Coordinate::new(50.452, 30.522));
        assert!(records[2].tags.is_empty());
    }

    #[test]
    fn test_elements_without_coordinates_are_dropped() {
        let json = r#"{"elements": [
            {"type": "way", "id": 7, "tags": {"shop": "bakery"}},
            {"type": "node", "id": 8, "lat": 120.0, "lon": 30.0}
        ]}"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert!(into_records(response).is_empty());
    }

    #[test]
    fn test_empty_response() {
        let response: OverpassResponse = serde_json::from_str(r#"{"elements": []}"#).unwrap();
        assert!(into_records(response).is_empty());

        let response: OverpassResponse = serde_json::from_str("{}").unwrap();
        assert!(into_records(response).is_empty());
    }
}
