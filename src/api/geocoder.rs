use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::time::Duration;

use super::Geocoder;
use crate::config::{GeocoderConfig, GeocoderFlavor};
use crate::domain::Coordinate;

/// Geocoder responses come in two shapes: a GeoJSON FeatureCollection
/// (Photon) or a flat array of places (Nominatim).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeocoderResponse {
    Features(FeatureCollection),
    Places(Vec<NominatimPlace>),
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<FeatureProperties>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// GeoJSON order: [lon, lat]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Decimal,
    lon: Decimal,
    #[serde(default)]
    display_name: Option<String>,
}

/// Nominatim sends coordinates as decimal strings; some mirrors send numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(f64),
    Text(String),
}

impl Decimal {
    fn value(&self) -> Result<f64> {
        match self {
            Decimal::Number(n) => Ok(*n),
            // `f64::from_str` only accepts '.' as the decimal separator
            Decimal::Text(s) => s
                .trim()
                .parse()
                .with_context(|| format!("Invalid decimal coordinate: {:?}", s)),
        }
    }
}

/// Best-ranked match extracted from either response shape
#[derive(Debug, PartialEq)]
pub(crate) struct Match {
    pub(crate) coordinate: Coordinate,
    pub(crate) label: Option<String>,
}

/// Decode a geocoder response body into its best match
///
/// `Ok(None)` for an empty result set or an unusable coordinate; `Err` for a
/// body that is not a recognized geocoder response.
pub(crate) fn parse_body(body: &str) -> Result<Option<Match>> {
    let response: GeocoderResponse =
        serde_json::from_str(body).context("Failed to parse geocoder JSON response")?;
    first_match(response)
}

fn first_match(response: GeocoderResponse) -> Result<Option<Match>> {
    let (lat, lon, label) = match response {
        GeocoderResponse::Features(collection) => {
            let Some(feature) = collection.features.into_iter().next() else {
                return Ok(None);
            };
            let geometry = feature
                .geometry
                .context("First feature has no geometry")?;
            let &[lon, lat, ..] = geometry.coordinates.as_slice() else {
                bail!(
                    "Feature geometry has {} coordinate(s), expected [lon, lat]",
                    geometry.coordinates.len()
                );
            };
            (lat, lon, feature.properties.and_then(|p| p.name))
        }
        GeocoderResponse::Places(places) => {
            let Some(place) = places.into_iter().next() else {
                return Ok(None);
            };
            let lat = place
                .lat
                .value()
                .context("Failed to parse latitude from geocoder response")?;
            let lon = place
                .lon
                .value()
                .context("Failed to parse longitude from geocoder response")?;
            (lat, lon, place.display_name)
        }
    };

    let Some(coordinate) = Coordinate::checked(lat, lon) else {
        tracing::debug!(lat, lon, "geocoder match has an out-of-range coordinate");
        return Ok(None);
    };

    Ok(Some(Match { coordinate, label }))
}

/// Free-text query sent to the geocoder: "{city}, {address}"
pub fn geocode_query(city: &str, address: &str) -> String {
    format!("{}, {}", city, address)
}

/// Geocoder backed by a Photon or Nominatim HTTP endpoint
pub struct HttpGeocoder {
    client: reqwest::blocking::Client,
    config: GeocoderConfig,
}

impl HttpGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }
}

impl Geocoder for HttpGeocoder {
    /// Resolve "{city}, {address}" to the provider's single best match
    ///
    /// `Ok(None)` means the provider answered with no match; network errors,
    /// non-success statuses and malformed bodies are `Err`.
    fn resolve(&self, city: &str, address: &str) -> Result<Option<Coordinate>> {
        let query = geocode_query(city, address);

        let mut params = vec![("q", query.as_str()), ("limit", "1")];
        if self.config.flavor == GeocoderFlavor::Nominatim {
            params.push(("format", "json"));
        }

        let response = self
            .client
            .get(&self.config.url)
            .query(&params)
            .send()
            .context("Failed to send request to geocoder")?;

        if !response.status().is_success() {
            bail!("Geocoder returned error status: {}", response.status());
        }

        let body = response
            .text()
            .context("Failed to read geocoder response body")?;

        let found = parse_body(&body)?;
        match &found {
            Some(m) => tracing::debug!(
                query = %query,
                lat = m.coordinate.lat,
                lon = m.coordinate.lon,
                label = m.label.as_deref().unwrap_or(""),
                "geocoded"
            ),
            None => tracing::debug!(query = %query, "geocoder has no match"),
        }

        Ok(found.map(|m| m.coordinate))
    }
}
