//! Search pipeline: validate, cache lookup, geocode, fetch, normalize, rank, store.

use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::api::{Geocoder, HttpGeocoder, OverpassPoiSource, PoiSource, geocode_query};
use crate::cache::SearchCache;
use crate::config::{DEFAULT_RADIUS_M, FileConfig};
use crate::domain::{Coordinate, RawPoiRecord, SearchResult};
use crate::geometry::rank;
use crate::osm::{Locale, normalize};

/// What to do when a provider call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Log and continue as "no match" / "no bakeries"
    #[default]
    Degrade,
    /// Return `SearchError::ProviderFault`
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Geocoder,
    Poi,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Geocoder => write!(f, "geocoder"),
            Provider::Poi => write!(f, "POI provider"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{field} must not be blank")]
    Validation { field: &'static str },
    #[error("address not found: {query}")]
    NotFound { query: String },
    #[error("{provider} failed: {reason}")]
    ProviderFault { provider: Provider, reason: String },
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub radius_m: f64,
    pub locale: Locale,
    pub fault_policy: FaultPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            locale: Locale::default(),
            fault_policy: FaultPolicy::default(),
        }
    }
}

impl SearchOptions {
    pub fn from_config(config: &FileConfig) -> Self {
        Self {
            radius_m: config.overpass.radius_m,
            locale: config.locale,
            fault_policy: config.fault_policy,
        }
    }
}

/// Cache key for a query: case-insensitive over the trimmed inputs
///
/// Equal keys always produce the same geocoder query text.
pub fn cache_key(city: &str, address: &str) -> String {
    geocode_query(city.trim(), address.trim()).to_lowercase()
}

fn require(value: &str, field: &'static str) -> Result<(), SearchError> {
    if value.trim().is_empty() {
        return Err(SearchError::Validation { field });
    }
    Ok(())
}

/// Composes geocoder, POI source, normalizer, ranker and cache
pub struct SearchOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    pois: Arc<dyn PoiSource>,
    cache: Arc<SearchCache>,
    options: SearchOptions,
}

impl SearchOrchestrator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        pois: Arc<dyn PoiSource>,
        cache: Arc<SearchCache>,
        options: SearchOptions,
    ) -> Self {
        Self {
            geocoder,
            pois,
            cache,
            options,
        }
    }

    /// Wire the HTTP providers and a fresh cache from file configuration
    pub fn from_config(config: &FileConfig) -> Result<Self> {
        let geocoder = HttpGeocoder::new(config.geocoder.clone())?;
        let pois = OverpassPoiSource::new(config.overpass.clone())?;
        let cache = SearchCache::new(config.cache.ttl(), config.cache.max_entries);

        Ok(Self::new(
            Arc::new(geocoder),
            Arc::new(pois),
            Arc::new(cache),
            SearchOptions::from_config(config),
        ))
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Find bakeries near "{city}, {address}", sorted by distance
    ///
    /// Blank input is rejected before any provider call. Only runs where
    /// both providers answered are cached.
    pub fn search(&self, city: &str, address: &str) -> Result<Arc<SearchResult>, SearchError> {
        require(city, "city")?;
        require(address, "address")?;
        let (city, address) = (city.trim(), address.trim());

        let key = cache_key(city, address);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key = %key, "cache hit");
            return Ok(hit);
        }
        tracing::debug!(key = %key, "cache miss");

        let label = geocode_query(city, address);
        let center = match self.geocoder.resolve(city, address) {
            Ok(Some(center)) => center,
            Ok(None) => {
                tracing::info!(query = %label, "address not found");
                return Err(SearchError::NotFound { query: label });
            }
            Err(e) => {
                tracing::warn!(query = %label, "geocoding failed: {:#}", e);
                // Degraded geocoder faults read as "not found"
                return Err(match self.options.fault_policy {
                    FaultPolicy::Degrade => SearchError::NotFound { query: label },
                    FaultPolicy::Surface => SearchError::ProviderFault {
                        provider: Provider::Geocoder,
                        reason: format!("{:#}", e),
                    },
                });
            }
        };

        let (records, complete) = match self.pois.fetch_bakeries(center, self.options.radius_m) {
            Ok(records) => (records, true),
            Err(e) => {
                tracing::warn!(lat = center.lat, lon = center.lon, "bakery lookup failed: {:#}", e);
                if self.options.fault_policy == FaultPolicy::Surface {
                    return Err(SearchError::ProviderFault {
                        provider: Provider::Poi,
                        reason: format!("{:#}", e),
                    });
                }
                (Vec::new(), false)
            }
        };

        let result = Arc::new(self.assemble(center, &records, label));
        tracing::info!(
            query = %result.source_label,
            bakeries = result.bakeries.len(),
            "search complete"
        );

        if complete {
            self.cache.put(key, Arc::clone(&result));
        }
        Ok(result)
    }

    fn assemble(
        &self,
        center: Coordinate,
        records: &[RawPoiRecord],
        label: String,
    ) -> SearchResult {
        let bakeries = records
            .iter()
            .map(|raw| normalize(raw, self.options.locale))
            .collect();

        SearchResult {
            search_center: center,
            bakeries: rank(center, bakeries),
            source_label: label,
        }
    }
}
