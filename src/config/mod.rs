use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::osm::Locale;
use crate::search::FaultPolicy;

const USER_AGENT: &str = "bunontherun/0.1.0";

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_geocoder_url() -> String {
    "https://photon.komoot.io/api/".to_string()
}

fn default_geocoder_timeout_secs() -> u64 {
    30
}

/// Which query parameters the geocoder endpoint expects
///
/// Responses of either shape are accepted regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderFlavor {
    #[default]
    Photon,
    Nominatim,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub url: String,
    #[serde(default)]
    pub flavor: GeocoderFlavor,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoder_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            flavor: GeocoderFlavor::default(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoder_timeout_secs(),
        }
    }
}

/// Search radius around the geocoded point, in meters
pub const DEFAULT_RADIUS_M: f64 = 1500.0;

fn default_overpass_url() -> String {
    "https://overpass.kumi.systems/api/interpreter".to_string()
}

fn default_radius_m() -> f64 {
    DEFAULT_RADIUS_M
}

fn default_server_timeout_secs() -> u64 {
    10
}

fn default_overpass_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_url")]
    pub url: String,
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,
    /// `[timeout:N]` sent inside the Overpass QL query
    #[serde(default = "default_server_timeout_secs")]
    pub server_timeout_secs: u64,
    /// HTTP client timeout, kept above the server-side one
    #[serde(default = "default_overpass_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: default_overpass_url(),
            radius_m: default_radius_m(),
            server_timeout_secs: default_server_timeout_secs(),
            timeout_secs: default_overpass_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    600
}

/// Longest accepted cache lifetime: one day
pub const MAX_TTL_SECS: u64 = 86_400;

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Unbounded when absent
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FileConfig {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub fault_policy: FaultPolicy,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub overpass: OverpassConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl FileConfig {
    /// Read and parse an explicitly requested config file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Search the usual locations; the first file that parses wins
    pub fn load() -> Option<Self> {
        Self::load_from(&get_config_paths())
    }

    fn load_from(paths: &[PathBuf]) -> Option<Self> {
        for path in paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(path)
            {
                match toml::from_str::<FileConfig>(&contents) {
                    Ok(config) => match config.validate() {
                        Ok(()) => return Some(config),
                        Err(e) => {
                            tracing::warn!("Ignoring config file {:?}: {:#}", path, e);
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.overpass.radius_m.is_finite() && self.overpass.radius_m > 0.0) {
            bail!(
                "overpass.radius_m must be a positive number, got {}",
                self.overpass.radius_m
            );
        }
        if self.overpass.timeout_secs <= self.overpass.server_timeout_secs {
            bail!(
                "overpass.timeout_secs ({}) must exceed overpass.server_timeout_secs ({})",
                self.overpass.timeout_secs,
                self.overpass.server_timeout_secs
            );
        }
        if self.cache.ttl_secs > MAX_TTL_SECS {
            bail!(
                "cache.ttl_secs must be at most {}, got {}",
                MAX_TTL_SECS,
                self.cache.ttl_secs
            );
        }
        if self.cache.max_entries == Some(0) {
            bail!("cache.max_entries must be at least 1 when set");
        }
        Ok(())
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("bunontherun.toml"));
    paths.push(PathBuf::from(".bunontherun.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("bunontherun").join("config.toml"));
        paths.push(config_dir.join("bunontherun.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".bunontherun.toml"));
    }

    paths
}
