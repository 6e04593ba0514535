//! Geocoding configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::openstreetmap::OPENSTREETMAP_ID;

/// Configuration shared by all geocoding providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Active provider id (`openstreetmap` or `google-maps`)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Google Maps API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub google_maps_api_key: Option<SecretString>,

    /// Two-letter language code sent to the upstream APIs
    #[serde(default = "default_language")]
    pub language: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Nominatim settings
    #[serde(default)]
    pub openstreetmap: OpenStreetMapConfig,

    /// Google Places settings
    #[serde(default)]
    pub google_maps: GoogleMapsConfig,
}

fn default_provider() -> String {
    OPENSTREETMAP_ID.to_string()
}

fn default_language() -> String {
    "en".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("address-autocomplete/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            google_maps_api_key: None,
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            openstreetmap: OpenStreetMapConfig::default(),
            google_maps: GoogleMapsConfig::default(),
        }
    }
}

impl GeocodingConfig {
    /// Create a configuration suitable for testing against a mock server
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            timeout_secs: 5,
            openstreetmap: OpenStreetMapConfig {
                base_url: base_url.to_string(),
                ..OpenStreetMapConfig::default()
            },
            google_maps: GoogleMapsConfig {
                base_url: base_url.to_string(),
                ..GoogleMapsConfig::default()
            },
            ..Self::default()
        }
    }

    /// The Google Maps API key, if one is configured and non-blank
    #[must_use]
    pub fn google_api_key(&self) -> Option<&str> {
        self.google_maps_api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider.trim().is_empty() {
            return Err("provider must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.openstreetmap.search_limit == 0 || self.openstreetmap.search_limit > 50 {
            return Err("openstreetmap.search_limit must be between 1 and 50".to_string());
        }

        if self.language.len() != 2 || !self.language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err("language must be a two-letter code".to_string());
        }

        Ok(())
    }
}

/// Nominatim (OpenStreetMap) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenStreetMapConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_osm_base_url")]
    pub base_url: String,

    /// Maximum number of candidates per search
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Client map library (Leaflet) script URL
    #[serde(default = "default_leaflet_url")]
    pub map_script_url: String,
}

fn default_osm_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_search_limit() -> u32 {
    10
}

fn default_leaflet_url() -> String {
    "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js".to_string()
}

impl Default for OpenStreetMapConfig {
    fn default() -> Self {
        Self {
            base_url: default_osm_base_url(),
            search_limit: default_search_limit(),
            map_script_url: default_leaflet_url(),
        }
    }
}

/// Google Places settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleMapsConfig {
    /// Base URL for the Maps web service APIs
    #[serde(default = "default_google_base_url")]
    pub base_url: String,

    /// Client map library (Maps JavaScript API) script URL
    #[serde(default = "default_google_js_url")]
    pub map_script_url: String,
}

fn default_google_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_google_js_url() -> String {
    "https://maps.googleapis.com/maps/api/js".to_string()
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            base_url: default_google_base_url(),
            map_script_url: default_google_js_url(),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether responses are cached
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Default entry lifetime in seconds (default: 24 hours)
    #[serde(default = "default_cache_duration_secs")]
    pub duration_secs: u64,

    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

const fn default_cache_enabled() -> bool {
    true
}

const fn default_cache_duration_secs() -> u64 {
    24 * 60 * 60
}

const fn default_cache_max_entries() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            duration_secs: default_cache_duration_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl CacheConfig {
    /// Default entry lifetime as a Duration
    #[must_use]
    pub const fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.duration_secs)
    }
}
