//! Compile-time embedded geocoding service configuration.
//!
//! The Nominatim service is defined in `services/nominatim.toml` and
//! embedded at compile time. [`load`] parses an alternative definition,
//! e.g. one pointing at a self-hosted instance.

use serde::Deserialize;

/// A reverse geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether lookups should be made at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `/reverse` endpoint URL.
    pub base_url: String,
    /// `User-Agent` header; the public Nominatim instance rejects
    /// anonymous clients.
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds.
    #[serde(default)]
    pub rate_limit_ms: u64,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Parses a service definition.
///
/// # Errors
///
/// Returns a [`toml::de::Error`] if the definition is malformed.
pub fn load(toml_str: &str) -> Result<GeocodingService, toml::de::Error> {
    toml::de::from_str(toml_str)
}

/// The embedded Nominatim service definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn nominatim() -> GeocodingService {
    load(NOMINATIM_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'nominatim': {e}"))
}
