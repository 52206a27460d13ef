#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for incidence coordinates.
//!
//! Turns the coordinates of a new incidence into a human-readable street
//! address. The lookup is best-effort: callers treat any [`GeocodeError`]
//! as "no address" and carry on.
//!
//! [`nominatim::NominatimGeocoder`] talks to an `OpenStreetMap` Nominatim
//! instance configured in `services/nominatim.toml` (see
//! [`service_registry`]). [`FixedGeocoder`] and [`OfflineGeocoder`] stand
//! in when no network lookup is wanted.

pub mod nominatim;
pub mod service_registry;

use async_trait::async_trait;
use incidence_map_incidence_models::Coords;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

/// Errors from reverse geocoding.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider has no address for these coordinates.
    #[error("No address found")]
    NotFound,

    /// Lookups are disabled.
    #[error("Geocoding is offline")]
    Offline,
}

/// Address-resolution collaborator.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Resolves `coords` to a street address.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if no address could be resolved.
    async fn reverse_geocode(&self, coords: Coords) -> Result<String, GeocodeError>;
}

/// Answers every lookup with the same address.
#[derive(Debug, Clone)]
pub struct FixedGeocoder {
    address: String,
}

impl FixedGeocoder {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse_geocode(&self, _coords: Coords) -> Result<String, GeocodeError> {
        Ok(self.address.clone())
    }
}

/// Fails every lookup with [`GeocodeError::Offline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

#[async_trait]
impl ReverseGeocoder for OfflineGeocoder {
    async fn reverse_geocode(&self, _coords: Coords) -> Result<String, GeocodeError> {
        Err(GeocodeError::Offline)
    }
}
