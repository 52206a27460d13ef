//! Manager configuration.
//!
//! Defaults live in `config/default.toml` and are embedded at compile
//! time. An override file only needs the keys it changes; everything else
//! falls back to the embedded defaults.

use std::path::Path;

use incidence_map_list::PageSize;
use serde::{Deserialize, Serialize};

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Where interactively created incidences are inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionOrder {
    /// Prepend, so the list reads most recent first.
    #[default]
    NewestFirst,
    /// Append.
    OldestFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    pub page_size: PageSize,
    pub storage_key: String,
    pub insertion_order: InsertionOrder,
    pub focus_zoom: u8,
    pub pan_duration_ms: u64,
    /// `0` leaves new popups open.
    pub popup_auto_close_ms: u64,
}

impl Default for ManagerConfig {
    /// The embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    fn default() -> Self {
        toml::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded manager config: {e}"))
    }
}

impl ManagerConfig {
    /// Parses `toml_str` over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the override is malformed, names an
    /// unknown key, or holds an out-of-range value.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let mut merged: toml::Table = toml::from_str(DEFAULT_TOML)?;
        let overrides: toml::Table = toml::from_str(toml_str)?;
        merged.extend(overrides);
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Reads and parses an override file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded manager config from {}", path.display());
        Ok(config)
    }

    /// Popup auto-close delay, `None` when disabled.
    #[must_use]
    pub const fn popup_auto_close(&self) -> Option<u64> {
        match self.popup_auto_close_ms {
            0 => None,
            ms => Some(ms),
        }
    }
}
