#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Blob-store persistence for the incidence collection.
//!
//! The whole ordered collection is serialized as one JSON array under a
//! single key (see [`DEFAULT_KEY`]). The medium itself is abstracted by
//! [`BlobStore`]; [`MemoryBlobStore`] and [`FileBlobStore`] are provided.
//!
//! Persistence is best-effort. [`IncidenceStore::load`] never fails: an
//! absent or malformed blob yields an empty collection, and individual
//! records that cannot be reconstructed are skipped with a warning.

pub mod file;
pub mod memory;
pub mod record;

use std::collections::BTreeSet;

use incidence_map_incidence_models::Incidence;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

use crate::record::StoredIncidence;

/// Key the collection is stored under.
pub const DEFAULT_KEY: &str = "incidences";

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backing medium.
    #[error("Invalid key {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}

/// Opaque persistent key-value medium holding string blobs.
pub trait BlobStore {
    /// Returns the blob stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the medium cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the medium cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Saves and loads the incidence collection through a [`BlobStore`].
#[derive(Debug)]
pub struct IncidenceStore<S> {
    blobs: S,
    key: String,
}

impl<S: BlobStore> IncidenceStore<S> {
    /// Wraps `blobs`, storing the collection under [`DEFAULT_KEY`].
    #[must_use]
    pub fn new(blobs: S) -> Self {
        Self::with_key(blobs, DEFAULT_KEY)
    }

    /// Wraps `blobs`, storing the collection under `key`.
    #[must_use]
    pub fn with_key(blobs: S, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn blobs(&self) -> &S {
        &self.blobs
    }

    /// Serializes the full ordered collection, replacing the stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or writing fails.
    pub fn save(&mut self, incidences: &[Incidence]) -> Result<(), StoreError> {
        let json = encode(incidences)?;
        self.blobs.set(&self.key, &json)?;
        log::debug!(
            "Saved {} incidences under {:?}",
            incidences.len(),
            self.key
        );
        Ok(())
    }

    /// Reads and reconstructs the stored collection.
    ///
    /// Returns an empty collection if the blob is absent, unreadable or
    /// not a JSON array.
    #[must_use]
    pub fn load(&self) -> Vec<Incidence> {
        match self.blobs.get(&self.key) {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => {
                log::debug!("No stored incidences under {:?}", self.key);
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to read stored incidences: {e}");
                Vec::new()
            }
        }
    }

    /// Removes the stored collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the medium cannot be written.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.blobs.remove(&self.key)
    }
}

/// Encodes a collection as the stored JSON array.
///
/// # Errors
///
/// Returns [`StoreError::Json`] if serialization fails.
pub fn encode(incidences: &[Incidence]) -> Result<String, StoreError> {
    let records: Vec<StoredIncidence> = incidences.iter().map(StoredIncidence::from).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Decodes a stored JSON array, reconstructing typed incidences.
///
/// Records that fail to decode, carry an unknown `type`, fail validation
/// or repeat an earlier id are dropped. Everything else keeps its stored
/// order.
#[must_use]
pub fn decode(raw: &str) -> Vec<Incidence> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("Stored incidences are not a JSON array, starting empty: {e}");
            return Vec::new();
        }
    };

    let total = values.len();
    let mut seen = BTreeSet::new();
    let mut incidences = Vec::with_capacity(total);

    for (i, value) in values.into_iter().enumerate() {
        let record: StoredIncidence = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping stored record {i}: {e}");
                continue;
            }
        };

        let incidence = match record.into_incidence() {
            Ok(incidence) => incidence,
            Err(e) => {
                log::warn!("Skipping stored record {i}: {e}");
                continue;
            }
        };

        if !seen.insert(incidence.id().clone()) {
            log::warn!(
                "Skipping stored record {i}: duplicate id {}",
                incidence.id()
            );
            continue;
        }

        incidences.push(incidence);
    }

    if incidences.len() < total {
        log::warn!(
            "Restored {} of {total} stored incidences",
            incidences.len()
        );
    }

    incidences
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use incidence_map_incidence_models::{Coords, DetailInput, IncidenceInput, IncidenceKind};

    use super::*;

    fn incidence(id: &str, detail: DetailInput, address: Option<&str>) -> Incidence {
        Incidence::create(IncidenceInput {
            coords: Coords::new(40.0, -3.5),
            urgency_level: 4,
            description: format!("report {id}"),
            detail,
            date: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
            id: Some(id.to_string()),
            address: address.map(str::to_string),
        })
        .unwrap()
    }

    fn sample() -> Vec<Incidence> {
        vec![
            incidence(
                "0000000003",
                DetailInput::Infrastructure { surface: 12.5 },
                Some("Calle Mayor 1, Madrid"),
            ),
            incidence(
                "0000000002",
                DetailInput::Maintenance {
                    trash_type: "glass".to_string(),
                },
                None,
            ),
            incidence(
                "0000000001",
                DetailInput::Infrastructure { surface: 3.0 },
                None,
            ),
        ]
    }

    #[test]
    fn save_then_load_preserves_collection() {
        let mut store = IncidenceStore::new(MemoryBlobStore::default());
        let original = sample();
        store.save(&original).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, original);
        assert_eq!(loaded[1].kind(), IncidenceKind::Maintenance);
        assert_eq!(loaded[0].detail_value(), "12.5 m²");
    }

    #[test]
    fn full_precision_floats_survive_round_trip() {
        let values = [
            (-3.494_182_671_091_479_6, 1.747_091_335_545_739_8, 188.949_885_824_558_74),
            (std::f64::consts::E * 10.0, -std::f64::consts::SQRT_2 * 100.0, std::f64::consts::PI * 100.0),
            (0.1 + 0.2, 1.0 / 3.0, 1000.0 / 7.0),
        ];
        let original: Vec<Incidence> = values
            .iter()
            .enumerate()
            .map(|(n, &(lat, lng, surface))| {
                Incidence::create(IncidenceInput {
                    coords: Coords::new(lat, lng),
                    urgency_level: 2,
                    description: "precise".to_string(),
                    detail: DetailInput::Infrastructure { surface },
                    date: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
                    id: Some(format!("000000000{n}")),
                    address: None,
                })
                .unwrap()
            })
            .collect();

        let mut store = IncidenceStore::new(MemoryBlobStore::default());
        store.save(&original).unwrap();
        let loaded = store.load();

        assert_eq!(loaded, original);
        for (loaded, &(lat, lng, _)) in loaded.iter().zip(&values) {
            assert_eq!(loaded.coords().lat.to_bits(), lat.to_bits());
            assert_eq!(loaded.coords().lng.to_bits(), lng.to_bits());
        }
    }

    #[test]
    fn save_overwrites_previous_blob() {
        let mut store = IncidenceStore::new(MemoryBlobStore::default());
        store.save(&sample()).unwrap();
        store.save(&sample()[..1]).unwrap();
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn absent_blob_loads_empty() {
        let store = IncidenceStore::new(MemoryBlobStore::default());
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_blob_loads_empty() {
        for raw in ["", "null", "{not json", "{\"a\":1}", "42"] {
            assert!(decode(raw).is_empty(), "{raw:?} should decode to empty");
        }
    }

    #[test]
    fn unknown_and_invalid_records_are_skipped() {
        let raw = r#"[
            {"coords":[1,2],"urgencyLevel":2,"description":"ok","date":"2026-01-01T10:00:00.000Z","id":"1111111111","type":"maintenance","trashType":"paper"},
            {"coords":[1,2],"urgencyLevel":2,"description":"alien","date":"2026-01-01T10:00:00.000Z","id":"2222222222","type":"graffiti"},
            {"coords":[1,2],"urgencyLevel":9,"description":"too urgent","date":"2026-01-01T10:00:00.000Z","id":"3333333333","type":"infrastructure","surface":4},
            {"coords":[1,2],"urgencyLevel":2,"description":"no surface","date":"2026-01-01T10:00:00.000Z","id":"4444444444","type":"infrastructure"},
            "garbage",
            {"coords":[1,2],"urgencyLevel":1,"description":"dup","date":"2026-01-01T10:00:00.000Z","id":"1111111111","type":"infrastructure","surface":1},
            {"coords":[5,6],"urgencyLevel":5,"description":"legacy","date":1767261600000,"id":"5555555555","type":"infrastucture","surface":7.25}
        ]"#;

        let loaded = decode(raw);
        let ids: Vec<&str> = loaded.iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, ["1111111111", "5555555555"]);
        assert_eq!(loaded[1].kind(), IncidenceKind::Infrastructure);
        assert_eq!(loaded[1].detail_value(), "7.25 m²");
        assert_eq!(
            loaded[1].date(),
            Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn clear_removes_blob() {
        let mut store = IncidenceStore::with_key(MemoryBlobStore::default(), "custom");
        store.save(&sample()).unwrap();
        assert!(store.blobs().get("custom").unwrap().is_some());
        store.clear().unwrap();
        assert!(store.blobs().get("custom").unwrap().is_none());
        assert!(store.load().is_empty());
    }
}
