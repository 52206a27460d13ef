#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incidence record types, urgency levels and validation rules.
//!
//! An [`Incidence`] is a single geotagged report. Every incidence is exactly
//! one [`IncidenceKind`]; the kind decides which [`IncidenceDetail`] payload
//! it carries and how that payload is rendered. Incidences can only be built
//! through [`Incidence::create`], so every value in circulation has passed
//! validation.

pub mod view;

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use view::IncidenceView;

/// Number of digits in an [`IncidenceId`].
pub const ID_LENGTH: usize = 10;

/// A WGS84 coordinate pair.
///
/// Serialized as the two-element array `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Coords {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(coords: Coords) -> Self {
        [coords.lat, coords.lng]
    }
}

/// Urgency of an incidence, from 1 (minimal) to 5 (critical).
///
/// Serialized as its numeric value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(try_from = "u8", into = "u8")]
#[strum(serialize_all = "snake_case")]
pub enum UrgencyLevel {
    /// Level 1: can wait indefinitely
    Minimal = 1,
    /// Level 2
    Low = 2,
    /// Level 3
    Moderate = 3,
    /// Level 4
    High = 4,
    /// Level 5: needs attention now
    Critical = 5,
}

impl UrgencyLevel {
    /// Returns the numeric value of this urgency level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates an urgency level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidUrgencyError> {
        match value {
            1 => Ok(Self::Minimal),
            2 => Ok(Self::Low),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::High),
            5 => Ok(Self::Critical),
            _ => Err(InvalidUrgencyError { value }),
        }
    }

    /// Returns all variants in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minimal,
            Self::Low,
            Self::Moderate,
            Self::High,
            Self::Critical,
        ]
    }
}

impl TryFrom<u8> for UrgencyLevel {
    type Error = InvalidUrgencyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<UrgencyLevel> for u8 {
    fn from(level: UrgencyLevel) -> Self {
        level.value()
    }
}

/// Error returned when attempting to create an [`UrgencyLevel`] from an
/// invalid numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid urgency value {value}: expected 1-5")]
pub struct InvalidUrgencyError {
    /// The invalid urgency value that was provided.
    pub value: u8,
}

/// Incidence type discriminator.
///
/// The original front end stored infrastructure reports with the
/// misspelling `infrastucture`; both spellings parse.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidenceKind {
    /// Damage to public infrastructure, measured in square meters.
    #[serde(alias = "infrastucture")]
    #[strum(to_string = "infrastructure", serialize = "infrastucture")]
    Infrastructure,
    /// Cleaning or waste collection, categorized by [`TrashType`].
    Maintenance,
}

impl IncidenceKind {
    /// Human-readable name used in popups and list captions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Maintenance => "Maintenance",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Infrastructure, Self::Maintenance]
    }
}

/// Waste categories a maintenance incidence can report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrashType {
    /// Food and garden waste
    Organic,
    /// Plastic packaging
    Plastic,
    /// Paper and cardboard
    Paper,
    /// Glass containers
    Glass,
    /// Cans and scrap metal
    Metal,
    /// Furniture, appliances and other large items
    Bulky,
    /// Batteries, chemicals, medical waste
    Hazardous,
    /// Anything else
    Other,
}

impl TrashType {
    /// Human-readable category name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Organic => "Organic",
            Self::Plastic => "Plastic",
            Self::Paper => "Paper",
            Self::Glass => "Glass",
            Self::Metal => "Metal",
            Self::Bulky => "Bulky waste",
            Self::Hazardous => "Hazardous",
            Self::Other => "Other",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Organic,
            Self::Plastic,
            Self::Paper,
            Self::Glass,
            Self::Metal,
            Self::Bulky,
            Self::Hazardous,
            Self::Other,
        ]
    }
}

/// Stable incidence identifier: a 10-digit numeric string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IncidenceId(String);

impl IncidenceId {
    /// Derives an id from the last ten digits of a millisecond timestamp.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{:010}", millis.rem_euclid(10_000_000_000)))
    }

    /// Parses an id, requiring exactly [`ID_LENGTH`] ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on `id` if the value is malformed.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if value.len() != ID_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new(
                IncidenceField::Id,
                format!("expected {ID_LENGTH} digits, got {value:?}"),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IncidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IncidenceId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IncidenceId> for String {
    fn from(id: IncidenceId) -> Self {
        id.0
    }
}

/// Field an input failed validation on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum IncidenceField {
    /// The `id` field.
    Id,
    /// The `coords` field.
    Coords,
    /// The `urgencyLevel` field.
    UrgencyLevel,
    /// The `description` field.
    Description,
    /// The `surface` field of infrastructure incidences.
    Surface,
    /// The `trashType` field of maintenance incidences.
    TrashType,
}

/// Rejected user or stored input. Nothing is constructed when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Which field was rejected.
    pub field: IncidenceField,
    /// Why it was rejected.
    pub reason: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: IncidenceField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Unvalidated variant payload, as entered in a form or decoded from
/// storage.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailInput {
    /// Affected surface in square meters.
    Infrastructure {
        /// Surface in m².
        surface: f64,
    },
    /// Trash category name (see [`TrashType`]).
    Maintenance {
        /// Category name.
        trash_type: String,
    },
}

/// Unvalidated incidence fields.
///
/// `date`, `id` and `address` are supplied when reconstructing from
/// storage; interactive creation leaves `address` empty and lets the
/// caller resolve it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidenceInput {
    /// Reported location.
    pub coords: Coords,
    /// Urgency, expected in 1-5.
    pub urgency_level: i64,
    /// Free-text description.
    pub description: String,
    /// Variant payload.
    pub detail: DetailInput,
    /// Creation timestamp; defaults to now.
    pub date: Option<DateTime<Utc>>,
    /// Existing id; derived from `date` when absent.
    pub id: Option<String>,
    /// Resolved street address.
    pub address: Option<String>,
}

/// Validated variant payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IncidenceDetail {
    /// Infrastructure damage over `surface` m².
    Infrastructure {
        /// Positive, finite surface in m².
        surface: f64,
    },
    /// Maintenance request for a trash category.
    Maintenance {
        /// Reported category.
        trash_type: TrashType,
    },
}

impl IncidenceDetail {
    /// The kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> IncidenceKind {
        match self {
            Self::Infrastructure { .. } => IncidenceKind::Infrastructure,
            Self::Maintenance { .. } => IncidenceKind::Maintenance,
        }
    }

    fn validate(input: &DetailInput) -> Result<Self, ValidationError> {
        match input {
            DetailInput::Infrastructure { surface } => {
                if !surface.is_finite() || *surface <= 0.0 {
                    return Err(ValidationError::new(
                        IncidenceField::Surface,
                        format!("must be a positive number, got {surface}"),
                    ));
                }
                Ok(Self::Infrastructure { surface: *surface })
            }
            DetailInput::Maintenance { trash_type } => {
                let trimmed = trash_type.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::new(IncidenceField::TrashType, "empty"));
                }
                let trash_type = trimmed.parse::<TrashType>().map_err(|_| {
                    ValidationError::new(
                        IncidenceField::TrashType,
                        format!("unknown category {trimmed:?}"),
                    )
                })?;
                Ok(Self::Maintenance { trash_type })
            }
        }
    }
}

/// A validated incidence report.
#[derive(Debug, Clone, PartialEq)]
pub struct Incidence {
    id: IncidenceId,
    coords: Coords,
    urgency: UrgencyLevel,
    description: String,
    date: DateTime<Utc>,
    address: Option<String>,
    detail: IncidenceDetail,
}

impl Incidence {
    /// Validates `input` and builds an incidence.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first rejected field.
    pub fn create(input: IncidenceInput) -> Result<Self, ValidationError> {
        if !input.coords.is_finite() {
            return Err(ValidationError::new(IncidenceField::Coords, "not finite"));
        }

        let urgency = u8::try_from(input.urgency_level)
            .ok()
            .and_then(|v| UrgencyLevel::from_value(v).ok())
            .ok_or_else(|| {
                ValidationError::new(
                    IncidenceField::UrgencyLevel,
                    format!("expected an integer in 1-5, got {}", input.urgency_level),
                )
            })?;

        let description = input.description.trim();
        if description.is_empty() {
            return Err(ValidationError::new(IncidenceField::Description, "empty"));
        }

        let detail = IncidenceDetail::validate(&input.detail)?;
        // Millisecond precision, so dates survive a storage round trip.
        let date = input.date.unwrap_or_else(Utc::now).trunc_subsecs(3);
        let id = match input.id {
            Some(id) => IncidenceId::parse(&id)?,
            None => IncidenceId::from_millis(date.timestamp_millis()),
        };

        Ok(Self {
            id,
            coords: input.coords,
            urgency,
            description: description.to_string(),
            date,
            address: normalize_address(input.address),
            detail,
        })
    }

    /// Returns a copy with the resolved address replaced.
    #[must_use]
    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = normalize_address(address);
        self
    }

    /// Returns a copy carrying `id` in place of the derived one.
    #[must_use]
    pub fn with_id(mut self, id: IncidenceId) -> Self {
        self.id = id;
        self
    }

    /// Returns the stable identifier.
    #[must_use]
    pub const fn id(&self) -> &IncidenceId {
        &self.id
    }

    /// Returns the reported location.
    #[must_use]
    pub const fn coords(&self) -> Coords {
        self.coords
    }

    /// Returns the urgency level.
    #[must_use]
    pub const fn urgency(&self) -> UrgencyLevel {
        self.urgency
    }

    /// Returns the trimmed, non-empty description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation time, at millisecond precision.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Returns the resolved street address, if the lookup succeeded.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns the variant payload.
    #[must_use]
    pub const fn detail(&self) -> &IncidenceDetail {
        &self.detail
    }

    /// Returns the variant discriminator.
    #[must_use]
    pub const fn kind(&self) -> IncidenceKind {
        self.detail.kind()
    }

    /// Popup caption: the kind label followed by the description.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{}: {}", self.kind().label(), self.description)
    }

    /// Formatted variant value: `"42 m²"` for infrastructure, the trash
    /// category label for maintenance.
    #[must_use]
    pub fn detail_value(&self) -> String {
        match self.detail {
            IncidenceDetail::Infrastructure { surface } => format!("{surface} m²"),
            IncidenceDetail::Maintenance { trash_type } => trash_type.label().to_string(),
        }
    }
}

fn normalize_address(address: Option<String>) -> Option<String> {
    address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}
