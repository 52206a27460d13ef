//! Wire format of a single stored incidence.
//!
//! ```json
//! {"coords":[lat,lng],"urgencyLevel":3,"description":"...","date":"2026-10-14T09:30:00.000Z",
//!  "id":"0434200123","address":"...","type":"infrastructure","surface":12.5}
//! ```
//!
//! There is no schema version. Optional fields may be absent, `date` may be
//! an RFC 3339 string or epoch milliseconds, and `type` is kept as a plain
//! string so that unknown values can be reported per record instead of
//! failing the whole array.

use chrono::{DateTime, SecondsFormat, Utc};
use incidence_map_incidence_models::{
    Coords, DetailInput, Incidence, IncidenceDetail, IncidenceInput, IncidenceKind, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Why a decoded record could not become an [`Incidence`].
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The `type` discriminator is not a known kind.
    #[error("unknown type {0:?}")]
    UnknownType(String),

    /// A variant field required by the kind is missing.
    #[error("missing {0} for {1}")]
    MissingField(&'static str, IncidenceKind),

    /// `date` is neither RFC 3339 nor epoch milliseconds.
    #[error("unreadable date {0}")]
    BadDate(String),

    /// `urgencyLevel` is not an integer.
    #[error("urgencyLevel is not an integer: {0}")]
    BadUrgency(serde_json::Number),

    /// The reconstructed fields failed model validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Stored `date`: ISO string as written by `JSON.stringify`, or epoch
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredDate {
    /// RFC 3339 timestamp.
    Text(String),
    /// Milliseconds since the Unix epoch.
    Millis(i64),
}

impl StoredDate {
    fn to_datetime(&self) -> Result<DateTime<Utc>, RecordError> {
        match self {
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|_| RecordError::BadDate(text.clone())),
            Self::Millis(millis) => DateTime::from_timestamp_millis(*millis)
                .ok_or_else(|| RecordError::BadDate(millis.to_string())),
        }
    }
}

/// One element of the stored JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIncidence {
    pub coords: [f64; 2],
    pub urgency_level: serde_json::Number,
    pub description: String,
    pub date: StoredDate,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trash_type: Option<String>,
}

impl From<&Incidence> for StoredIncidence {
    fn from(incidence: &Incidence) -> Self {
        let (surface, trash_type) = match *incidence.detail() {
            IncidenceDetail::Infrastructure { surface } => (Some(surface), None),
            IncidenceDetail::Maintenance { trash_type } => (None, Some(trash_type.to_string())),
        };

        Self {
            coords: incidence.coords().into(),
            urgency_level: incidence.urgency().value().into(),
            description: incidence.description().to_string(),
            date: StoredDate::Text(
                incidence
                    .date()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            id: incidence.id().to_string(),
            address: incidence.address().map(str::to_string),
            kind: incidence.kind().to_string(),
            surface,
            trash_type,
        }
    }
}

impl StoredIncidence {
    /// Reconstructs the typed incidence, dispatching on `type`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the record cannot be reconstructed.
    pub fn into_incidence(self) -> Result<Incidence, RecordError> {
        let kind: IncidenceKind = self
            .kind
            .parse()
            .map_err(|_| RecordError::UnknownType(self.kind.clone()))?;

        let detail = match kind {
            IncidenceKind::Infrastructure => DetailInput::Infrastructure {
                surface: self
                    .surface
                    .ok_or(RecordError::MissingField("surface", kind))?,
            },
            IncidenceKind::Maintenance => DetailInput::Maintenance {
                trash_type: self
                    .trash_type
                    .ok_or(RecordError::MissingField("trashType", kind))?,
            },
        };

        let date = self.date.to_datetime()?;
        let urgency_level = urgency_as_integer(&self.urgency_level)
            .ok_or_else(|| RecordError::BadUrgency(self.urgency_level.clone()))?;
        let [lat, lng] = self.coords;

        Ok(Incidence::create(IncidenceInput {
            coords: Coords::new(lat, lng),
            urgency_level,
            description: self.description,
            detail,
            date: Some(date),
            id: Some(self.id),
            address: self.address,
        })?)
    }
}

/// Accepts integral floats such as `3.0` alongside plain integers.
#[allow(clippy::cast_possible_truncation)]
fn urgency_as_integer(number: &serde_json::Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 1e9)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_only_variant_field() {
        let raw = r#"{"coords":[1,2],"urgencyLevel":3,"description":"d","date":"2026-01-01T10:00:00.000Z","id":"1234567890","type":"maintenance","trashType":"metal"}"#;
        let record: StoredIncidence = serde_json::from_str(raw).unwrap();
        let incidence = record.into_incidence().unwrap();

        let json = serde_json::to_value(StoredIncidence::from(&incidence)).unwrap();
        assert_eq!(json["type"], "maintenance");
        assert_eq!(json["trashType"], "metal");
        assert_eq!(json["urgencyLevel"], 3);
        assert_eq!(json["date"], "2026-01-01T10:00:00.000Z");
        assert!(json.get("surface").is_none());
        assert!(json.get("address").is_none());
    }

    #[test]
    fn accepts_integral_float_urgency() {
        let raw = r#"{"coords":[1,2],"urgencyLevel":2.0,"description":"d","date":0,"id":"1234567890","type":"infrastructure","surface":1}"#;
        let record: StoredIncidence = serde_json::from_str(raw).unwrap();
        assert_eq!(record.into_incidence().unwrap().urgency().value(), 2);

        let raw = r#"{"coords":[1,2],"urgencyLevel":2.5,"description":"d","date":0,"id":"1234567890","type":"infrastructure","surface":1}"#;
        let record: StoredIncidence = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            record.into_incidence(),
            Err(RecordError::BadUrgency(_))
        ));
    }

    #[test]
    fn reports_unknown_type_and_bad_date() {
        let raw = r#"{"coords":[1,2],"urgencyLevel":2,"description":"d","date":"yesterday","id":"1234567890","type":"infrastructure","surface":1}"#;
        let record: StoredIncidence = serde_json::from_str(raw).unwrap();
        assert!(matches!(record.into_incidence(), Err(RecordError::BadDate(_))));

        let raw = r#"{"coords":[1,2],"urgencyLevel":2,"description":"d","date":0,"id":"1234567890","type":"pothole"}"#;
        let record: StoredIncidence = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            record.into_incidence(),
            Err(RecordError::UnknownType(t)) if t == "pothole"
        ));
    }
}
