//! List-item view model consumed by the incidence list renderer.

use chrono::{Datelike as _, Timelike as _};
use serde::Serialize;

use crate::{Incidence, IncidenceId, IncidenceKind};

/// Short Spanish month names, matching the `es-ES` short date format the
/// list has always shown.
const MONTHS_SHORT: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

const URGENCY_SLOTS: usize = 5;

/// Everything the list renderer needs for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidenceView {
    /// Identifier carried by the item's click and delete controls.
    pub id: IncidenceId,
    /// Variant discriminator.
    pub kind: IncidenceKind,
    /// `incidence--<kind>`
    pub css_class: String,
    /// Free-text description.
    pub description: String,
    /// Resolved street address, absent until the lookup succeeds.
    pub address: Option<String>,
    /// Kind label and description, as shown in the marker popup.
    pub display_label: String,
    /// Surface in m² or trash category label.
    pub detail_value: String,
    /// e.g. `"14 oct, 9:30"`
    pub formatted_date: String,
    /// Filled dots for the urgency level, hollow dots for the remainder.
    pub urgency_glyph: String,
}

impl From<&Incidence> for IncidenceView {
    fn from(incidence: &Incidence) -> Self {
        Self {
            id: incidence.id().clone(),
            kind: incidence.kind(),
            css_class: format!("incidence--{}", incidence.kind()),
            description: incidence.description().to_string(),
            address: incidence.address().map(str::to_string),
            display_label: incidence.display_label(),
            detail_value: incidence.detail_value(),
            formatted_date: format_date(incidence),
            urgency_glyph: urgency_glyph(incidence.urgency().value()),
        }
    }
}

fn format_date(incidence: &Incidence) -> String {
    let date = incidence.date();
    let month = MONTHS_SHORT[date.month0() as usize];
    format!(
        "{} {month}, {}:{:02}",
        date.day(),
        date.hour(),
        date.minute()
    )
}

/// `●` repeated `level` times, padded to five with `○`.
#[must_use]
pub fn urgency_glyph(level: u8) -> String {
    let filled = usize::from(level).min(URGENCY_SLOTS);
    let mut glyph = "●".repeat(filled);
    glyph.push_str(&"○".repeat(URGENCY_SLOTS - filled));
    glyph
}
