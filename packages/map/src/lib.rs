#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map display abstraction and incidence marker registry.
//!
//! The map widget is an opaque collaborator behind [`MapDisplay`]: it
//! places and removes markers, pans and fits bounds, and hands back
//! [`MarkerHandle`]s. [`MarkerRegistry`] owns the display and keeps exactly
//! one handle per live incidence, tagged with the incidence id, so that a
//! marker click can be resolved back to the list.
//!
//! [`HeadlessMap`] is an in-memory display for tooling and tests.

pub mod headless;
pub mod registry;

use incidence_map_incidence_models::{Coords, Incidence, IncidenceKind};
use serde::{Deserialize, Serialize};

pub use headless::HeadlessMap;
pub use registry::{Marker, MarkerRegistry};

/// Opaque marker reference issued by a [`MapDisplay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The map-display collaborator.
pub trait MapDisplay {
    /// Draws a marker at `coords` and returns its handle.
    fn place_marker(&mut self, coords: Coords, style: &MarkerStyle) -> MarkerHandle;

    /// Removes a previously placed marker. Unknown handles are ignored.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Moves the viewport to `coords`.
    fn pan_to(&mut self, coords: Coords, options: &PanOptions);

    /// Moves the viewport so that every marker in `handles` is visible.
    fn fit_to_markers(&mut self, handles: &[MarkerHandle]);
}

/// Discrete input events raised by the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Empty map area clicked; starts a new report at these coordinates.
    MapClicked(Coords),
    /// An incidence marker was clicked.
    MarkerClicked(MarkerHandle),
}

/// Viewport movement options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanOptions {
    pub zoom: u8,
    pub animate: bool,
    pub duration_ms: u64,
}

/// Marker icon geometry and CSS hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    /// Wrapper element class.
    pub class_name: String,
    /// Inner pin class, `marker-pin <kind>`.
    pub pin_class: String,
    pub size: (u32, u32),
    pub anchor: (u32, u32),
}

/// Popup bound to a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupOptions {
    pub content: String,
    /// `<kind>-popup`
    pub class_name: String,
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    /// Whether the popup opens as soon as the marker is placed.
    pub open_on_add: bool,
    /// Closes an initially opened popup after this many milliseconds.
    pub auto_close_after_ms: Option<u64>,
}

/// Everything the display needs to draw one incidence marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub kind: IncidenceKind,
    pub icon: MarkerIcon,
    pub popup: PopupOptions,
}

impl MarkerStyle {
    /// Style for `incidence`: a kind-colored pin whose popup shows the
    /// description.
    #[must_use]
    pub fn for_incidence(incidence: &Incidence, auto_close_after_ms: Option<u64>) -> Self {
        let kind = incidence.kind();
        Self {
            kind,
            icon: MarkerIcon {
                class_name: "custom-marker-wrapper".to_string(),
                pin_class: format!("marker-pin {kind}"),
                size: (30, 30),
                anchor: (15, 15),
            },
            popup: PopupOptions {
                content: incidence.description().to_string(),
                class_name: format!("{kind}-popup"),
                max_width: 250,
                min_width: 100,
                auto_close: true,
                close_on_click: false,
                open_on_add: true,
                auto_close_after_ms,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone as _, Utc};
    use incidence_map_incidence_models::{Coords, DetailInput, Incidence, IncidenceInput};

    pub fn incidence(id: &str, lat: f64, lng: f64) -> Incidence {
        Incidence::create(IncidenceInput {
            coords: Coords::new(lat, lng),
            urgency_level: 2,
            description: format!("report {id}"),
            detail: DetailInput::Infrastructure { surface: 2.0 },
            date: Some(Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap()),
            id: Some(id.to_string()),
            address: None,
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_uses_kind_classes_and_description() {
        let incidence = fixtures::incidence("0000000001", 1.0, 2.0);
        let style = MarkerStyle::for_incidence(&incidence, Some(3000));
        assert_eq!(style.icon.pin_class, "marker-pin infrastructure");
        assert_eq!(style.popup.class_name, "infrastructure-popup");
        assert_eq!(style.popup.content, "report 0000000001");
        assert_eq!(style.popup.auto_close_after_ms, Some(3000));
        assert!(!style.popup.close_on_click);
    }
}
