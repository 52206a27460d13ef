//! In-memory [`MapDisplay`] with no rendering.
//!
//! Records placed markers and the current viewport so that tooling can run
//! without a map widget and tests can assert on what would have been drawn.

use std::collections::BTreeMap;

use incidence_map_incidence_models::Coords;

use crate::{MapDisplay, MarkerHandle, MarkerStyle, PanOptions};

/// A marker as recorded by [`HeadlessMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub coords: Coords,
    pub style: MarkerStyle,
}

/// Axis-aligned bounds of a set of markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coords,
    pub north_east: Coords,
}

impl Bounds {
    fn around(points: impl IntoIterator<Item = Coords>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Self>, p| {
            Some(acc.map_or(
                Self {
                    south_west: p,
                    north_east: p,
                },
                |b| Self {
                    south_west: Coords::new(b.south_west.lat.min(p.lat), b.south_west.lng.min(p.lng)),
                    north_east: Coords::new(b.north_east.lat.max(p.lat), b.north_east.lng.max(p.lng)),
                },
            ))
        })
    }

    #[must_use]
    pub fn center(&self) -> Coords {
        Coords::new(
            f64::midpoint(self.south_west.lat, self.north_east.lat),
            f64::midpoint(self.south_west.lng, self.north_east.lng),
        )
    }
}

/// A map display that only keeps state.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, PlacedMarker>,
    center: Option<Coords>,
    zoom: Option<u8>,
    last_fit: Option<Bounds>,
}

impl HeadlessMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the viewport centered on `center` at `zoom`.
    #[must_use]
    pub fn with_view(center: Coords, zoom: u8) -> Self {
        Self {
            center: Some(center),
            zoom: Some(zoom),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn marker(&self, handle: MarkerHandle) -> Option<&PlacedMarker> {
        self.markers.get(&handle)
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = (MarkerHandle, &PlacedMarker)> {
        self.markers.iter().map(|(h, m)| (*h, m))
    }

    #[must_use]
    pub const fn center(&self) -> Option<Coords> {
        self.center
    }

    #[must_use]
    pub const fn zoom(&self) -> Option<u8> {
        self.zoom
    }

    #[must_use]
    pub const fn last_fit(&self) -> Option<Bounds> {
        self.last_fit
    }
}

impl MapDisplay for HeadlessMap {
    fn place_marker(&mut self, coords: Coords, style: &MarkerStyle) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle::new(self.next_handle);
        self.markers.insert(
            handle,
            PlacedMarker {
                coords,
                style: style.clone(),
            },
        );
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if self.markers.remove(&handle).is_none() {
            log::debug!("Ignoring removal of unknown marker {handle:?}");
        }
    }

    fn pan_to(&mut self, coords: Coords, options: &PanOptions) {
        log::trace!(
            "Pan to ({}, {}) zoom {}",
            coords.lat,
            coords.lng,
            options.zoom
        );
        self.center = Some(coords);
        self.zoom = Some(options.zoom);
    }

    fn fit_to_markers(&mut self, handles: &[MarkerHandle]) {
        let bounds = Bounds::around(
            handles
                .iter()
                .filter_map(|h| self.markers.get(h))
                .map(|m| m.coords),
        );
        if let Some(bounds) = bounds {
            self.center = Some(bounds.center());
            self.last_fit = Some(bounds);
        }
    }
}
