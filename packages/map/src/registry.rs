//! Incidence id ↔ marker handle bookkeeping.

use incidence_map_incidence_models::{Coords, Incidence, IncidenceId};

use crate::{MapDisplay, MarkerHandle, MarkerStyle, PanOptions};

/// A placed marker tagged with its owning incidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub incidence_id: IncidenceId,
    pub coords: Coords,
}

/// Owns the map display and the markers placed on it.
///
/// Holds at most one marker per incidence id. Lookups are linear scans;
/// the registry is sized for a hand-maintained list of reports.
#[derive(Debug)]
pub struct MarkerRegistry<M> {
    map: M,
    markers: Vec<Marker>,
    popup_auto_close_ms: Option<u64>,
}

impl<M: MapDisplay> MarkerRegistry<M> {
    #[must_use]
    pub const fn new(map: M) -> Self {
        Self {
            map,
            markers: Vec::new(),
            popup_auto_close_ms: None,
        }
    }

    /// Closes each new marker's popup after `ms` milliseconds.
    #[must_use]
    pub fn with_popup_auto_close(mut self, ms: Option<u64>) -> Self {
        self.popup_auto_close_ms = ms;
        self
    }

    /// Places a marker for `incidence`.
    ///
    /// An existing marker for the same id is replaced, so the registry
    /// never holds two handles for one incidence.
    pub fn add(&mut self, incidence: &Incidence) -> MarkerHandle {
        if self.remove(incidence.id()) {
            log::warn!("Replaced existing marker for incidence {}", incidence.id());
        }

        let style = MarkerStyle::for_incidence(incidence, self.popup_auto_close_ms);
        let handle = self.map.place_marker(incidence.coords(), &style);
        self.markers.push(Marker {
            handle,
            incidence_id: incidence.id().clone(),
            coords: incidence.coords(),
        });
        log::debug!("Placed marker {handle:?} for incidence {}", incidence.id());
        handle
    }

    /// Removes the marker for `id`. Returns `false`, and does nothing, if
    /// no marker is registered for it.
    pub fn remove(&mut self, id: &IncidenceId) -> bool {
        let Some(index) = self.markers.iter().position(|m| &m.incidence_id == id) else {
            return false;
        };
        let marker = self.markers.remove(index);
        self.map.remove_marker(marker.handle);
        log::debug!("Removed marker {:?} for incidence {id}", marker.handle);
        true
    }

    /// Removes every marker from the map.
    pub fn clear(&mut self) {
        for marker in self.markers.drain(..) {
            self.map.remove_marker(marker.handle);
        }
    }

    #[must_use]
    pub fn find_by_incidence_id(&self, id: &IncidenceId) -> Option<MarkerHandle> {
        self.markers
            .iter()
            .find(|m| &m.incidence_id == id)
            .map(|m| m.handle)
    }

    /// Resolves a clicked marker back to its incidence.
    #[must_use]
    pub fn resolve_handle(&self, handle: MarkerHandle) -> Option<&IncidenceId> {
        self.markers
            .iter()
            .find(|m| m.handle == handle)
            .map(|m| &m.incidence_id)
    }

    pub fn pan_to(&mut self, coords: Coords, options: &PanOptions) {
        self.map.pan_to(coords, options);
    }

    /// Fits the viewport to every registered marker. No-op when empty.
    pub fn fit_all(&mut self) {
        if self.markers.is_empty() {
            return;
        }
        let handles: Vec<MarkerHandle> = self.markers.iter().map(|m| m.handle).collect();
        self.map.fit_to_markers(&handles);
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Ids with a registered marker, in placement order.
    pub fn ids(&self) -> impl Iterator<Item = &IncidenceId> {
        self.markers.iter().map(|m| &m.incidence_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub const fn map(&self) -> &M {
        &self.map
    }
}
