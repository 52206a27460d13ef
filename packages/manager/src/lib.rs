#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The incidence manager: owner of the canonical collection.
//!
//! [`IncidenceManager`] applies creates and deletes, and keeps the
//! collection, the marker registry and the persisted blob consistent with
//! each other. It also holds the list state (active filter and current
//! page) and answers position/page queries for the list renderer.
//!
//! Within every mutation the registry is updated before the store is
//! saved, so the blob never reflects a collection the map has not caught
//! up with.
//!
//! Creation is two-phase so that the address lookup happens before any
//! state changes: [`IncidenceManager::begin_create`] validates and
//! reserves an id, and [`IncidenceManager::complete_create`] commits the
//! incidence once the lookup has resolved or failed.

pub mod config;
pub mod handlers;
pub mod ids;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use incidence_map_geocoder::{GeocodeError, ReverseGeocoder};
use incidence_map_incidence_models::{
    Coords, DetailInput, Incidence, IncidenceId, IncidenceInput, IncidenceKind, IncidenceView,
    UrgencyLevel, ValidationError,
};
use incidence_map_list::{ListFilter, Paginator, filter, pagination};
use incidence_map_map::{MapDisplay, MarkerHandle, MarkerRegistry, PanOptions};
use incidence_map_store::{BlobStore, IncidenceStore};
use serde::Serialize;

pub use config::{ConfigError, InsertionOrder, ManagerConfig};
pub use handlers::{ListEvent, ListOutcome, MapOutcome, handle_list_event, handle_map_event};

use crate::ids::IdGenerator;

/// Errors from manager operations.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The pending create was never started or has already completed.
    #[error("Unknown pending create {0}")]
    UnknownPending(PendingId),
}

/// Reservation for a create awaiting its address lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PendingId(u64);

impl std::fmt::Display for PendingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Form input for a new incidence. Id and date are assigned by the
/// manager.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncidence {
    pub coords: Coords,
    pub urgency_level: i64,
    pub description: String,
    pub detail: DetailInput,
}

/// Result of revealing an incidence in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub id: IncidenceId,
    /// Page now holding the incidence.
    pub page: usize,
    /// Whether the list has to be re-rendered to show it.
    pub page_changed: bool,
    /// Whether the active filter was dropped because it hid the incidence.
    pub filter_reset: bool,
}

/// Everything the list renderer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub items: Vec<IncidenceView>,
    pub page: usize,
    pub total_pages: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub filter: ListFilter,
    /// Length of the filtered view across all pages.
    pub total_items: usize,
}

/// Owns the incidence collection and keeps its collaborators in sync.
///
/// `S` is the blob store medium and `M` the map display. The map is
/// optional: until [`attach_map`](Self::attach_map) is called the manager
/// works on the collection and the store alone.
#[derive(Debug)]
pub struct IncidenceManager<S, M> {
    config: ManagerConfig,
    incidences: Vec<Incidence>,
    store: IncidenceStore<S>,
    markers: Option<MarkerRegistry<M>>,
    filter: ListFilter,
    paginator: Paginator,
    pending: BTreeMap<PendingId, Incidence>,
    next_pending: u64,
    ids: IdGenerator,
    last_map_click: Option<Coords>,
}

impl<S: BlobStore, M: MapDisplay> IncidenceManager<S, M> {
    /// Creates an empty manager over `blobs`. Call
    /// [`hydrate`](Self::hydrate) to load the persisted collection.
    #[must_use]
    pub fn new(blobs: S, config: ManagerConfig) -> Self {
        let store = IncidenceStore::with_key(blobs, config.storage_key.clone());
        let paginator = Paginator::new(config.page_size);
        Self {
            config,
            incidences: Vec::new(),
            store,
            markers: None,
            filter: ListFilter::All,
            paginator,
            pending: BTreeMap::new(),
            next_pending: 0,
            ids: IdGenerator::new(),
            last_map_click: None,
        }
    }

    /// Replaces the collection with the persisted one, in stored order.
    ///
    /// Pending creates are dropped and the list state goes back to the
    /// first unfiltered page. If a map is already attached its markers are
    /// rebuilt. Returns the number of incidences loaded.
    pub fn hydrate(&mut self) -> usize {
        self.incidences = self.store.load();
        self.pending.clear();
        self.filter = ListFilter::All;
        self.paginator.reset();

        if let Some(markers) = &mut self.markers {
            markers.clear();
            for incidence in &self.incidences {
                markers.add(incidence);
            }
        }

        log::info!("Hydrated {} incidence(s)", self.incidences.len());
        self.incidences.len()
    }

    /// Attaches the map display and places a marker for every incidence
    /// in the collection, then centers the view on `center` if given.
    ///
    /// A previously attached map is dropped without clearing it.
    pub fn attach_map(&mut self, map: M, center: Option<Coords>) {
        let mut markers =
            MarkerRegistry::new(map).with_popup_auto_close(self.config.popup_auto_close());

        if let Some(center) = center {
            markers.pan_to(
                center,
                &PanOptions {
                    zoom: self.config.focus_zoom,
                    animate: false,
                    duration_ms: 0,
                },
            );
        }

        for incidence in &self.incidences {
            markers.add(incidence);
        }
        log::debug!("Map attached with {} marker(s)", markers.len());

        if self.markers.replace(markers).is_some() {
            log::warn!("Replaced previously attached map");
        }
    }

    /// Validates `input` and reserves an id for it, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the input is invalid. Nothing is
    /// reserved in that case.
    pub fn begin_create(&mut self, input: NewIncidence) -> Result<PendingId, ValidationError> {
        self.begin_create_at(input, Utc::now())
    }

    /// [`begin_create`](Self::begin_create) with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the input is invalid.
    pub fn begin_create_at(
        &mut self,
        input: NewIncidence,
        now: DateTime<Utc>,
    ) -> Result<PendingId, ValidationError> {
        let draft = Incidence::create(IncidenceInput {
            coords: input.coords,
            urgency_level: input.urgency_level,
            description: input.description,
            detail: input.detail,
            date: Some(now),
            id: None,
            address: None,
        })?;

        let incidences = &self.incidences;
        let pending = &self.pending;
        let id = self.ids.next_id(now.timestamp_millis(), |id| {
            incidences.iter().any(|i| i.id() == id) || pending.values().any(|i| i.id() == id)
        });
        let draft = draft.with_id(id);

        self.next_pending += 1;
        let pending_id = PendingId(self.next_pending);
        log::debug!("Pending create {pending_id} reserved id {}", draft.id());
        self.pending.insert(pending_id, draft);
        Ok(pending_id)
    }

    /// Coordinates of a pending create, to resolve its address.
    #[must_use]
    pub fn pending_coords(&self, pending: PendingId) -> Option<Coords> {
        self.pending.get(&pending).map(Incidence::coords)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Commits a pending create with the outcome of its address lookup.
    ///
    /// A failed lookup is logged and leaves the address empty. The new
    /// incidence is inserted, given a marker (if a map is attached) and
    /// persisted, in that order. The list goes back to the first
    /// unfiltered page.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::UnknownPending`] if `pending` is not an
    /// outstanding reservation.
    pub fn complete_create(
        &mut self,
        pending: PendingId,
        address: Result<String, GeocodeError>,
    ) -> Result<Incidence, ManagerError> {
        let draft = self
            .pending
            .remove(&pending)
            .ok_or(ManagerError::UnknownPending(pending))?;

        let address = match address {
            Ok(address) => Some(address),
            Err(e) => {
                log::warn!("Address lookup failed for incidence {}: {e}", draft.id());
                None
            }
        };
        let incidence = draft.with_address(address);

        match self.config.insertion_order {
            InsertionOrder::NewestFirst => self.incidences.insert(0, incidence.clone()),
            InsertionOrder::OldestFirst => self.incidences.push(incidence.clone()),
        }
        if let Some(markers) = &mut self.markers {
            markers.add(&incidence);
        }
        self.persist();

        self.filter = ListFilter::All;
        self.paginator.reset();

        log::info!(
            "Created {} incidence {}",
            incidence.kind(),
            incidence.id()
        );
        Ok(incidence)
    }

    /// Validates, resolves the address through `geocoder`, and commits.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Validation`] if the input is invalid.
    pub async fn create(
        &mut self,
        input: NewIncidence,
        geocoder: &dyn ReverseGeocoder,
    ) -> Result<Incidence, ManagerError> {
        let coords = input.coords;
        let pending = self.begin_create(input)?;
        let address = geocoder.reverse_geocode(coords).await;
        self.complete_create(pending, address)
    }

    /// Removes the incidence with `id`, its marker and its stored record.
    ///
    /// Returns `false`, and changes nothing, if no such incidence exists.
    /// If the removal shrinks the active view below the current page, the
    /// current page is pulled back to the new last page.
    pub fn delete(&mut self, id: &IncidenceId) -> bool {
        let Some(index) = self.incidences.iter().position(|i| i.id() == id) else {
            log::warn!("Ignoring delete of unknown incidence {id}");
            return false;
        };

        self.incidences.remove(index);
        if let Some(markers) = &mut self.markers {
            if !markers.remove(id) {
                log::warn!("Incidence {id} had no marker");
            }
        }
        self.persist();

        if self.paginator.clamp_to(self.total_pages()) {
            log::debug!("Current page clamped to {}", self.paginator.current_page());
        }

        log::info!("Deleted incidence {id}");
        true
    }

    /// Clears the collection, the markers, pending creates and the stored
    /// blob.
    pub fn reset(&mut self) {
        self.incidences.clear();
        self.pending.clear();
        if let Some(markers) = &mut self.markers {
            markers.clear();
        }
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear stored incidences: {e}");
        }
        self.filter = ListFilter::All;
        self.paginator.reset();
        log::info!("Reset incidence collection");
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.incidences) {
            log::error!("Failed to persist incidences: {e}");
        }
    }

    /// The active filtered view.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Incidence> {
        filter::apply(&self.incidences, self.filter)
    }

    fn total_pages(&self) -> usize {
        pagination::total_pages(self.filtered().len(), self.paginator.page_size())
    }

    /// Page holding `id` within the active view, or `None` if the view
    /// does not contain it.
    #[must_use]
    pub fn locate_page(&self, id: &IncidenceId) -> Option<usize> {
        self.filtered()
            .iter()
            .position(|i| i.id() == id)
            .map(|index| self.paginator.page_of_index(index))
    }

    /// Moves the list to the page holding `id`.
    ///
    /// The current page only changes when the incidence is on another
    /// page. If the active filter hides it, the filter is reset first.
    /// Returns `None` for an unknown id.
    pub fn reveal(&mut self, id: &IncidenceId) -> Option<Selection> {
        let mut filter_reset = false;
        let page = match self.locate_page(id) {
            Some(page) => page,
            None if self.get(id).is_some() => {
                log::debug!("Incidence {id} hidden by {:?}, resetting filter", self.filter);
                self.filter = ListFilter::All;
                filter_reset = true;
                self.locate_page(id)?
            }
            None => {
                log::warn!("Cannot reveal unknown incidence {id}");
                return None;
            }
        };

        let page_changed = page != self.paginator.current_page();
        if page_changed {
            self.paginator.set_page(page);
        }

        Some(Selection {
            id: id.clone(),
            page,
            page_changed: page_changed || filter_reset,
            filter_reset,
        })
    }

    /// Map to list: resolves a clicked marker and reveals its incidence.
    pub fn select_marker(&mut self, handle: MarkerHandle) -> Option<Selection> {
        let id = self
            .markers
            .as_ref()
            .and_then(|markers| markers.resolve_handle(handle))
            .cloned();
        let Some(id) = id else {
            log::warn!("Ignoring click on unknown marker {handle:?}");
            return None;
        };
        self.reveal(&id)
    }

    /// List to map: pans to the incidence with `id`.
    ///
    /// Returns its coordinates, or `None` for an unknown id. Without an
    /// attached map nothing moves.
    pub fn select_incidence(&mut self, id: &IncidenceId) -> Option<Coords> {
        let Some(coords) = self.get(id).map(Incidence::coords) else {
            log::warn!("Cannot select unknown incidence {id}");
            return None;
        };

        if let Some(markers) = &mut self.markers {
            markers.pan_to(
                coords,
                &PanOptions {
                    zoom: self.config.focus_zoom,
                    animate: true,
                    duration_ms: self.config.pan_duration_ms,
                },
            );
        } else {
            log::debug!("No map attached, not panning to {id}");
        }
        Some(coords)
    }

    /// Records the coordinates of an empty-map click for the report form.
    pub const fn record_map_click(&mut self, coords: Coords) {
        self.last_map_click = Some(coords);
    }

    /// Coordinates of the last empty-map click.
    #[must_use]
    pub const fn last_map_click(&self) -> Option<Coords> {
        self.last_map_click
    }

    /// Incidence at zero-based `position` on the current page.
    #[must_use]
    pub fn incidence_at(&self, position: usize) -> Option<&Incidence> {
        let view = self.filtered();
        self.paginator.page(&view).items.get(position).copied()
    }

    /// Replaces the active filter and goes back to page 1.
    pub fn apply_filter(&mut self, filter: ListFilter) {
        log::debug!("Filter {:?} -> {filter:?}", self.filter);
        self.filter = filter;
        self.paginator.reset();
    }

    /// Filters by kind; `None` shows everything.
    pub fn filter_by_type(&mut self, kind: Option<IncidenceKind>) {
        self.apply_filter(kind.map_or(ListFilter::All, ListFilter::Type));
    }

    /// Filters by exact urgency; `None` shows everything.
    pub fn filter_by_urgency(&mut self, level: Option<UrgencyLevel>) {
        self.apply_filter(level.map_or(ListFilter::All, ListFilter::Urgency));
    }

    pub fn reset_filter(&mut self) {
        self.apply_filter(ListFilter::All);
    }

    /// Advances one page unless already on the last. Returns whether the
    /// page moved.
    pub fn next_page(&mut self) -> bool {
        if self.paginator.current_page() >= self.total_pages() {
            return false;
        }
        self.paginator.next();
        true
    }

    /// Goes back one page unless already on the first. Returns whether the
    /// page moved.
    pub fn prev_page(&mut self) -> bool {
        if self.paginator.current_page() <= 1 {
            return false;
        }
        self.paginator.prev();
        true
    }

    /// Jumps to `page` of the active view, clamped to its page range.
    pub fn go_to_page(&mut self, page: usize) {
        self.paginator.set_page(page);
        self.paginator.clamp_to(self.total_pages());
    }

    /// Renders the current page of the active view.
    #[must_use]
    pub fn view(&self) -> ListView {
        let filtered = self.filtered();
        let page = self.paginator.page(&filtered);
        ListView {
            items: page.items.iter().map(|i| IncidenceView::from(*i)).collect(),
            page: page.page,
            total_pages: page.total_pages,
            is_first: page.is_first,
            is_last: page.is_last,
            filter: self.filter,
            total_items: filtered.len(),
        }
    }

    /// Fits the map view to every marker.
    pub fn fit_all(&mut self) {
        if let Some(markers) = &mut self.markers {
            markers.fit_all();
        }
    }

    #[must_use]
    pub fn get(&self, id: &IncidenceId) -> Option<&Incidence> {
        self.incidences.iter().find(|i| i.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.incidences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidences.is_empty()
    }

    /// The canonical collection, in list order.
    #[must_use]
    pub fn incidences(&self) -> &[Incidence] {
        &self.incidences
    }

    #[must_use]
    pub const fn filter(&self) -> ListFilter {
        self.filter
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.paginator.current_page()
    }

    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    #[must_use]
    pub const fn markers(&self) -> Option<&MarkerRegistry<M>> {
        self.markers.as_ref()
    }

    #[must_use]
    pub const fn store(&self) -> &IncidenceStore<S> {
        &self.store
    }
}
