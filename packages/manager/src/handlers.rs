//! Input event dispatch.
//!
//! The UI layer translates widget callbacks into [`MapEvent`]s and
//! [`ListEvent`]s and hands them to these functions together with the
//! manager. The outcome tells the caller what to re-render.

use incidence_map_incidence_models::{Coords, IncidenceId, IncidenceKind, UrgencyLevel};
use incidence_map_list::ListFilter;
use incidence_map_map::{MapDisplay, MapEvent};
use incidence_map_store::BlobStore;

use crate::{IncidenceManager, Selection};

/// Discrete input events raised by the list UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// A list item was clicked.
    ItemClicked(IncidenceId),
    /// An item's delete button was clicked.
    DeleteClicked(IncidenceId),
    NextPage,
    PrevPage,
    /// Type filter changed; `None` is "all".
    TypeFilterChanged(Option<IncidenceKind>),
    /// Urgency filter changed; `None` is "any".
    UrgencyFilterChanged(Option<UrgencyLevel>),
    ResetFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    /// The map panned to the clicked incidence.
    Panned(Coords),
    /// The incidence was deleted; the list must be re-rendered.
    Deleted(IncidenceId),
    /// The list moved to this page.
    PageChanged(usize),
    /// A new filter is active and the list is back on page 1.
    Filtered(ListFilter),
    /// Nothing changed (stale id, gated page control).
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapOutcome {
    /// Empty map clicked; the report form should open at these
    /// coordinates.
    FormRequested(Coords),
    /// A marker was clicked and its incidence revealed in the list.
    Revealed(Selection),
    /// Click on a marker the registry does not know.
    Unchanged,
}

pub fn handle_map_event<S: BlobStore, M: MapDisplay>(
    manager: &mut IncidenceManager<S, M>,
    event: MapEvent,
) -> MapOutcome {
    match event {
        MapEvent::MapClicked(coords) => {
            manager.record_map_click(coords);
            MapOutcome::FormRequested(coords)
        }
        MapEvent::MarkerClicked(handle) => manager
            .select_marker(handle)
            .map_or(MapOutcome::Unchanged, MapOutcome::Revealed),
    }
}

pub fn handle_list_event<S: BlobStore, M: MapDisplay>(
    manager: &mut IncidenceManager<S, M>,
    event: ListEvent,
) -> ListOutcome {
    match event {
        ListEvent::ItemClicked(id) => manager
            .select_incidence(&id)
            .map_or(ListOutcome::Unchanged, ListOutcome::Panned),
        ListEvent::DeleteClicked(id) => {
            if manager.delete(&id) {
                ListOutcome::Deleted(id)
            } else {
                ListOutcome::Unchanged
            }
        }
        ListEvent::NextPage => page_outcome(manager.next_page(), manager.current_page()),
        ListEvent::PrevPage => page_outcome(manager.prev_page(), manager.current_page()),
        ListEvent::TypeFilterChanged(kind) => {
            manager.filter_by_type(kind);
            ListOutcome::Filtered(manager.filter())
        }
        ListEvent::UrgencyFilterChanged(level) => {
            manager.filter_by_urgency(level);
            ListOutcome::Filtered(manager.filter())
        }
        ListEvent::ResetFilter => {
            manager.reset_filter();
            ListOutcome::Filtered(ListFilter::All)
        }
    }
}

const fn page_outcome(moved: bool, page: usize) -> ListOutcome {
    if moved {
        ListOutcome::PageChanged(page)
    } else {
        ListOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use incidence_map_geocoder::GeocodeError;
    use incidence_map_map::{HeadlessMap, MarkerHandle};
    use incidence_map_store::MemoryBlobStore;

    use super::*;
    use crate::ManagerConfig;
    use crate::fixtures::{infrastructure, maintenance};

    fn manager_with(count: usize) -> IncidenceManager<MemoryBlobStore, HeadlessMap> {
        let mut manager = IncidenceManager::new(MemoryBlobStore::new(), ManagerConfig::default());
        manager.attach_map(HeadlessMap::new(), None);
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap();
        for n in 0..count {
            let input = if n % 2 == 0 {
                infrastructure(2, 4.0)
            } else {
                maintenance(4, "glass")
            };
            let pending = manager.begin_create_at(input, now).unwrap();
            manager
                .complete_create(pending, Err(GeocodeError::Offline))
                .unwrap();
        }
        manager
    }

    #[test]
    fn map_click_requests_form_at_coords() {
        let mut manager = manager_with(0);
        let coords = Coords::new(40.41, -3.70);
        assert_eq!(
            handle_map_event(&mut manager, MapEvent::MapClicked(coords)),
            MapOutcome::FormRequested(coords)
        );
        assert_eq!(manager.last_map_click(), Some(coords));
    }

    #[test]
    fn marker_click_reveals_incidence() {
        let mut manager = manager_with(6);
        let oldest = manager.incidences()[5].id().clone();
        let handle = manager
            .markers()
            .unwrap()
            .find_by_incidence_id(&oldest)
            .unwrap();

        let MapOutcome::Revealed(selection) =
            handle_map_event(&mut manager, MapEvent::MarkerClicked(handle))
        else {
            panic!("expected a revealed selection");
        };
        assert_eq!(selection.id, oldest);
        assert_eq!(selection.page, 2);
        assert!(selection.page_changed);

        assert_eq!(
            handle_map_event(&mut manager, MapEvent::MarkerClicked(MarkerHandle::new(0))),
            MapOutcome::Unchanged
        );
    }

    #[test]
    fn list_events_drive_manager() {
        let mut manager = manager_with(6);
        let first = manager.incidences()[0].clone();

        assert_eq!(
            handle_list_event(&mut manager, ListEvent::ItemClicked(first.id().clone())),
            ListOutcome::Panned(first.coords())
        );
        assert_eq!(
            handle_list_event(&mut manager, ListEvent::PrevPage),
            ListOutcome::Unchanged
        );
        assert_eq!(
            handle_list_event(&mut manager, ListEvent::NextPage),
            ListOutcome::PageChanged(2)
        );
        assert_eq!(
            handle_list_event(
                &mut manager,
                ListEvent::TypeFilterChanged(Some(IncidenceKind::Maintenance))
            ),
            ListOutcome::Filtered(ListFilter::Type(IncidenceKind::Maintenance))
        );
        assert_eq!(manager.current_page(), 1);
        assert_eq!(manager.view().total_items, 3);

        assert_eq!(
            handle_list_event(&mut manager, ListEvent::UrgencyFilterChanged(None)),
            ListOutcome::Filtered(ListFilter::All)
        );
    }

    #[test]
    fn stale_delete_is_unchanged() {
        let mut manager = manager_with(2);
        let id = manager.incidences()[0].id().clone();

        assert_eq!(
            handle_list_event(&mut manager, ListEvent::DeleteClicked(id.clone())),
            ListOutcome::Deleted(id.clone())
        );
        assert_eq!(
            handle_list_event(&mut manager, ListEvent::DeleteClicked(id)),
            ListOutcome::Unchanged
        );
        assert_eq!(manager.len(), 1);
    }
}
