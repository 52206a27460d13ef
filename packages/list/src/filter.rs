//! Filtered views over the incidence collection.
//!
//! Filters replace each other rather than compose: a collection is viewed
//! through at most one [`ListFilter`] at a time. Every view preserves the
//! collection's order.

use incidence_map_incidence_models::{Incidence, IncidenceKind, UrgencyLevel};
use serde::{Deserialize, Serialize};

/// The active list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum ListFilter {
    /// No filtering.
    #[default]
    All,
    /// Only incidences of this kind.
    Type(IncidenceKind),
    /// Only incidences with exactly this urgency.
    Urgency(UrgencyLevel),
}

impl ListFilter {
    /// Whether `incidence` is part of the filtered view.
    #[must_use]
    pub fn matches(self, incidence: &Incidence) -> bool {
        match self {
            Self::All => true,
            Self::Type(kind) => incidence.kind() == kind,
            Self::Urgency(level) => incidence.urgency() == level,
        }
    }

    #[must_use]
    pub const fn is_all(self) -> bool {
        matches!(self, Self::All)
    }
}

/// Returns the subsequence of `incidences` selected by `filter`.
#[must_use]
pub fn apply(incidences: &[Incidence], filter: ListFilter) -> Vec<&Incidence> {
    incidences.iter().filter(|i| filter.matches(i)).collect()
}

/// Filters by kind; `None` selects everything.
#[must_use]
pub fn by_type(incidences: &[Incidence], kind: Option<IncidenceKind>) -> Vec<&Incidence> {
    apply(incidences, kind.map_or(ListFilter::All, ListFilter::Type))
}

/// Filters by exact urgency; `None` selects everything.
#[must_use]
pub fn by_urgency(incidences: &[Incidence], level: Option<UrgencyLevel>) -> Vec<&Incidence> {
    apply(incidences, level.map_or(ListFilter::All, ListFilter::Urgency))
}

/// The unfiltered view.
#[must_use]
pub fn reset(incidences: &[Incidence]) -> Vec<&Incidence> {
    apply(incidences, ListFilter::All)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn ids<'a>(view: &[&'a Incidence]) -> Vec<&'a str> {
        view.iter().map(|i| i.id().as_str()).collect()
    }

    #[test]
    fn by_type_keeps_matching_in_order() {
        let all = fixtures::incidences(6);
        let view = by_type(&all, Some(IncidenceKind::Maintenance));
        assert_eq!(ids(&view), ["0000000002", "0000000004", "0000000006"]);
        assert!(view.iter().all(|i| i.kind() == IncidenceKind::Maintenance));
    }

    #[test]
    fn by_urgency_is_exact_match() {
        let all = fixtures::incidences(10);
        let view = by_urgency(&all, Some(UrgencyLevel::Moderate));
        assert_eq!(ids(&view), ["0000000003", "0000000008"]);
    }

    #[test]
    fn none_selects_everything() {
        let all = fixtures::incidences(4);
        assert_eq!(by_type(&all, None).len(), 4);
        assert_eq!(by_urgency(&all, None).len(), 4);
    }

    #[test]
    fn filter_then_reset_restores_collection() {
        let all = fixtures::incidences(7);
        let filtered = by_type(&all, Some(IncidenceKind::Infrastructure));
        assert!(filtered.len() < all.len());

        let restored: Vec<Incidence> = reset(&all).into_iter().cloned().collect();
        assert_eq!(restored, all);
    }

    #[test]
    fn matches_follows_variant() {
        let all = fixtures::incidences(2);
        assert!(ListFilter::All.matches(&all[0]));
        assert!(ListFilter::Type(IncidenceKind::Infrastructure).matches(&all[0]));
        assert!(!ListFilter::Type(IncidenceKind::Infrastructure).matches(&all[1]));
        assert!(ListFilter::Urgency(UrgencyLevel::Low).matches(&all[1]));
        assert!(ListFilter::default().is_all());
    }
}
