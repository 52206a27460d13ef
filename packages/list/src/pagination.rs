//! Fixed-size pages over a sequence.
//!
//! Pages are 1-based. Page `n` covers `[(n - 1) * size, n * size)`; page 0
//! and pages past the end are valid requests that yield no items.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Number of items per page. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    /// Five items per page, as the incidence list has always shown.
    pub const DEFAULT: Self = match NonZeroUsize::new(5) {
        Some(size) => Self(size),
        None => unreachable!(),
    };

    /// Returns `None` for zero.
    #[must_use]
    pub const fn new(size: usize) -> Option<Self> {
        match NonZeroUsize::new(size) {
            Some(size) => Some(Self(size)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for PageSize {
    type Error = &'static str;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size).ok_or("page size must be at least 1")
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// One window over a sequence plus the state that drives the prev/next
/// controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a, T> {
    /// Items in the window; empty when `page` is out of range.
    pub items: &'a [T],
    /// Requested page, 1-based.
    pub page: usize,
    /// Number of pages the sequence spans.
    pub total_pages: usize,
    /// Disables "previous".
    pub is_first: bool,
    /// Disables "next".
    pub is_last: bool,
}

/// `ceil(len / size)`; zero only for an empty sequence.
#[must_use]
pub const fn total_pages(len: usize, size: PageSize) -> usize {
    len.div_ceil(size.get())
}

/// Slices `page` out of `sequence`.
#[must_use]
pub fn paginate<T>(sequence: &[T], page: usize, size: PageSize) -> Page<'_, T> {
    let total_pages = total_pages(sequence.len(), size);

    let items = match page.checked_sub(1) {
        Some(index) => {
            let start = index.saturating_mul(size.get());
            if start >= sequence.len() {
                &sequence[..0]
            } else {
                let end = start.saturating_add(size.get()).min(sequence.len());
                &sequence[start..end]
            }
        }
        None => &sequence[..0],
    };

    Page {
        items,
        page,
        total_pages,
        is_first: page <= 1,
        is_last: page >= total_pages || total_pages == 0,
    }
}

/// Current-page state over whatever sequence is being listed.
///
/// `next`/`prev` move unconditionally; callers gate them on
/// [`Page::is_last`]/[`Page::is_first`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    current_page: usize,
    page_size: PageSize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageSize::DEFAULT)
    }
}

impl Paginator {
    /// Starts on page 1.
    #[must_use]
    pub const fn new(page_size: PageSize) -> Self {
        Self {
            current_page: 1,
            page_size,
        }
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub const fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub const fn next(&mut self) {
        self.current_page = self.current_page.saturating_add(1);
    }

    pub const fn prev(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }

    /// Back to page 1.
    pub const fn reset(&mut self) {
        self.current_page = 1;
    }

    pub const fn set_page(&mut self, page: usize) {
        self.current_page = page;
    }

    /// Pulls the current page back inside `[1, max(1, total_pages)]`.
    /// Returns whether the page changed.
    pub fn clamp_to(&mut self, total_pages: usize) -> bool {
        let clamped = self.current_page.clamp(1, total_pages.max(1));
        let changed = clamped != self.current_page;
        self.current_page = clamped;
        changed
    }

    /// Page number holding the item at zero-based `index`:
    /// `ceil((index + 1) / size)`.
    #[must_use]
    pub const fn page_of_index(&self, index: usize) -> usize {
        index / self.page_size.get() + 1
    }

    /// The current page of `sequence`.
    #[must_use]
    pub fn page<'a, T>(&self, sequence: &'a [T]) -> Page<'a, T> {
        paginate(sequence, self.current_page, self.page_size)
    }
}
