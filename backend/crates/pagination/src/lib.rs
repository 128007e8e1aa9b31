//! Page-window planning for listing and search endpoints.
//!
//! The planner turns a 1-based page number and a total item count into a
//! deterministic window (`skip`, first/last flags). It deliberately keeps the
//! historical last-page formula, `page == total / page_size` under integer
//! division, which misclassifies the final page whenever `total` is not an
//! exact multiple of `page_size`. Callers rely on the exact formula, so it is
//! pinned by the tests here rather than silently corrected.

use serde::Serialize;
use thiserror::Error;

/// Default number of items per page used by the feed and search endpoints.
pub const DEFAULT_PAGE_SIZE: u64 = 6;

/// Errors raised while planning a page window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The requested page was not a positive number. Callers are expected to
    /// normalise raw input with [`parse_page`] before planning.
    #[error("page number must be positive, got {page}")]
    InvalidPage { page: u64 },
    /// A zero page size would make every window empty and the last-page
    /// computation undefined.
    #[error("page size must be positive")]
    ZeroPageSize,
}

/// A computed window over an ordered collection.
///
/// `skip` is an internal offset for the storage query and is not exposed in
/// response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub is_first: bool,
    pub is_last: bool,
}

/// Compute the window for a 1-based `page` over `total` items.
///
/// # Examples
/// ```
/// use pagination::plan;
///
/// let window = plan(2, 13, 6).expect("valid window");
/// assert_eq!(window.skip, 6);
/// assert!(!window.is_first);
/// ```
pub fn plan(page: u64, total: u64, page_size: u64) -> Result<PageWindow, PlanError> {
    if page == 0 {
        return Err(PlanError::InvalidPage { page });
    }
    if page_size == 0 {
        return Err(PlanError::ZeroPageSize);
    }
    Ok(PageWindow {
        // Saturates for absurd page numbers; the window is empty either way.
        skip: (page - 1).saturating_mul(page_size),
        is_first: page == 1,
        // Historical floor-division formula, kept bit-for-bit.
        is_last: page == total / page_size,
    })
}

/// Normalise a raw page query parameter to a positive page number.
///
/// Missing, unparsable, or non-positive values all fall back to page 1,
/// matching the tolerant behaviour listing endpoints have always had.
///
/// # Examples
/// ```
/// use pagination::parse_page;
///
/// assert_eq!(parse_page(Some("3")), 3);
/// assert_eq!(parse_page(Some("0")), 1);
/// assert_eq!(parse_page(Some("garbage")), 1);
/// assert_eq!(parse_page(None), 1);
/// ```
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Response envelope for one page of items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub is_first: bool,
    pub is_last: bool,
}

impl<T> Page<T> {
    /// Assemble an envelope from a planned window and the fetched items.
    pub fn from_window(window: PageWindow, page: u64, total: u64, items: Vec<T>) -> Self {
        Self {
            items,
            total,
            page,
            is_first: window.is_first,
            is_last: window.is_last,
        }
    }
}
