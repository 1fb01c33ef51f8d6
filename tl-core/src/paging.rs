//! Pagination arithmetic shared by every list endpoint.
//!
//! Pages are one-based to match the external interface. Out-of-range
//! requests never error: the page number is clamped into `[1, pages]` and
//! the clamped value is echoed back, so a client rendering "page X of Y"
//! always shows an in-range page.

use serde::{Deserialize, Serialize};

/// The computed window for a single page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The effective (clamped) one-based page number.
    pub page: i64,
    /// The effective (clamped) page size.
    pub per_page: i64,
    /// Row offset for the underlying query.
    pub offset: i64,
    /// Row limit for the underlying query.
    pub limit: i64,
    /// Total number of items across all pages.
    pub total: i64,
    /// Total number of pages, always at least 1.
    pub pages: i64,
}

/// Compute the page window for `total_items` rows.
///
/// - `per_page < 1` is clamped to 1.
/// - `page < 1` is clamped to 1; `page > pages` is clamped to `pages`.
/// - `pages = max(1, ceil(total_items / per_page))`, so an empty data set
///   still reports one (empty) page.
pub fn page_window(total_items: i64, page: i64, per_page: i64) -> PageWindow {
    let total = total_items.max(0);
    let per_page = per_page.max(1);
    let pages = ((total + per_page - 1) / per_page).max(1);
    let page = page.clamp(1, pages);

    PageWindow {
        page,
        per_page,
        offset: (page - 1) * per_page,
        limit: per_page,
        total,
        pages,
    }
}

/// One page of results plus the pagination metadata reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// The items on this page, in query order.
    pub items: Vec<T>,
    /// One-based page number (clamped, always within `[1, pages]`).
    pub page: i64,
    /// Page size used for the window.
    pub per_page: i64,
    /// Total item count across all pages.
    pub total: i64,
    /// Total page count, at least 1.
    pub pages: i64,
}

impl<T> PageResult<T> {
    /// Assemble a page result from a window and the fetched items.
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            items,
            page: window.page,
            per_page: window.per_page,
            total: window.total,
            pages: window.pages,
        }
    }

    /// Map the items while keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple() {
        let w = page_window(20, 2, 10);
        assert_eq!(w.pages, 2);
        assert_eq!(w.page, 2);
        assert_eq!(w.offset, 10);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn test_partial_last_page() {
        let w = page_window(21, 3, 10);
        assert_eq!(w.pages, 3);
        assert_eq!(w.offset, 20);
    }

    #[test]
    fn test_empty_total_reports_one_page() {
        let w = page_window(0, 1, 10);
        assert_eq!(w.pages, 1);
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
        assert_eq!(w.total, 0);
    }

    #[test]
    fn test_page_clamped_low_and_high() {
        let low = page_window(25, 0, 10);
        assert_eq!(low.page, 1);
        assert_eq!(low.offset, 0);

        let high = page_window(25, 99, 10);
        assert_eq!(high.pages, 3);
        assert_eq!(high.page, 3);
        assert_eq!(high.offset, 20);
    }

    #[test]
    fn test_per_page_clamped() {
        let w = page_window(5, 1, 0);
        assert_eq!(w.per_page, 1);
        assert_eq!(w.pages, 5);
    }

    #[test]
    fn test_pages_at_least_one_for_any_input() {
        for total in [0, 1, 9, 10, 11, 100] {
            for per_page in [-3, 0, 1, 7, 10] {
                for page in [-1, 0, 1, 5, 1000] {
                    let w = page_window(total, page, per_page);
                    assert!(w.pages >= 1);
                    assert!(w.page >= 1 && w.page <= w.pages);
                    assert!(w.offset >= 0);
                }
            }
        }
    }

    #[test]
    fn test_page_result_map_keeps_metadata() {
        let w = page_window(3, 1, 2);
        let page = PageResult::new(w, vec![1, 2]);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.total, 3);
        assert_eq!(mapped.pages, 2);
    }
}
