//! Pagination utilities for service layer
//!
//! 1-based page requests, offset/limit windows and the page envelope returned
//! to callers.

use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// `(offset, limit)` for the store, or `None` when page or size is zero.
    /// Pages past the end are allowed and simply come back empty.
    pub fn window(self) -> Option<(u64, u64)> {
        if self.page == 0 || self.per_page == 0 {
            return None;
        }
        let per_page = self.per_page as u64;
        Some(((self.page as u64 - 1) * per_page, per_page))
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// `ceil(total_items / per_page)`; zero items means zero pages.
pub fn total_pages(total_items: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(per_page as u64)
}

/// One page of results plus the totals for the whole scope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_offset_and_limit() {
        assert_eq!(Pagination::new(1, 5).window(), Some((0, 5)));
        assert_eq!(Pagination::new(2, 5).window(), Some((5, 5)));
        assert_eq!(Pagination::new(40, 3).window(), Some((117, 3)));
    }

    #[test]
    fn zero_page_or_size_has_no_window() {
        assert_eq!(Pagination::new(0, 5).window(), None);
        assert_eq!(Pagination::new(1, 0).window(), None);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(7, 5), 2);
        assert_eq!(total_pages(11, 1), 11);
        for total in 0..50u64 {
            for size in 1..12u32 {
                let expected = (total as f64 / size as f64).ceil() as u64;
                assert_eq!(total_pages(total, size), expected, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }
}
