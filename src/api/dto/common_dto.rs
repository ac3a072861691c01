//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl Page {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Slices `items` to this page and describes the result.
    #[must_use]
    pub fn apply<T>(self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(self.per_page)
        };
        let start = usize::try_from(
            u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page),
        )
        .unwrap_or(usize::MAX);
        let data = items
            .into_iter()
            .skip(start)
            .take(self.per_page as usize)
            .collect();
        (
            data,
            PaginationMeta {
                page: self.page,
                per_page: self.per_page,
                total,
                total_pages,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(
            Page::clamped(Some(0), Some(1_000)),
            Page {
                page: 1,
                per_page: MAX_PER_PAGE
            }
        );
        assert_eq!(Page::clamped(None, Some(0)).per_page, 1);
        assert_eq!(Page::clamped(None, None).per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn slices_requested_page() {
        let page = Page::clamped(Some(2), Some(2));
        let (data, meta) = page.apply(vec![1, 2, 3, 4, 5]);
        assert_eq!(data, vec![3, 4]);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn page_past_end_is_empty() {
        let (data, meta) = Page::clamped(Some(9), Some(10)).apply(vec![1, 2]);
        assert!(data.is_empty());
        assert_eq!(meta.total_pages, 1);
    }
}
