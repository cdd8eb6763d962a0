//! Pagination types for list endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::User;

/// Normalised page request.
///
/// Built from raw caller input: a page below 1 becomes 1, a non-positive
/// page size becomes the default and anything above the ceiling is clamped.
/// The page is capped so the row offset stays within `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        let page_size = u64::try_from(page_size)
            .ok()
            .filter(|s| *s > 0)
            .map_or(DEFAULT_PAGE_SIZE, |s| s.min(MAX_PAGE_SIZE));
        let last_addressable = i64::MAX as u64 / page_size + 1;
        let page = u64::try_from(page)
            .ok()
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PAGE_NUMBER)
            .min(last_addressable);

        Self { page, page_size }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` items
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[aliases(UserPage = Page<User>)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching items across all pages
    pub total: u64,
    /// Effective page number
    pub page: u64,
    /// Effective page size
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
            total_pages: request.total_pages(total),
        }
    }
}
