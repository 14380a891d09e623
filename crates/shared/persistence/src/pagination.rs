//! Pagination types shared by both repositories.

use serde::{Deserialize, Serialize};

/// Default page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum allowed items per page
pub const MAX_PAGE_SIZE: u64 = 100;

/// Coerce a raw page request: non-positive values fall back to the defaults.
pub fn coerce(page: i64, page_size: i64) -> (u64, u64) {
    let page = if page > 0 { page as u64 } else { DEFAULT_PAGE_NUMBER };
    let size = if page_size > 0 {
        page_size as u64
    } else {
        DEFAULT_PAGE_SIZE
    };
    (page, size)
}

/// `ceil(total / size)`, zero when `size` is zero.
pub fn total_pages(total: u64, size: u64) -> u64 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(size)
}

/// Offset of the first row of `page` (1-indexed).
pub fn offset(page: u64, size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(size)
}

/// One page of records plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    /// Matches under the filter, ignoring limit and offset
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    /// Build a result, coercing non-positive `page`/`limit` to 1 and 10.
    pub fn new(data: Vec<T>, total: u64, page: i64, limit: i64) -> Self {
        let (page, limit) = coerce(page, limit);
        Self {
            data,
            total,
            page,
            limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.limit)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn metadata(&self) -> PageMetadata {
        PageMetadata {
            page: self.page,
            size: self.limit,
            total_item: self.total,
            total_page: self.total_pages(),
        }
    }
}

/// Page metadata as rendered in list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub page: u64,
    pub size: u64,
    pub total_item: u64,
    pub total_page: u64,
}

impl PageMetadata {
    pub fn new(page: i64, size: i64, total: u64) -> Self {
        let (page, size) = coerce(page, size);
        Self {
            page,
            size,
            total_item: total,
            total_page: total_pages(total, size),
        }
    }
}
