//! Listing query parameters.

use serde::Deserialize;
use utoipa::IntoParams;

use persistence::pagination::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// `?page&per_page&search&management`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number, defaults to 1
    pub page: Option<i64>,
    /// Page size, defaults to 10, capped at 100
    pub per_page: Option<i64>,
    /// Case-insensitive name filter
    pub search: Option<String>,
    /// Only management (`true`) or only branch (`false`) records
    pub management: Option<bool>,
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        match self.page {
            Some(page) if page > 0 => page,
            _ => DEFAULT_PAGE_NUMBER as i64,
        }
    }

    pub fn per_page(&self) -> i64 {
        match self.per_page {
            Some(size) if size > 0 => size.min(MAX_PAGE_SIZE as i64),
            _ => DEFAULT_PAGE_SIZE as i64,
        }
    }

    /// Trimmed search keyword, `None` when blank.
    pub fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
