//! This module defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum rows to return per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 50,
        }
    }
}

/// One page of rows plus the paging metadata returned by list endpoints.
#[derive(Debug, PartialEq, Serialize)]
pub struct Page<T: Serialize> {
    /// The rows on this page.
    pub data: Vec<T>,
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of rows per page.
    pub per_page: u64,
    /// The total number of rows across all pages.
    pub total: u64,
    /// The total number of pages.
    pub total_pages: u64,
}

impl<T: Serialize> Page<T> {
    /// Wrap `rows` as the page `page` of a result set with `total` rows.
    pub fn new(rows: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data: rows,
            page,
            per_page,
            total,
            total_pages: page_count(total, per_page),
        }
    }
}

/// The number of pages needed to show `total` rows with `per_page` rows per page.
pub fn page_count(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 0;
    }

    total.div_ceil(per_page)
}
