//! This modules defines the common functionality for paging data.

use serde::Serialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_transactions_per_page: u64,
    /// The number of goals per page when not specified in a request.
    pub default_goals_per_page: u64,
    /// The largest page size a client may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_transactions_per_page: 50,
            default_goals_per_page: 20,
            max_page_size: 500,
        }
    }
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of items on a page.
    pub limit: u64,
}

impl PageRequest {
    /// Build a page request from the optional `page` and `limit` query parameters.
    ///
    /// Only a `limit` sent by the client is checked against
    /// [PaginationConfig::max_page_size]. `default_limit` is capped at the
    /// maximum instead so a misconfigured server still serves listings.
    ///
    /// # Errors
    /// Returns [Error::InvalidQuery] if `page` or `limit` is zero or `limit`
    /// exceeds [PaginationConfig::max_page_size].
    pub fn new(
        page: Option<u64>,
        limit: Option<u64>,
        default_limit: u64,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let page = page.unwrap_or(config.default_page);

        if page == 0 {
            return Err(Error::InvalidQuery("page must be 1 or greater".to_owned()));
        }

        let limit = match limit {
            Some(limit) if limit == 0 || limit > config.max_page_size => {
                return Err(Error::InvalidQuery(format!(
                    "limit must be between 1 and {}",
                    config.max_page_size
                )));
            }
            Some(limit) => limit,
            None => default_limit.clamp(1, config.max_page_size.max(1)),
        };

        Ok(Self { page, limit })
    }

    /// The number of items that come before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata sent alongside a page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// How many items match the filter across all pages.
    pub total_count: u64,
    /// The page that was returned.
    pub current_page: u64,
    /// How many pages there are in total.
    pub total_pages: u64,
    /// Whether there are items after this page.
    pub has_more: bool,
}

impl PageInfo {
    /// Describe the page `request` which returned `item_count` items out of `total_count`.
    pub fn new(request: &PageRequest, item_count: usize, total_count: u64) -> Self {
        Self {
            total_count,
            current_page: request.page,
            total_pages: total_count.div_ceil(request.limit),
            has_more: request.offset() + (item_count as u64) < total_count,
        }
    }
}
