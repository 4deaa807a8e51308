//! Offset pagination for the post listing.

use serde::Serialize;

use crate::models::Post;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_MAX_LIMIT: i64 = 100;

/// A clamped page request: `page >= 1` and `1 <= limit <= max_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64, max_limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, max_limit.max(1)),
        }
    }

    /// Builds a request from raw query-string values. Anything missing or
    /// non-numeric falls back to the defaults before clamping.
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: i64,
        max_limit: i64,
    ) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<i64>().ok());
        Self::new(
            parse(page).unwrap_or(DEFAULT_PAGE),
            parse(limit).unwrap_or(default_limit),
            max_limit,
        )
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT, DEFAULT_MAX_LIMIT)
    }
}

/// One page of posts plus the totals needed to navigate the rest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub total_posts: u64,
    pub total_pages: u64,
    pub current_page: i64,
    pub posts: Vec<Post>,
}
