//! # Pagination
//!
//! Offset arithmetic and echo metadata for page-based listings.
//!
//! `page` and `limit` arrive already validated and defaulted. Nothing here
//! clamps `page` to the available range: a page past the end of the data
//! is a valid request whose result slice is empty.

use serde::{Deserialize, Serialize};

/// Page used when the client does not send one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client does not send one.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 50;
/// Largest accepted page number.
pub const MAX_PAGE: u32 = u32::MAX;

/// Pagination metadata echoed in `meta.pagination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

/// Result of [`paginate`]: where to start reading and what to echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Number of records to skip.
    pub offset: u64,
    pub meta: PaginationMeta,
}

impl PageWindow {
    /// Window for `page` before the total is known. `total` reads 0 until
    /// [`with_total`](Self::with_total) fills it in.
    pub fn for_page(page: u32, limit: u32) -> Self {
        Self {
            offset: page_offset(page, limit),
            meta: PaginationMeta {
                page,
                limit,
                total: 0,
            },
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.meta.total = total;
        self
    }

    /// Maximum number of records in the slice.
    pub fn limit(&self) -> u64 {
        u64::from(self.meta.limit)
    }

    /// Whether the window starts beyond the last record.
    pub fn is_past_end(&self) -> bool {
        self.offset >= self.meta.total && self.meta.total > 0
    }
}

/// Number of records before `page`. A `page` of 0 behaves like page 1.
fn page_offset(page: u32, limit: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(limit)
}

/// Compute `offset = (page - 1) * limit` and the echo metadata.
pub fn paginate(page: u32, limit: u32, total: u64) -> PageWindow {
    PageWindow::for_page(page, limit).with_total(total)
}
