//! Pagination types for row listings.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    100
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Number of pages needed for `total` items; at least one.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        u32::try_from(total.div_ceil(per_page).max(1)).unwrap_or(u32::MAX)
    }

    /// Page number clamped into `1..=total_pages`.
    #[must_use]
    pub fn clamped_page(&self, total: u64) -> u32 {
        self.page.clamp(1, self.total_pages(total))
    }

    /// Offset of the first item of the clamped page.
    #[must_use]
    pub fn offset(&self, total: u64) -> u64 {
        u64::from(self.clamped_page(total) - 1) * u64::from(self.per_page.max(1))
    }

    /// Returns the page size.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.max(1))
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Slices one page out of `items`, clamping the requested page.
    #[must_use]
    pub fn paginate<I>(items: I, total: u64, request: &PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let offset = usize::try_from(request.offset(total)).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let data = items.into_iter().skip(offset).take(limit).collect();

        Self {
            data,
            meta: PageMeta {
                page: request.clamped_page(total),
                per_page: request.per_page.max(1),
                total,
                total_pages: request.total_pages(total),
            },
        }
    }
}
