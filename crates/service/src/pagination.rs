//! Page selection for catalog listings.

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// A bounded page of the catalog. Page numbers start at 1 and page sizes stay
/// within `1..=MAX_PER_PAGE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page: page.max(1), per_page: per_page.clamp(1, MAX_PER_PAGE) }
    }

    /// Values as sent in the query string; missing ones take the defaults.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    pub fn page(&self) -> u32 { self.page }

    pub fn per_page(&self) -> u32 { self.per_page }

    /// Zero-based page index as the storage paginator counts.
    pub fn index(&self) -> u64 { u64::from(self.page - 1) }

    pub fn size(&self) -> u64 { u64::from(self.per_page) }
}

impl Default for PageRequest {
    fn default() -> Self { Self::from_query(None, None) }
}
