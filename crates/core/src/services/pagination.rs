//! Offset pagination helpers.

use serde::Serialize;

/// Default page size for listings.
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size a client may request.
pub const MAX_LIMIT: u64 = 50;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    /// Number of pages for `total` at this `limit`.
    pub pages: u64,
}

impl<T> Page<T> {
    /// Build a page, computing the page count.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            pages,
        }
    }

    #[must_use]
    pub const fn empty(page: u64, limit: u64) -> Self {
        Self::new(Vec::new(), 0, page, limit)
    }

    /// Convert the items, keeping the counts.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            pages: self.pages,
        }
    }
}

/// Clamp client paging parameters: `page` is 1-based, `limit` in `1..=MAX_LIMIT`.
#[must_use]
pub fn normalize(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    (
        page.unwrap_or(1).max(1),
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        assert_eq!(normalize(None, None), (1, 10));
        assert_eq!(normalize(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize(Some(3), Some(500)), (3, 50));
    }

    #[test]
    fn test_page_count() {
        assert_eq!(Page::new(vec![1, 2], 21, 1, 10).pages, 3);
        assert_eq!(Page::new(vec![1], 10, 1, 10).pages, 1);
        assert_eq!(Page::<u8>::empty(1, 10).pages, 0);
    }

    #[test]
    fn test_map_keeps_counts() {
        let page = Page::new(vec![1, 2], 12, 2, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.pages, 6);
    }
}
