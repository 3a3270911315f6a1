//! Page-sized reads that bypass the repository cache.

use crate::row::Row;

/// Offset/limit window for a 1-indexed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1. Page 0 is treated as page 1.
    pub page: u64,
    /// Rows per page, at least 1.
    pub per_page: u64,
}

impl PageRequest {
    /// Create a page request. Page 0 and a page size of 0 are raised to 1.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)).saturating_mul(self.per_page)
    }
}

/// One page of rows with its position metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<M> {
    /// Rows on this page.
    pub items: Vec<Row<M>>,
    /// Page number, starting at 1.
    pub page: u64,
    /// Requested page size.
    pub per_page: u64,
    /// Whether a following page has at least one row.
    pub has_next: bool,
    /// Whether this is not the first page.
    pub has_previous: bool,
}

impl<M> Page<M> {
    /// Build a page from rows fetched with one extra lookahead row.
    pub(crate) fn from_lookahead(request: PageRequest, mut rows: Vec<Row<M>>) -> Self {
        let has_next = rows.len() as u64 > request.per_page;
        rows.truncate(request.per_page as usize);
        Self {
            items: rows,
            page: request.page,
            per_page: request.per_page,
            has_next,
            has_previous: request.page > 1,
        }
    }

    /// Number of rows on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<M> IntoIterator for Page<M> {
    type Item = Row<M>;
    type IntoIter = std::vec::IntoIter<Row<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
