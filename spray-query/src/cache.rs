//! The memoized result set behind a repository.

use crate::error::QueryResult;
use crate::row::Row;

/// Holds at most one materialized result set.
///
/// The cache is either empty or fully populated; a failed population leaves
/// it empty.
#[derive(Debug, Clone)]
pub struct ResultCache<M> {
    rows: Option<Vec<Row<M>>>,
}

impl<M> Default for ResultCache<M> {
    fn default() -> Self {
        Self { rows: None }
    }
}

impl<M> ResultCache<M> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a result set is held. A populated cache may hold zero rows.
    pub fn is_populated(&self) -> bool {
        self.rows.is_some()
    }

    /// Number of cached rows, or `None` when empty.
    pub fn len(&self) -> Option<usize> {
        self.rows.as_ref().map(Vec::len)
    }

    /// The row at `index`, if populated and in range.
    pub fn get(&self, index: usize) -> Option<&Row<M>> {
        self.rows.as_ref().and_then(|rows| rows.get(index))
    }

    /// The cached rows, if populated.
    pub fn rows(&self) -> Option<&[Row<M>]> {
        self.rows.as_deref()
    }

    /// Drop the cached result set. Returns whether anything was dropped.
    pub fn invalidate(&mut self) -> bool {
        self.rows.take().is_some()
    }

    /// Return the cached rows, running `populate` first if empty.
    ///
    /// `populate` runs at most once per invalidation; on error the cache is
    /// left empty and the error returned as is.
    pub fn get_or_try_populate<F>(&mut self, populate: F) -> QueryResult<&[Row<M>]>
    where
        F: FnOnce() -> QueryResult<Vec<Row<M>>>,
    {
        if self.rows.is_none() {
            self.rows = Some(populate()?);
        }
        Ok(self.rows.as_deref().unwrap_or_default())
    }
}
