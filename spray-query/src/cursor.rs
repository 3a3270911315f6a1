//! Sequential access to a repository's result set.
//!
//! Two shapes are offered. [`Rows`] is a plain borrowed iterator over the
//! populated cache; a fresh call to
//! [`FilterableRepository::iter`](crate::FilterableRepository::iter) starts
//! over. [`RowCursor`] keeps the positional protocol (restart, advance,
//! validity, current row, key) with its own index, for callers that need to
//! peek at the current row before the result set is loaded.

use std::ops::Deref;

use crate::error::{QueryError, QueryResult};
use crate::repository::FilterableRepository;
use crate::row::Row;
use crate::traits::{Entity, QueryEngine};

/// Borrowed iterator over cached rows.
#[derive(Debug, Clone)]
pub struct Rows<'a, M> {
    inner: std::slice::Iter<'a, Row<M>>,
}

impl<'a, M> Rows<'a, M> {
    pub(crate) fn new(rows: &'a [Row<M>]) -> Self {
        Self { inner: rows.iter() }
    }
}

impl<'a, M> Iterator for Rows<'a, M> {
    type Item = &'a Row<M>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<M> ExactSizeIterator for Rows<'_, M> {}

impl<M> DoubleEndedIterator for Rows<'_, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

/// The row a cursor currently points at.
#[derive(Debug)]
pub enum CurrentRow<'a, M> {
    /// Read from the populated cache.
    Cached(&'a Row<M>),
    /// Fetched by a one-row query because the cache was cold.
    Fetched(Row<M>),
}

impl<M> CurrentRow<'_, M> {
    /// Whether the row came from the cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }

    /// Take an owned copy of the row.
    pub fn into_owned(self) -> Row<M>
    where
        M: Clone,
    {
        match self {
            Self::Cached(row) => row.clone(),
            Self::Fetched(row) => row,
        }
    }
}

impl<M> Deref for CurrentRow<'_, M> {
    type Target = Row<M>;

    fn deref(&self) -> &Row<M> {
        match self {
            Self::Cached(row) => row,
            Self::Fetched(row) => row,
        }
    }
}

/// A restartable, forward-only position over a repository's result set.
///
/// The cursor starts at index 0 without loading anything.
/// [`restart`](Self::restart) loads the result set if needed and rewinds;
/// [`advance`](Self::advance) only moves the index, and may move past the
/// end.
///
/// ```rust,ignore
/// let mut cursor = repo.cursor();
/// cursor.restart()?;
/// while cursor.is_valid()? {
///     let row = cursor.current()?;
///     println!("{}: {:?}", cursor.key(), *row);
///     cursor.advance();
/// }
/// ```
pub struct RowCursor<'r, E, M> {
    repo: &'r mut FilterableRepository<E, M>,
    index: usize,
}

impl<'r, E, M> RowCursor<'r, E, M>
where
    E: QueryEngine,
    M: Entity,
{
    pub(crate) fn new(repo: &'r mut FilterableRepository<E, M>) -> Self {
        Self { repo, index: 0 }
    }

    /// Load the result set if needed and move back to the first row.
    pub fn restart(&mut self) -> QueryResult<()> {
        self.repo.ensure_populated()?;
        self.index = 0;
        Ok(())
    }

    /// Move to the next position. Never fails, even past the end.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Whether the current position holds a row.
    ///
    /// Loads the result set if needed.
    pub fn is_valid(&mut self) -> QueryResult<bool> {
        Ok(self.index < self.repo.rows()?.len())
    }

    /// The row at the current position.
    ///
    /// With a cold cache this runs a query capped at one row and returns its
    /// result without loading the result set or moving the cursor. With a
    /// populated cache, a position past the end is an
    /// [`OutOfRange`](crate::ErrorCode::OutOfRange) error.
    pub fn current(&self) -> QueryResult<CurrentRow<'_, M>> {
        if !self.repo.is_populated() {
            return self.repo.fetch_single().map(CurrentRow::Fetched);
        }
        let len = self.repo.cached_len();
        self.repo
            .cached_row(self.index)
            .map(CurrentRow::Cached)
            .ok_or_else(|| QueryError::out_of_range(self.index, len))
    }

    /// The current position.
    pub fn key(&self) -> usize {
        self.index
    }

    /// The repository this cursor walks.
    pub fn repository(&self) -> &FilterableRepository<E, M> {
        &*self.repo
    }
}
