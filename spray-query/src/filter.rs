//! Entity filters and the ordered chain that applies them.
//!
//! An [`EntityFilter`] is anything that can mutate a [`QueryBuilder`]. The
//! repository never looks inside a filter: it only stores it and hands it the
//! builder when a query is composed.
//!
//! # Example
//!
//! ```rust
//! use spray_query::{Condition, EntityFilter, FilterChain, QueryBuilder};
//!
//! struct Published;
//!
//! impl EntityFilter for Published {
//!     fn apply(&self, qb: &mut QueryBuilder) {
//!         let column = qb.column("published");
//!         qb.and_where(Condition::eq(column, true));
//!     }
//! }
//!
//! let mut chain = FilterChain::new();
//! chain.add_filter(Published);
//! chain.add_filter(|qb: &mut QueryBuilder| {
//!     qb.set_max_results(Some(5));
//! });
//!
//! let mut qb = QueryBuilder::new("blog_posts", "bp");
//! chain.apply(&mut qb);
//! assert_eq!(
//!     qb.build_sql().0,
//!     "SELECT bp.* FROM blog_posts bp WHERE bp.published = $1 LIMIT 5"
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use crate::builder::QueryBuilder;
use crate::condition::Condition;

/// A unit that narrows, joins or otherwise shapes a composed query.
pub trait EntityFilter {
    /// Mutate the builder.
    fn apply(&self, qb: &mut QueryBuilder);

    /// Name of the filter, for logs and debug output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> EntityFilter for F
where
    F: Fn(&mut QueryBuilder),
{
    fn apply(&self, qb: &mut QueryBuilder) {
        self(qb)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

impl EntityFilter for Condition {
    fn apply(&self, qb: &mut QueryBuilder) {
        qb.and_where(self.clone());
    }

    fn name(&self) -> &str {
        "condition"
    }
}

/// A filter that can be held by several chains at once.
pub type SharedFilter = Arc<dyn EntityFilter + Send + Sync>;

/// An ordered sequence of filters.
///
/// Filters run in insertion order against the same builder, so later filters
/// see everything earlier ones added. Nothing is deduplicated or validated.
///
/// Cloning copies the sequence: the clone can gain or lose filters without
/// affecting the original. The filter objects themselves are shared.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<SharedFilter>,
}

impl FilterChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter.
    pub fn add_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: EntityFilter + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append a filter that is already shared.
    pub fn add_shared(&mut self, filter: SharedFilter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Builder-style [`add_filter`](Self::add_filter).
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: EntityFilter + Send + Sync + 'static,
    {
        self.add_filter(filter);
        self
    }

    /// Apply every filter, in insertion order, to `qb`.
    pub fn apply(&self, qb: &mut QueryBuilder) {
        for filter in &self.filters {
            tracing::trace!(filter = filter.name(), alias = qb.alias(), "Applying filter");
            filter.apply(qb);
        }
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Iterate over the filters in application order.
    pub fn iter(&self) -> impl Iterator<Item = &SharedFilter> {
        self.filters.iter()
    }

    /// Remove every filter.
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Names of the filters, in application order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl EntityFilter for FilterChain {
    fn apply(&self, qb: &mut QueryBuilder) {
        FilterChain::apply(self, qb)
    }

    fn name(&self) -> &str {
        "chain"
    }
}

impl Extend<SharedFilter> for FilterChain {
    fn extend<I: IntoIterator<Item = SharedFilter>>(&mut self, iter: I) {
        self.filters.extend(iter);
    }
}

impl FromIterator<SharedFilter> for FilterChain {
    fn from_iter<I: IntoIterator<Item = SharedFilter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names())
            .finish()
    }
}
