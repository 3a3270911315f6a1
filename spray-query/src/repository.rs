//! The filterable repository.
//!
//! A [`FilterableRepository`] is stateful: it accumulates filters, composes a
//! query from them on first use, and keeps the materialized result set until
//! the filter set changes.
//!
//! ```rust,ignore
//! let mut posts = FilterableRepository::<_, BlogPost>::new(&engine);
//! posts.attach_filter(Condition::eq("bp.published", true));
//!
//! println!("{} published posts", posts.count()?);
//! for row in posts.iter()? {
//!     println!("{}", row.as_entity().map_or("-", |p| p.title.as_str()));
//! }
//! ```
//!
//! Counting and iteration share one query: the second access reads the
//! cache. Attaching a filter, replacing the chain, or calling
//! [`invalidate`](FilterableRepository::invalidate) drops the cache so the
//! next access runs a new query.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::alias::entity_alias;
use crate::builder::QueryBuilder;
use crate::cache::ResultCache;
use crate::config::RepositoryConfig;
use crate::cursor::{RowCursor, Rows};
use crate::error::QueryResult;
use crate::filter::{EntityFilter, FilterChain, SharedFilter};
use crate::pagination::{Page, PageRequest};
use crate::row::Row;
use crate::traits::{Entity, QueryEngine};
use crate::types::OrderByField;

/// A stateful, filterable view over one entity type.
///
/// `E` executes queries; `M` is the entity type rows hydrate into.
pub struct FilterableRepository<E, M> {
    engine: E,
    filter_chain: FilterChain,
    hydrate: bool,
    default_order: Vec<OrderByField>,
    cache: ResultCache<M>,
}

impl<E, M> FilterableRepository<E, M>
where
    E: QueryEngine,
    M: Entity,
{
    /// Create a repository with the default configuration and no filters.
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, RepositoryConfig::default())
    }

    /// Create a repository from a configuration.
    pub fn with_config(engine: E, config: RepositoryConfig) -> Self {
        Self {
            engine,
            filter_chain: FilterChain::new(),
            hydrate: config.hydrate,
            default_order: config.default_order,
            cache: ResultCache::new(),
        }
    }

    /// Start building a repository with explicit configuration.
    pub fn builder(engine: E) -> RepositoryBuilder<E, M> {
        RepositoryBuilder::new(engine)
    }

    /// The query engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The qualified name of the entity type.
    pub fn entity_name(&self) -> &'static str {
        M::entity_name()
    }

    /// The alias the entity's table is labeled with in composed queries.
    pub fn entity_alias(&self) -> String {
        entity_alias(M::entity_name())
    }

    // ============== Hydration ==============

    /// Hydrate rows into entities (the default).
    ///
    /// An already populated cache keeps its rows as they are; call
    /// [`invalidate`](Self::invalidate) to reload them in the new mode.
    pub fn enable_hydration(&mut self) {
        self.hydrate = true;
    }

    /// Keep rows as scalar projections.
    ///
    /// An already populated cache keeps its rows as they are; call
    /// [`invalidate`](Self::invalidate) to reload them in the new mode.
    pub fn disable_hydration(&mut self) {
        self.hydrate = false;
    }

    /// Whether rows are kept as scalar projections.
    pub fn is_hydration_disabled(&self) -> bool {
        !self.hydrate
    }

    // ============== Filters ==============

    /// Attach a filter. Drops the cached result set.
    pub fn attach_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: EntityFilter + Send + Sync + 'static,
    {
        self.invalidate();
        self.filter_chain.add_filter(filter);
        self
    }

    /// Attach a filter that is shared with other chains. Drops the cached
    /// result set.
    pub fn attach_shared(&mut self, filter: SharedFilter) -> &mut Self {
        self.invalidate();
        self.filter_chain.add_shared(filter);
        self
    }

    /// Replace the whole filter chain. Drops the cached result set.
    pub fn set_filter_chain(&mut self, chain: FilterChain) {
        self.invalidate();
        self.filter_chain = chain;
    }

    /// The attached filters.
    pub fn filter_chain(&self) -> &FilterChain {
        &self.filter_chain
    }

    // ============== Query composition ==============

    /// A fresh builder for the entity's table under `alias`, carrying the
    /// configured default ordering and no filters.
    pub fn create_query_builder(&self, alias: &str) -> QueryBuilder {
        let mut qb = QueryBuilder::new(M::TABLE_NAME, alias);
        for field in &self.default_order {
            qb.add_order_by(field.clone());
        }
        qb
    }

    /// Run the attached filters against `qb`.
    pub fn filter_query_builder<'q>(&self, qb: &'q mut QueryBuilder) -> &'q mut QueryBuilder {
        self.filter_chain.apply(qb);
        qb
    }

    /// A fresh builder under `alias` with every attached filter applied.
    pub fn create_and_filter_query_builder(&self, alias: &str) -> QueryBuilder {
        let mut qb = self.create_query_builder(alias);
        self.filter_query_builder(&mut qb);
        qb
    }

    // ============== Result set ==============

    /// Drop the cached result set. Returns whether one was held.
    pub fn invalidate(&mut self) -> bool {
        let dropped = self.cache.invalidate();
        if dropped {
            debug!(entity = M::entity_name(), "Result cache invalidated");
        }
        dropped
    }

    /// Whether the result set is currently cached.
    pub fn is_populated(&self) -> bool {
        self.cache.is_populated()
    }

    /// Run the filtered query unless the result set is already cached.
    pub fn ensure_populated(&mut self) -> QueryResult<()> {
        self.rows().map(|_| ())
    }

    /// The full result set, loading it on first use.
    ///
    /// The load query adds no row cap of its own, but a limit or offset set
    /// by an attached filter is kept. The slice stays valid until the
    /// repository is next mutated.
    pub fn rows(&mut self) -> QueryResult<&[Row<M>]> {
        if self.cache.is_populated() {
            return Ok(self.cache.rows().unwrap_or_default());
        }
        let rows = self.load_rows()?;
        self.cache.get_or_try_populate(move || Ok(rows))
    }

    fn load_rows(&self) -> QueryResult<Vec<Row<M>>> {
        let alias = self.entity_alias();
        let qb = self.create_and_filter_query_builder(&alias);
        let rows = qb.get_query(&self.engine).get_rows::<M>(self.hydrate)?;
        debug!(
            entity = M::entity_name(),
            alias = %alias,
            rows = rows.len(),
            hydrated = self.hydrate,
            "Result cache populated"
        );
        Ok(rows)
    }

    /// Number of rows in the result set, loading it on first use.
    pub fn count(&mut self) -> QueryResult<usize> {
        Ok(self.rows()?.len())
    }

    /// Iterate over the result set, loading it on first use.
    ///
    /// Each call starts from the first row.
    pub fn iter(&mut self) -> QueryResult<Rows<'_, M>> {
        self.rows().map(Rows::new)
    }

    /// A positional cursor over the result set.
    ///
    /// Creating the cursor loads nothing.
    pub fn cursor(&mut self) -> RowCursor<'_, E, M> {
        RowCursor::new(self)
    }

    /// Fetch the first row of the filtered query with a one-row cap.
    ///
    /// Never reads or fills the cache. Zero rows is a
    /// [`RecordNotFound`](crate::ErrorCode::RecordNotFound) error.
    pub fn fetch_single(&self) -> QueryResult<Row<M>> {
        let alias = self.entity_alias();
        let mut qb = self.create_and_filter_query_builder(&alias);
        qb.set_max_results(Some(1));

        debug!(entity = M::entity_name(), alias = %alias, "Fetching single row");
        qb.get_query(&self.engine).get_single_row::<M>(self.hydrate)
    }

    /// Fetch one page of the filtered result set.
    ///
    /// Runs its own offset/limit query and leaves the cache untouched.
    pub fn page(&self, page: u64, per_page: u64) -> QueryResult<Page<M>> {
        let request = PageRequest::new(page, per_page);
        let mut qb = self.create_and_filter_query_builder(&self.entity_alias());
        qb.set_first_result(Some(request.offset()).filter(|&o| o > 0))
            .set_max_results(Some(request.per_page.saturating_add(1)));

        let rows = qb.get_query(&self.engine).get_rows::<M>(self.hydrate)?;
        Ok(Page::from_lookahead(request, rows))
    }

    pub(crate) fn cached_len(&self) -> usize {
        self.cache.len().unwrap_or(0)
    }

    pub(crate) fn cached_row(&self, index: usize) -> Option<&Row<M>> {
        self.cache.get(index)
    }
}

/// Clones start cold: the filter chain is copied, the cache is not.
impl<E: Clone, M> Clone for FilterableRepository<E, M> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            filter_chain: self.filter_chain.clone(),
            hydrate: self.hydrate,
            default_order: self.default_order.clone(),
            cache: ResultCache::new(),
        }
    }
}

impl<E, M> fmt::Debug for FilterableRepository<E, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterableRepository")
            .field("entity", &std::any::type_name::<M>())
            .field("filter_chain", &self.filter_chain)
            .field("hydrate", &self.hydrate)
            .field("default_order", &self.default_order)
            .field("cached_rows", &self.cache.len())
            .finish()
    }
}

/// Explicit construction for [`FilterableRepository`].
///
/// ```rust,ignore
/// let repo = FilterableRepository::<_, BlogPost>::builder(&engine)
///     .hydrate(false)
///     .order_by(OrderByField::desc("created_at"))
///     .configure(|chain| {
///         chain.add_filter(Condition::is_null("bp.deleted_at"));
///     })
///     .build();
/// ```
pub struct RepositoryBuilder<E, M> {
    engine: E,
    config: RepositoryConfig,
    filter_chain: FilterChain,
    _entity: PhantomData<fn() -> M>,
}

impl<E, M> RepositoryBuilder<E, M>
where
    E: QueryEngine,
    M: Entity,
{
    /// Create a builder with the default configuration.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: RepositoryConfig::default(),
            filter_chain: FilterChain::new(),
            _entity: PhantomData,
        }
    }

    /// Replace the configuration.
    pub fn config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the hydration mode.
    pub fn hydrate(mut self, hydrate: bool) -> Self {
        self.config.hydrate = hydrate;
        self
    }

    /// Append a default ordering entry.
    pub fn order_by(mut self, field: OrderByField) -> Self {
        self.config.default_order.push(field);
        self
    }

    /// Start from a prepared filter chain.
    pub fn filter_chain(mut self, chain: FilterChain) -> Self {
        self.filter_chain = chain;
        self
    }

    /// Append a filter.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: EntityFilter + Send + Sync + 'static,
    {
        self.filter_chain.add_filter(filter);
        self
    }

    /// Run a configuration callback against the filter chain.
    pub fn configure<C>(mut self, configure: C) -> Self
    where
        C: FnOnce(&mut FilterChain),
    {
        configure(&mut self.filter_chain);
        self
    }

    /// Build the repository. The cache starts empty.
    pub fn build(self) -> FilterableRepository<E, M> {
        let mut repo = FilterableRepository::with_config(self.engine, self.config);
        repo.filter_chain = self.filter_chain;
        repo
    }
}
