//! # spray-query
//!
//! Filterable, lazily loaded entity repositories for Spray.
//!
//! This crate provides:
//! - Entity filters and ordered filter chains
//! - An alias-scoped query builder that filters mutate
//! - A stateful repository that composes, executes and caches the filtered
//!   query, with counting, iteration and a positional cursor
//! - Hydrated or scalar result rows
//! - Configuration from code, environment or TOML
//!
//! ## Filters
//!
//! Anything implementing [`EntityFilter`] can be attached to a repository.
//! Closures and [`Condition`]s are filters too:
//!
//! ```rust
//! use spray_query::{Condition, FilterChain, OrderByField, QueryBuilder};
//!
//! let chain = FilterChain::new()
//!     .with_filter(Condition::eq("bp.published", true))
//!     .with_filter(|qb: &mut QueryBuilder| {
//!         qb.add_order_by(OrderByField::desc("created_at"));
//!     });
//!
//! let mut qb = QueryBuilder::new("blog_posts", "bp");
//! chain.apply(&mut qb);
//! assert_eq!(
//!     qb.build_sql().0,
//!     "SELECT bp.* FROM blog_posts bp WHERE bp.published = $1 ORDER BY bp.created_at DESC"
//! );
//! ```
//!
//! ## Repositories
//!
//! ```rust
//! use spray_query::prelude::*;
//!
//! struct BlogPost {
//!     id: i64,
//!     title: String,
//! }
//!
//! impl Entity for BlogPost {
//!     const TABLE_NAME: &'static str = "blog_posts";
//!
//!     fn from_row(row: &ScalarRow) -> Result<Self, RowError> {
//!         Ok(Self { id: row.get_as("id")?, title: row.get_as("title")? })
//!     }
//! }
//!
//! /// Answers every query with two posts.
//! struct TwoPosts;
//!
//! impl QueryEngine for TwoPosts {
//!     fn query_rows(&self, _sql: &str, _params: Vec<FilterValue>) -> QueryResult<Vec<ScalarRow>> {
//!         Ok((1..=2)
//!             .map(|id| {
//!                 let mut row = ScalarRow::new();
//!                 row.insert("id".into(), FilterValue::Int(id));
//!                 row.insert("title".into(), FilterValue::String(format!("Post {}", id)));
//!                 row
//!             })
//!             .collect())
//!     }
//! }
//!
//! let mut posts = FilterableRepository::<_, BlogPost>::new(TwoPosts);
//! assert_eq!(posts.entity_alias(), "bp");
//! assert_eq!(posts.count().unwrap(), 2);
//!
//! let titles: Vec<_> = posts
//!     .iter()
//!     .unwrap()
//!     .filter_map(|row| row.as_entity())
//!     .map(|post| post.title.as_str())
//!     .collect();
//! assert_eq!(titles, ["Post 1", "Post 2"]);
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`QueryResult`]. Errors raised by the
//! query engine pass through unchanged; errors raised here carry an
//! [`ErrorCode`]:
//!
//! ```rust
//! use spray_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::out_of_range(3, 3);
//! assert_eq!(err.code, ErrorCode::OutOfRange);
//! assert!(err.is_programming_error());
//! ```

pub mod alias;
pub mod builder;
pub mod cache;
pub mod condition;
pub mod config;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod logging;
pub mod pagination;
pub mod repository;
pub mod row;
pub mod traits;
pub mod types;
pub mod value;

#[cfg(test)]
mod testing;

pub use alias::entity_alias;
pub use builder::{Join, JoinKind, Query, QueryBuilder};
pub use cache::ResultCache;
pub use condition::Condition;
pub use config::{EnvSource, MapEnvSource, RepositoryConfig, StdEnvSource};
pub use cursor::{CurrentRow, RowCursor, Rows};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use filter::{EntityFilter, FilterChain, SharedFilter};
pub use pagination::{Page, PageRequest};
pub use repository::{FilterableRepository, RepositoryBuilder};
pub use row::{FromColumn, Row, RowError, ScalarRow, ScalarRowExt};
pub use traits::{Entity, QueryEngine};
pub use types::{NullsOrder, OrderByField, SortOrder};
pub use value::FilterValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::QueryBuilder;
    pub use crate::condition::Condition;
    pub use crate::config::RepositoryConfig;
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::filter::{EntityFilter, FilterChain};
    pub use crate::repository::FilterableRepository;
    pub use crate::row::{Row, RowError, ScalarRow, ScalarRowExt};
    pub use crate::traits::{Entity, QueryEngine};
    pub use crate::types::{OrderByField, SortOrder};
    pub use crate::value::FilterValue;
}
