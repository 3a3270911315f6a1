//! # Spray
//!
//! Filterable, lazily populated entity repositories for Rust.
//!
//! Spray provides:
//! - Repositories that accumulate filter objects and compose them into one query
//! - Lazy execution with a cached result set, invalidated when filters change
//! - Counting, iteration and a restartable cursor over the cached rows
//! - Hydrated entities or scalar projections, switchable per repository
//! - A SQLite engine (feature `sqlite`, on by default)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spray::prelude::*;
//! use spray::sqlite::SqliteEngine;
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
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     spray::logging::init();
//!
//!     let engine = SqliteEngine::from_url("sqlite://./blog.db")?;
//!     let mut posts = FilterableRepository::<_, BlogPost>::new(engine);
//!     posts.attach_filter(Condition::eq("bp.published", true));
//!
//!     println!("{} published", posts.count()?);
//!     for row in posts.iter()? {
//!         if let Some(post) = row.as_entity() {
//!             println!("#{} {}", post.id, post.title);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use spray_query::*;

/// SQLite query engine.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use spray_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use spray_query::prelude::*;

    #[cfg(feature = "sqlite")]
    pub use spray_sqlite::{SqliteConfig, SqliteEngine};
}
