//! SQLite query engine for Spray.
//!
//! This crate executes the queries composed by `spray-query` repositories
//! against SQLite through `rusqlite`.
//!
//! # Features
//!
//! - Blocking execution on a shared connection
//! - `$n` placeholders translated to SQLite's `?n`
//! - Column-name-keyed scalar rows
//! - In-memory and file-based databases
//!
//! # Example
//!
//! ```rust,ignore
//! use spray_sqlite::{SqliteConfig, SqliteEngine};
//! use spray_query::FilterableRepository;
//!
//! let engine = SqliteEngine::open(&SqliteConfig::from_url("sqlite://./blog.db")?)?;
//! let mut posts = FilterableRepository::<_, BlogPost>::new(engine);
//! println!("{} posts", posts.count()?);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use config::{DatabasePath, JournalMode, SqliteConfig};
pub use engine::SqliteEngine;
pub use error::{SqliteError, SqliteResult};
