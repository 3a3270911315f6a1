//! Integration tests for filterable repositories backed by SQLite.
//!
//! These tests run real SQL against an in-memory (or temporary file)
//! database and cover:
//! - Lazy population and memoization
//! - Filter attachment and invalidation
//! - Hydrated and scalar rows
//! - Cursor protocol and cold single-row reads
//! - Clone divergence and paging

use pretty_assertions::assert_eq;
use spray::prelude::*;
use spray::sqlite::{SqliteConfig, SqliteEngine};
use spray::{EntityFilter, ErrorCode, FilterChain, QueryBuilder};

#[derive(Debug, Clone, PartialEq)]
struct BlogPost {
    id: i64,
    title: String,
    published: bool,
    author_id: i64,
}

impl Entity for BlogPost {
    const TABLE_NAME: &'static str = "blog_posts";

    fn from_row(row: &ScalarRow) -> Result<Self, RowError> {
        Ok(Self {
            id: row.get_as("id")?,
            title: row.get_as("title")?,
            published: row.get_as("published")?,
            author_id: row.get_as("author_id")?,
        })
    }
}

/// Only published posts.
struct Published;

impl EntityFilter for Published {
    fn apply(&self, qb: &mut QueryBuilder) {
        let column = qb.column("published");
        qb.and_where(Condition::eq(column, true));
    }
}

/// Posts written by an author with the given name. Joins `users` once.
struct ByAuthor(&'static str);

impl EntityFilter for ByAuthor {
    fn apply(&self, qb: &mut QueryBuilder) {
        if !qb.has_join("au") {
            let on = format!("au.id = {}", qb.column("author_id"));
            qb.inner_join("users", "au", on);
        }
        qb.and_where(Condition::eq("au.name", self.0));
    }
}

fn seeded_engine() -> SqliteEngine {
    let engine = SqliteEngine::memory().expect("open in-memory database");
    engine
        .execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE blog_posts (
                 id INTEGER PRIMARY KEY,
                 title TEXT NOT NULL,
                 published INTEGER NOT NULL,
                 author_id INTEGER NOT NULL REFERENCES users(id)
             );
             INSERT INTO users (id, name) VALUES (1, 'ada'), (2, 'linus');
             INSERT INTO blog_posts (id, title, published, author_id) VALUES
                 (1, 'Ownership', 1, 1),
                 (2, 'Borrowing', 0, 1),
                 (3, 'Lifetimes', 1, 2),
                 (4, 'Traits', 1, 1),
                 (5, 'Macros', 0, 2);",
        )
        .expect("seed database");
    engine
}

fn repo(engine: &SqliteEngine) -> FilterableRepository<SqliteEngine, BlogPost> {
    FilterableRepository::builder(engine.clone())
        .order_by(OrderByField::asc("id"))
        .build()
}

fn ids(repo: &mut FilterableRepository<SqliteEngine, BlogPost>) -> Vec<i64> {
    repo.iter()
        .expect("load rows")
        .filter_map(|row| row.as_entity())
        .map(|post| post.id)
        .collect()
}

#[test]
fn test_unfiltered_count() {
    let engine = seeded_engine();
    let mut posts = repo(&engine);

    assert_eq!(posts.entity_alias(), "bp");
    assert_eq!(posts.count().unwrap(), 5);
    assert_eq!(ids(&mut posts), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_cache_is_reused_until_filter_attached() {
    let engine = seeded_engine();
    let mut posts = repo(&engine);
    assert_eq!(posts.count().unwrap(), 5);

    // Rows written after population stay invisible until the cache is dropped.
    engine
        .execute(
            "INSERT INTO blog_posts (id, title, published, author_id) VALUES ($1, $2, $3, $4)",
            &[6.into(), "Async".into(), true.into(), 2.into()],
        )
        .unwrap();
    assert_eq!(posts.count().unwrap(), 5);

    posts.attach_filter(Published);
    assert_eq!(posts.count().unwrap(), 4);
    assert_eq!(ids(&mut posts), vec![1, 3, 4, 6]);
}

#[test]
fn test_filters_compose_in_order() {
    let engine = seeded_engine();
    let mut posts = repo(&engine);
    posts.attach_filter(Published).attach_filter(ByAuthor("ada"));

    assert_eq!(ids(&mut posts), vec![1, 4]);

    let (sql, params) = posts.create_and_filter_query_builder("bp").build_sql();
    assert_eq!(
        sql,
        "SELECT bp.* FROM blog_posts bp INNER JOIN users au ON au.id = bp.author_id \
         WHERE bp.published = $1 AND au.name = $2 ORDER BY bp.id ASC"
    );
    assert_eq!(params, vec![FilterValue::Bool(true), FilterValue::String("ada".into())]);
}

#[test]
fn test_repeated_join_filter_joins_once() {
    let engine = seeded_engine();
    let mut posts = repo(&engine);
    posts.attach_filter(ByAuthor("ada")).attach_filter(ByAuthor("ada"));

    assert_eq!(ids(&mut posts), vec![1, 2, 4]);
}

#[test]
fn test_zero_row_filter() {
    let engine = seeded_engine();
    let mut posts = repo(&engine);
    posts.attach_filter(ByAuthor("nobody"));

    assert_eq!(posts.count().unwrap(), 0);

    let mut cursor = posts.cursor();
    cursor.restart().unwrap();
    assert!(!cursor.is_valid().unwrap());
    assert_eq!(cursor.current().unwrap_err().code, ErrorCode::OutOfRange);
}

#[test]
fn test_scalar_rows() {
    let engine = seeded_engine();
    let mut posts = FilterableRepository::<_, BlogPost>::with_config(
        engine.clone(),
        RepositoryConfig::new().hydrate(false).order_by(OrderByField::desc("id")),
    );

    let rows = posts.rows().unwrap();
    let first = rows[0].as_scalar().expect("scalar row");
    assert_eq!(first["id"], FilterValue::Int(5));
    assert_eq!(first["title"], FilterValue::String("Macros".into()));
    assert_eq!(first["published"], FilterValue::Int(0));
}

#[test]
fn test_cursor_walk_and_keys() {
    let engine = seeded_engine();
    let mut posts = repo(&engine);
    posts.attach_filter(Published);

    let mut cursor = posts.cursor();
    let mut seen = Vec::new();
    cursor.restart().unwrap();
    while cursor.is_valid().unwrap() {
        let row = cursor.current().unwrap();
        seen.push((cursor.key(), row.as_entity().map(|p| p.title.clone())));
        cursor.advance();
    }

    assert_eq!(
        seen,
        vec![
            (0, Some("Ownership".to_string())),
            (1, Some("Lifetimes".to_string())),
            (2, Some("Traits".to_string())),
        ]
    );
}

#[test]
fn test_cold_current_reads_single_row() {
    let engine = seeded_engine();
    let mut posts = FilterableRepository::<_, BlogPost>::builder(engine.clone())
        .order_by(OrderByField::desc("id"))
        .filter(Published)
        .build();

    let cursor = posts.cursor();
    let current = cursor.current().unwrap();
    assert!(!current.is_cached());
    assert_eq!(current.as_entity().map(|p| p.id), Some(4));
    drop(current);
    assert!(!cursor.repository().is_populated());
}

#[test]
fn test_cold_current_without_match() {
    let engine = seeded_engine();
    let mut posts = repo(&engine);
    posts.attach_filter(ByAuthor("nobody"));

    let err = posts.fetch_single().unwrap_err();
    assert!(err.is_not_found());
    assert!(!posts.is_populated());
}

#[test]
fn test_clone_divergence() {
    let engine = seeded_engine();
    let mut original = repo(&engine);
    assert_eq!(original.count().unwrap(), 5);

    let mut published = original.clone();
    published.attach_filter(Published);

    let mut by_linus = original.clone();
    by_linus.attach_filter(ByAuthor("linus"));

    assert_eq!(original.count().unwrap(), 5);
    assert_eq!(published.count().unwrap(), 3);
    assert_eq!(ids(&mut by_linus), vec![3, 5]);

    original.attach_filter(ByAuthor("ada"));
    assert_eq!(published.filter_chain().len(), 1);
    assert_eq!(ids(&mut original), vec![1, 2, 4]);
}

#[test]
fn test_prepared_chain() {
    let engine = seeded_engine();
    let chain = FilterChain::new()
        .with_filter(Published)
        .with_filter(Condition::gte("bp.id", 3));

    let mut posts = repo(&engine);
    posts.set_filter_chain(chain.clone());
    assert_eq!(ids(&mut posts), vec![3, 4]);

    // The same chain attached as one filter to another repository.
    let mut nested = repo(&engine);
    nested.attach_filter(chain).attach_filter(ByAuthor("ada"));
    assert_eq!(ids(&mut nested), vec![4]);
}

#[test]
fn test_paging_leaves_cache_cold() {
    let engine = seeded_engine();
    let posts = repo(&engine);

    let page = posts.page(2, 2).unwrap();
    let page_ids: Vec<_> = page.items.iter().filter_map(|r| r.as_entity()).map(|p| p.id).collect();
    assert_eq!(page_ids, vec![3, 4]);
    assert!(page.has_next);
    assert!(page.has_previous);

    let last = posts.page(3, 2).unwrap();
    assert_eq!(last.len(), 1);
    assert!(!last.has_next);
    assert!(!posts.is_populated());
}

#[test]
fn test_engine_errors_surface_unchanged() {
    let engine = SqliteEngine::memory().unwrap();
    let mut posts = FilterableRepository::<_, BlogPost>::new(engine);

    let err = posts.count().unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
    assert!(err.message.contains("no such table"));
    assert_eq!(err.context.sql.as_deref(), Some("SELECT bp.* FROM blog_posts bp"));
    assert!(!posts.is_populated());
}

#[test]
fn test_hydration_error_names_column() {
    let engine = SqliteEngine::memory().unwrap();
    engine
        .execute_batch(
            "CREATE TABLE blog_posts (id INTEGER PRIMARY KEY, title TEXT);
             INSERT INTO blog_posts (id, title) VALUES (1, NULL);",
        )
        .unwrap();

    let mut posts = FilterableRepository::<_, BlogPost>::new(engine);
    let err = posts.count().unwrap_err();
    assert_eq!(err.code, ErrorCode::DeserializationError);
    assert_eq!(err.context.column.as_deref(), Some("title"));

    posts.disable_hydration();
    assert_eq!(posts.count().unwrap(), 1);
}

#[test]
fn test_file_backed_repository() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.db");

    {
        let engine = SqliteEngine::open(&SqliteConfig::file(&path)).unwrap();
        engine
            .execute_batch(
                "CREATE TABLE blog_posts (id INTEGER PRIMARY KEY, title TEXT NOT NULL, \
                 published INTEGER NOT NULL, author_id INTEGER NOT NULL);
                 INSERT INTO blog_posts VALUES (1, 'Persisted', 1, 1);",
            )
            .unwrap();
    }

    let engine = SqliteEngine::open(&SqliteConfig::file(&path)).unwrap();
    let mut posts = FilterableRepository::<_, BlogPost>::new(engine);
    let post = posts.iter().unwrap().next().and_then(|r| r.as_entity()).cloned();
    assert_eq!(
        post,
        Some(BlogPost {
            id: 1,
            title: "Persisted".into(),
            published: true,
            author_id: 1,
        })
    );
}

#[test]
fn test_with_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    let engine = seeded_engine();
    let mut posts = repo(&engine);
    posts.attach_filter(Published);
    assert_eq!(posts.count().unwrap(), 3);
    posts.invalidate();
    assert_eq!(posts.count().unwrap(), 3);
}
