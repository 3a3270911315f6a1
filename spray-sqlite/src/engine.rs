//! SQLite query engine implementation.

use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use rusqlite::types::Value;
use spray_query::error::{QueryError, QueryResult};
use spray_query::row::ScalarRow;
use spray_query::traits::QueryEngine;
use spray_query::value::FilterValue;
use tracing::{debug, instrument};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};
use crate::types::{filter_value_to_sqlite, from_sqlite_value, translate_placeholders};

/// SQLite query engine for Spray repositories.
///
/// Wraps a single connection behind a mutex. Cloning is cheap and shares the
/// connection.
///
/// ```rust
/// use spray_sqlite::SqliteEngine;
/// use spray_query::FilterValue;
///
/// let engine = SqliteEngine::memory().unwrap();
/// engine.execute_batch("CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT);").unwrap();
/// engine.execute("INSERT INTO tags (name) VALUES ($1)", &["rust".into()]).unwrap();
///
/// let rows = engine.query("SELECT * FROM tags", &[]).unwrap();
/// assert_eq!(rows[0]["name"], FilterValue::String("rust".into()));
/// ```
#[derive(Clone)]
pub struct SqliteEngine {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEngine {
    /// Open a database from a configuration and apply its pragmas.
    #[instrument(skip(config), fields(memory = config.path.is_memory()))]
    pub fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory(),
            DatabasePath::File(path) => Connection::open(path),
        }
        .map_err(|e| SqliteError::connection(e.to_string()))?;

        conn.execute_batch(&config.init_sql())?;
        debug!("SQLite connection opened");

        Ok(Self::from_connection(conn))
    }

    /// Open a fresh in-memory database with the default configuration.
    pub fn memory() -> SqliteResult<Self> {
        Self::open(&SqliteConfig::memory())
    }

    /// Open the database described by a URL.
    pub fn from_url(url: &str) -> SqliteResult<Self> {
        Self::open(&SqliteConfig::from_url(url)?)
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Execute a batch of statements without parameters.
    #[instrument(skip(self, sql), fields(sql_len = sql.len()))]
    pub fn execute_batch(&self, sql: &str) -> SqliteResult<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    /// Execute one statement and return the number of affected rows.
    #[instrument(skip(self, params), fields(sql = %sql))]
    pub fn execute(&self, sql: &str, params: &[FilterValue]) -> SqliteResult<usize> {
        let sql = translate_placeholders(sql);
        let values: Vec<Value> = params.iter().map(filter_value_to_sqlite).collect();

        let conn = self.conn.lock();
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        debug!(affected, "Statement executed");
        Ok(affected)
    }

    /// Run a query and return every row keyed by column name.
    #[instrument(skip(self, params), fields(sql = %sql, params = params.len()))]
    pub fn query(&self, sql: &str, params: &[FilterValue]) -> SqliteResult<Vec<ScalarRow>> {
        let sql = translate_placeholders(sql);
        let values: Vec<Value> = params.iter().map(filter_value_to_sqlite).collect();

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(rusqlite::params_from_iter(values))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut scalar = ScalarRow::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                scalar.insert(name.clone(), from_sqlite_value(row.get_ref(idx)?));
            }
            out.push(scalar);
        }

        debug!(rows = out.len(), "Query returned");
        Ok(out)
    }
}

impl QueryEngine for SqliteEngine {
    fn query_rows(&self, sql: &str, params: Vec<FilterValue>) -> QueryResult<Vec<ScalarRow>> {
        self.query(sql, &params)
            .map_err(|e| QueryError::from(e).with_sql(sql))
    }
}

impl std::fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("connections", &Arc::strong_count(&self.conn))
            .finish()
    }
}
