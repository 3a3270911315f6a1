//! Error types for SQLite operations.

use spray_query::error::QueryError;
use thiserror::Error;

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl SqliteError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}

impl From<SqliteError> for QueryError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Sqlite(e) => from_driver_error(e),
            SqliteError::Config(msg) => QueryError::invalid_config(msg),
            SqliteError::Connection(msg) => QueryError::connection(msg),
        }
    }
}

fn from_driver_error(err: rusqlite::Error) -> QueryError {
    use rusqlite::ErrorCode as Code;

    let message = err.to_string();
    let mapped = match err.sqlite_error_code() {
        Some(Code::CannotOpen | Code::NotADatabase | Code::PermissionDenied) => {
            QueryError::connection(message)
        }
        Some(Code::DatabaseBusy | Code::DatabaseLocked) => QueryError::database(message)
            .with_help("Another connection holds a lock; raise the busy timeout or retry"),
        _ if message.contains("syntax error") => QueryError::sql_syntax(message),
        _ => QueryError::database(message),
    };
    mapped.with_source(err)
}
