//! SQLite configuration.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::error::{SqliteError, SqliteResult};

/// SQLite database configuration.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database path (or in-memory).
    pub path: DatabasePath,
    /// Enable foreign keys.
    pub foreign_keys: bool,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: Option<u32>,
    /// Journal mode.
    pub journal_mode: JournalMode,
}

/// Database path configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabasePath {
    /// In-memory database.
    #[default]
    Memory,
    /// File-based database.
    File(PathBuf),
}

impl DatabasePath {
    /// Check if this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JournalMode {
    /// DELETE - Default SQLite mode, deletes journal after transaction.
    #[default]
    Delete,
    /// MEMORY - Keep journal in memory.
    Memory,
    /// WAL - Write-Ahead Logging.
    Wal,
}

impl JournalMode {
    /// Get the SQLite pragma value.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: DatabasePath::Memory,
            foreign_keys: true,
            busy_timeout_ms: Some(5000),
            journal_mode: JournalMode::Delete,
        }
    }
}

impl SqliteConfig {
    /// Configuration for an in-memory database.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Configuration for a file-based database.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: DatabasePath::File(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Parse a SQLite URL into configuration.
    ///
    /// Supported formats:
    /// - `sqlite::memory:` or `:memory:` - In-memory database
    /// - `sqlite://path/to/db.sqlite` - File-based database
    /// - `file:path/to/db.sqlite` - Alternative format
    ///
    /// Query parameters `foreign_keys`, `busy_timeout` and `journal_mode` are
    /// recognized.
    pub fn from_url(url: impl AsRef<str>) -> SqliteResult<Self> {
        let url = url.as_ref();
        let (location, query) = match url.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (url, None),
        };

        let path = location
            .strip_prefix("sqlite://")
            .or_else(|| location.strip_prefix("sqlite:"))
            .or_else(|| location.strip_prefix("file:"))
            .unwrap_or(location);

        let mut config = match path {
            "" => return Err(SqliteError::config("database path is required")),
            ":memory:" => Self::memory(),
            path => Self::file(path),
        };

        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "foreign_keys" => {
                    config.foreign_keys = value == "true" || value == "1";
                }
                "busy_timeout" => {
                    let ms = value.parse().map_err(|_| {
                        SqliteError::config(format!("invalid busy_timeout '{}'", value))
                    })?;
                    config.busy_timeout_ms = Some(ms);
                }
                "journal_mode" => {
                    config.journal_mode = match value.to_lowercase().as_str() {
                        "delete" => JournalMode::Delete,
                        "memory" => JournalMode::Memory,
                        "wal" => JournalMode::Wal,
                        other => {
                            return Err(SqliteError::config(format!(
                                "unknown journal_mode '{}'",
                                other
                            )));
                        }
                    };
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = Some(ms);
        self
    }

    /// Enable or disable foreign keys.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Set the journal mode.
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    /// Generate the initialization SQL for this configuration.
    pub fn init_sql(&self) -> String {
        let mut sql = String::new();

        let _ = writeln!(
            sql,
            "PRAGMA foreign_keys = {};",
            if self.foreign_keys { "ON" } else { "OFF" }
        );

        if !self.path.is_memory() {
            let _ = writeln!(sql, "PRAGMA journal_mode = {};", self.journal_mode.as_pragma());
        }

        if let Some(timeout) = self.busy_timeout_ms {
            let _ = writeln!(sql, "PRAGMA busy_timeout = {};", timeout);
        }

        sql
    }
}
