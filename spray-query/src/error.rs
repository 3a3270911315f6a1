//! Error types for repository and query operations.
//!
//! Every failure surfaced by this crate is a [`QueryError`]: an [`ErrorCode`]
//! for programmatic handling, a message, optional [`ErrorContext`] and an
//! optional source error.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Query errors (not found, not unique, out of range)
//! - 3xxx: Connection errors
//! - 5xxx: Execution errors (syntax, database)
//! - 6xxx: Data errors (hydration)
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use spray_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::not_found("BlogPost");
//! assert_eq!(err.code, ErrorCode::RecordNotFound);
//! assert_eq!(err.code.code(), "S1001");
//!
//! let err = QueryError::out_of_range(3, 2);
//! assert!(err.is_programming_error());
//! ```
//!
//! Errors returned by a [`QueryEngine`](crate::traits::QueryEngine) travel
//! through the repository untouched: whatever the engine produced is what the
//! caller receives.

use std::fmt;

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Query errors (1xxx)
    /// Record not found (S1001).
    RecordNotFound = 1001,
    /// Multiple records found when expecting one (S1002).
    NotUnique = 1002,
    /// Cursor position outside the materialized result set (S1004).
    OutOfRange = 1004,

    // Connection errors (3xxx)
    /// Database connection failed (S3001).
    ConnectionFailed = 3001,

    // Query execution errors (5xxx)
    /// SQL syntax error (S5002).
    SqlSyntax = 5002,
    /// General database error (S5005).
    DatabaseError = 5005,

    // Data errors (6xxx)
    /// Row could not be hydrated into an entity (S6003).
    DeserializationError = 6003,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RecordNotFound => "Record not found",
            Self::NotUnique => "Multiple records found",
            Self::OutOfRange => "Cursor out of range",
            Self::ConnectionFailed => "Database connection failed",
            Self::SqlSyntax => "SQL syntax error",
            Self::DatabaseError => "Database error",
            Self::DeserializationError => "Hydration error",
            Self::InvalidConfiguration => "Invalid configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The entity involved.
    pub entity: Option<String>,
    /// The column involved.
    pub column: Option<String>,
    /// The SQL query (if available).
    pub sql: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur during repository and query operations.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Set the column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.context.column = Some(column.into());
        self
    }

    /// Set the SQL query.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a not found error.
    pub fn not_found(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::RecordNotFound,
            format!("No {} record found matching the query", entity),
        )
        .with_entity(&entity)
        .with_suggestion("Check the attached filters, or iterate the repository to accept empty results")
    }

    /// Create a not unique error.
    pub fn not_unique(entity: impl Into<String>, found: usize) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::NotUnique,
            format!("Expected a single {} record but found {}", entity, found),
        )
        .with_entity(&entity)
        .with_suggestion("Attach more selective filters to narrow down to a single record")
    }

    /// Create an out of range error for a cursor position.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::new(
            ErrorCode::OutOfRange,
            format!("Cursor position {} is outside a result set of {} rows", index, len),
        )
        .with_help("Check `is_valid()` before reading the current row")
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConnectionFailed, message)
    }

    /// Create a SQL syntax error.
    pub fn sql_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SqlSyntax, message)
            .with_suggestion("Check the SQL produced by the attached filters")
    }

    /// Create a general database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Create a hydration error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DeserializationError,
            format!("Failed to hydrate row: {}", message.into()),
        )
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    // ============== Error Checks ==============

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// Check if this is a not unique error.
    pub fn is_not_unique(&self) -> bool {
        self.code == ErrorCode::NotUnique
    }

    /// Check if this is an out of range error.
    pub fn is_out_of_range(&self) -> bool {
        self.code == ErrorCode::OutOfRange
    }

    /// Check if this error signals misuse of the API rather than a runtime condition.
    ///
    /// Callers should abort the current iteration instead of handling these.
    pub fn is_programming_error(&self) -> bool {
        self.code == ErrorCode::OutOfRange
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        self.code == ErrorCode::ConnectionFailed
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref entity) = self.context.entity {
            output.push_str(&format!("  → Entity: {}\n", entity));
        }
        if let Some(ref column) = self.context.column {
            output.push_str(&format!("  → Column: {}\n", column));
        }

        // SQL (truncated if too long)
        if let Some(ref sql) = self.context.sql {
            let sql_display = if sql.len() > 200 {
                let mut end = 200;
                while !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end])
            } else {
                sql.clone()
            };
            output.push_str(&format!("  → SQL: {}\n", sql_display));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}
