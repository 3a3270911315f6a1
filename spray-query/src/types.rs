//! Ordering types shared by query builders and repository configuration.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Null handling in sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullsOrder {
    /// Nulls appear first in the results.
    First,
    /// Nulls appear last in the results.
    Last,
}

impl NullsOrder {
    /// Get the SQL clause for this null order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// A single ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderByField {
    /// The column name to order by.
    pub column: Cow<'static, str>,
    /// The sort order.
    #[serde(default)]
    pub order: SortOrder,
    /// Null handling (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullsOrder>,
}

impl OrderByField {
    /// Create a new order by field.
    pub fn new(column: impl Into<Cow<'static, str>>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
            nulls: None,
        }
    }

    /// Set null handling.
    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Create an ascending order.
    pub fn asc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    /// Create a descending order.
    pub fn desc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Desc)
    }

    /// Parse `column` or `column:asc|desc`.
    ///
    /// Returns `None` for an empty column or an unknown direction.
    pub fn parse(spec: &str) -> Option<Self> {
        let (column, direction) = match spec.split_once(':') {
            Some((column, direction)) => (column.trim(), Some(direction.trim())),
            None => (spec.trim(), None),
        };
        if column.is_empty() {
            return None;
        }
        let order = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(_) => return None,
        };
        Some(Self::new(column.to_string(), order))
    }

    /// Generate the SQL for this order by field.
    ///
    /// Unqualified columns are prefixed with `alias` when one is given.
    pub fn to_sql(&self, alias: &str) -> String {
        let mut sql = String::with_capacity(self.column.len() + alias.len() + 18);
        if !alias.is_empty() && !self.column.contains('.') {
            sql.push_str(alias);
            sql.push('.');
        }
        sql.push_str(&self.column);
        sql.push(' ');
        sql.push_str(self.order.as_sql());
        if let Some(nulls) = self.nulls {
            sql.push(' ');
            sql.push_str(nulls.as_sql());
        }
        sql
    }
}
