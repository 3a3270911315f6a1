//! Result rows: scalar projections and hydrated entities.
//!
//! Every engine hands back [`ScalarRow`]s, an ordered map from column name to
//! [`FilterValue`]. Whether a repository keeps those projections as they are or
//! hydrates them into entities depends on its hydration mode; either way the
//! cached result set is a sequence of [`Row`].
//!
//! ```rust
//! use spray_query::row::{ScalarRow, ScalarRowExt};
//! use spray_query::FilterValue;
//!
//! let mut row = ScalarRow::new();
//! row.insert("id".into(), FilterValue::Int(7));
//! row.insert("title".into(), FilterValue::String("Hello".into()));
//!
//! let id: i64 = row.get_as("id").unwrap();
//! let title: String = row.get_as("title").unwrap();
//! assert_eq!((id, title.as_str()), (7, "Hello"));
//! ```

use indexmap::IndexMap;
use thiserror::Error;

use crate::error::QueryError;
use crate::value::FilterValue;

/// A scalar projection: column name to value, in select order.
pub type ScalarRow = IndexMap<String, FilterValue>;

/// Error type for row hydration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// Column not found.
    #[error("column '{0}' not found")]
    ColumnNotFound(String),
    /// Type conversion error.
    #[error("type conversion error for '{column}': {message}")]
    TypeConversion {
        /// Column being converted.
        column: String,
        /// What went wrong.
        message: String,
    },
    /// Null value in non-nullable column.
    #[error("unexpected null in column '{0}'")]
    UnexpectedNull(String),
}

impl From<RowError> for QueryError {
    fn from(err: RowError) -> Self {
        let column = match &err {
            RowError::ColumnNotFound(col) | RowError::UnexpectedNull(col) => col.clone(),
            RowError::TypeConversion { column, .. } => column.clone(),
        };
        QueryError::deserialization(err.to_string())
            .with_column(column)
            .with_source(err)
    }
}

/// A single materialized row of a result set.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<M> {
    /// A fully hydrated entity.
    Entity(M),
    /// A scalar projection, kept when hydration is disabled.
    Scalar(ScalarRow),
}

impl<M> Row<M> {
    /// Check if this row holds a hydrated entity.
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }

    /// Check if this row holds a scalar projection.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Borrow the hydrated entity, if any.
    pub fn as_entity(&self) -> Option<&M> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Scalar(_) => None,
        }
    }

    /// Borrow the scalar projection, if any.
    pub fn as_scalar(&self) -> Option<&ScalarRow> {
        match self {
            Self::Scalar(row) => Some(row),
            Self::Entity(_) => None,
        }
    }

    /// Take the hydrated entity, if any.
    pub fn into_entity(self) -> Option<M> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Scalar(_) => None,
        }
    }

    /// Take the scalar projection, if any.
    pub fn into_scalar(self) -> Option<ScalarRow> {
        match self {
            Self::Scalar(row) => Some(row),
            Self::Entity(_) => None,
        }
    }
}

/// Types that can be read out of a single column value.
pub trait FromColumn: Sized {
    /// Convert the value stored in `column`.
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError>;
}

fn mismatch(column: &str, expected: &str, value: &FilterValue) -> RowError {
    if value.is_null() {
        return RowError::UnexpectedNull(column.to_string());
    }
    RowError::TypeConversion {
        column: column.to_string(),
        message: format!("expected {}, found {}", expected, value.type_name()),
    }
}

impl FromColumn for i64 {
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError> {
        match value {
            FilterValue::Int(v) => Ok(*v),
            FilterValue::Bool(b) => Ok(i64::from(*b)),
            other => Err(mismatch(column, "int", other)),
        }
    }
}

impl FromColumn for i32 {
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError> {
        let wide = i64::from_column(column, value)?;
        i32::try_from(wide).map_err(|_| RowError::TypeConversion {
            column: column.to_string(),
            message: format!("{} does not fit in i32", wide),
        })
    }
}

impl FromColumn for f64 {
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError> {
        match value {
            FilterValue::Float(v) => Ok(*v),
            FilterValue::Int(v) => Ok(*v as f64),
            other => Err(mismatch(column, "float", other)),
        }
    }
}

impl FromColumn for bool {
    // SQLite and friends hand booleans back as 0/1 integers.
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError> {
        match value {
            FilterValue::Bool(b) => Ok(*b),
            FilterValue::Int(0) => Ok(false),
            FilterValue::Int(1) => Ok(true),
            other => Err(mismatch(column, "bool", other)),
        }
    }
}

impl FromColumn for String {
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError> {
        match value {
            FilterValue::String(s) => Ok(s.clone()),
            FilterValue::Json(j) => Ok(j.to_string()),
            other => Err(mismatch(column, "string", other)),
        }
    }
}

impl FromColumn for serde_json::Value {
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError> {
        match value {
            FilterValue::Json(j) => Ok(j.clone()),
            FilterValue::String(s) => serde_json::from_str(s).map_err(|e| RowError::TypeConversion {
                column: column.to_string(),
                message: e.to_string(),
            }),
            other => Err(mismatch(column, "json", other)),
        }
    }
}

impl FromColumn for FilterValue {
    fn from_column(_column: &str, value: &FilterValue) -> Result<Self, RowError> {
        Ok(value.clone())
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn from_column(column: &str, value: &FilterValue) -> Result<Self, RowError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_column(column, value).map(Some)
        }
    }
}

/// Typed column access on a [`ScalarRow`].
pub trait ScalarRowExt {
    /// Read and convert a column.
    fn get_as<T: FromColumn>(&self, column: &str) -> Result<T, RowError>;
}

impl ScalarRowExt for ScalarRow {
    fn get_as<T: FromColumn>(&self, column: &str) -> Result<T, RowError> {
        let value = IndexMap::get(self, column)
            .ok_or_else(|| RowError::ColumnNotFound(column.to_string()))?;
        T::from_column(column, value)
    }
}
