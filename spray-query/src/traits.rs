//! Collaborator traits: entity metadata and query execution.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::row::{RowError, ScalarRow};
use crate::value::FilterValue;

/// Metadata and hydration for a mapped entity type.
///
/// ```rust
/// use spray_query::row::{RowError, ScalarRow, ScalarRowExt};
/// use spray_query::Entity;
///
/// struct UserAccount {
///     id: i64,
///     email: String,
/// }
///
/// impl Entity for UserAccount {
///     const TABLE_NAME: &'static str = "user_accounts";
///
///     fn from_row(row: &ScalarRow) -> Result<Self, RowError> {
///         Ok(Self {
///             id: row.get_as("id")?,
///             email: row.get_as("email")?,
///         })
///     }
/// }
///
/// assert!(UserAccount::entity_name().ends_with("UserAccount"));
/// ```
pub trait Entity: Sized {
    /// The table this entity is mapped to.
    const TABLE_NAME: &'static str;

    /// The qualified type name, used to derive the query alias.
    ///
    /// Defaults to the Rust type path (`my_app::model::BlogPost`).
    fn entity_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Hydrate an entity from a scalar row.
    fn from_row(row: &ScalarRow) -> Result<Self, RowError>;
}

/// Executes composed SQL against a data store.
///
/// Implementations block until the store answers. Errors are returned to the
/// caller exactly as produced; nothing above this trait retries or rewraps
/// them.
pub trait QueryEngine {
    /// Run a SELECT and return every row as a scalar projection.
    ///
    /// `sql` uses `$1`, `$2`, ... placeholders bound in order to `params`.
    fn query_rows(&self, sql: &str, params: Vec<FilterValue>) -> QueryResult<Vec<ScalarRow>>;
}

impl<E: QueryEngine + ?Sized> QueryEngine for &E {
    fn query_rows(&self, sql: &str, params: Vec<FilterValue>) -> QueryResult<Vec<ScalarRow>> {
        (**self).query_rows(sql, params)
    }
}

impl<E: QueryEngine + ?Sized> QueryEngine for Arc<E> {
    fn query_rows(&self, sql: &str, params: Vec<FilterValue>) -> QueryResult<Vec<ScalarRow>> {
        (**self).query_rows(sql, params)
    }
}

impl<E: QueryEngine + ?Sized> QueryEngine for Rc<E> {
    fn query_rows(&self, sql: &str, params: Vec<FilterValue>) -> QueryResult<Vec<ScalarRow>> {
        (**self).query_rows(sql, params)
    }
}
