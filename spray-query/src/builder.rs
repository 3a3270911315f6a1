//! The mutable query builder handed to entity filters.
//!
//! A [`QueryBuilder`] is scoped to one table under one alias. Filters mutate
//! it through `&mut` access (adding conditions, joins, ordering or row caps);
//! once every filter has run, [`QueryBuilder::get_query`] freezes it into a
//! [`Query`] that executes against a [`QueryEngine`].
//!
//! ```rust
//! use spray_query::{Condition, OrderByField, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new("blog_posts", "bp");
//! qb.and_where(Condition::eq(qb.column("published"), true))
//!     .add_order_by(OrderByField::desc("created_at"))
//!     .set_max_results(Some(10));
//!
//! let (sql, params) = qb.build_sql();
//! assert_eq!(
//!     sql,
//!     "SELECT bp.* FROM blog_posts bp WHERE bp.published = $1 ORDER BY bp.created_at DESC LIMIT 10"
//! );
//! assert_eq!(params.len(), 1);
//! ```

use std::fmt::Write;

use tracing::debug;

use crate::condition::Condition;
use crate::error::{QueryError, QueryResult};
use crate::row::{Row, ScalarRow};
use crate::traits::{Entity, QueryEngine};
use crate::types::OrderByField;
use crate::value::FilterValue;

/// Kind of JOIN clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
}

impl JoinKind {
    fn as_sql(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join kind.
    pub kind: JoinKind,
    /// Joined table.
    pub table: String,
    /// Alias of the joined table.
    pub alias: String,
    /// The ON condition, as SQL.
    pub on: String,
}

/// A mutable, alias-scoped SELECT builder.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    table: String,
    alias: String,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    order_by: Vec<OrderByField>,
    first_result: Option<u64>,
    max_results: Option<u64>,
}

impl QueryBuilder {
    /// Create a builder selecting from `table` under `alias`.
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            first_result: None,
            max_results: None,
        }
    }

    /// The table this builder selects from.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The alias the root table is labeled with.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Qualify a column with the root alias (`bp.title`).
    pub fn column(&self, name: &str) -> String {
        if self.alias.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.alias, name)
        }
    }

    /// Add a WHERE condition, combined with the existing ones using AND.
    pub fn and_where(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    /// Add an `INNER JOIN table alias ON on`.
    pub fn inner_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> &mut Self {
        self.push_join(JoinKind::Inner, table.into(), alias.into(), on.into())
    }

    /// Add a `LEFT JOIN table alias ON on`.
    pub fn left_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> &mut Self {
        self.push_join(JoinKind::Left, table.into(), alias.into(), on.into())
    }

    fn push_join(&mut self, kind: JoinKind, table: String, alias: String, on: String) -> &mut Self {
        self.joins.push(Join {
            kind,
            table,
            alias,
            on,
        });
        self
    }

    /// Whether a join with the given alias was already added.
    ///
    /// Filters that share a join use this to avoid joining twice.
    pub fn has_join(&self, alias: &str) -> bool {
        self.joins.iter().any(|j| j.alias == alias)
    }

    /// Append an ORDER BY entry.
    pub fn add_order_by(&mut self, field: OrderByField) -> &mut Self {
        self.order_by.push(field);
        self
    }

    /// Replace all ORDER BY entries with `field`.
    pub fn order_by(&mut self, field: OrderByField) -> &mut Self {
        self.order_by.clear();
        self.order_by.push(field);
        self
    }

    /// Set the number of rows to skip.
    pub fn set_first_result(&mut self, first: Option<u64>) -> &mut Self {
        self.first_result = first;
        self
    }

    /// Set the maximum number of rows to return; `None` means unbounded.
    pub fn set_max_results(&mut self, max: Option<u64>) -> &mut Self {
        self.max_results = max;
        self
    }

    /// The number of rows to skip.
    pub fn first_result(&self) -> Option<u64> {
        self.first_result
    }

    /// The row cap, if any.
    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    /// The WHERE conditions, in the order they were added.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The JOIN clauses, in the order they were added.
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// The ORDER BY entries.
    pub fn order_by_fields(&self) -> &[OrderByField] {
        &self.order_by
    }

    /// Build the SQL query and its parameters.
    pub fn build_sql(&self) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let mut sql = String::with_capacity(64);

        if self.alias.is_empty() {
            let _ = write!(sql, "SELECT * FROM {}", self.table);
        } else {
            let _ = write!(sql, "SELECT {0}.* FROM {1} {0}", self.alias, self.table);
        }

        for join in &self.joins {
            let _ = write!(
                sql,
                " {} {} {} ON {}",
                join.kind.as_sql(),
                join.table,
                join.alias,
                join.on
            );
        }

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            let parts: Vec<_> = self
                .conditions
                .iter()
                .map(|c| {
                    let (part, values) = c.to_sql(params.len());
                    params.extend(values);
                    part
                })
                .collect();
            sql.push_str(&parts.join(" AND "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let parts: Vec<_> = self.order_by.iter().map(|o| o.to_sql(&self.alias)).collect();
            sql.push_str(&parts.join(", "));
        }

        if let Some(max) = self.max_results {
            let _ = write!(sql, " LIMIT {}", max);
        }

        if let Some(first) = self.first_result {
            // SQLite and MySQL need a LIMIT before OFFSET.
            if self.max_results.is_none() {
                sql.push_str(" LIMIT -1");
            }
            let _ = write!(sql, " OFFSET {}", first);
        }

        (sql, params)
    }

    /// Freeze the builder into an executable query.
    pub fn get_query<'e, E: QueryEngine + ?Sized>(&self, engine: &'e E) -> Query<'e, E> {
        let (sql, params) = self.build_sql();
        Query {
            engine,
            sql,
            params,
        }
    }
}

/// A composed query, ready to execute.
pub struct Query<'e, E: ?Sized> {
    engine: &'e E,
    sql: String,
    params: Vec<FilterValue>,
}

impl<'e, E: QueryEngine + ?Sized> Query<'e, E> {
    /// The SQL that will be executed.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The parameters bound to the SQL.
    pub fn params(&self) -> &[FilterValue] {
        &self.params
    }

    /// Execute and return scalar projections.
    pub fn get_scalar_result(self) -> QueryResult<Vec<ScalarRow>> {
        debug!(sql = %self.sql, params = self.params.len(), "Executing query");
        self.engine.query_rows(&self.sql, self.params)
    }

    /// Execute and hydrate every row into `M`.
    pub fn get_result<M: Entity>(self) -> QueryResult<Vec<M>> {
        let rows = self.get_scalar_result()?;
        rows.iter()
            .map(|row| M::from_row(row).map_err(QueryError::from))
            .collect()
    }

    /// Execute and materialize rows, hydrated or scalar.
    pub fn get_rows<M: Entity>(self, hydrate: bool) -> QueryResult<Vec<Row<M>>> {
        let rows = self.get_scalar_result()?;
        if !hydrate {
            return Ok(rows.into_iter().map(Row::Scalar).collect());
        }
        rows.iter()
            .map(|row| M::from_row(row).map(Row::Entity).map_err(QueryError::from))
            .collect()
    }

    /// Execute and return exactly one scalar row.
    ///
    /// Zero rows is [`ErrorCode::RecordNotFound`](crate::ErrorCode::RecordNotFound);
    /// more than one is [`ErrorCode::NotUnique`](crate::ErrorCode::NotUnique).
    pub fn get_single_scalar_result(self, entity: &str) -> QueryResult<ScalarRow> {
        let sql = self.sql.clone();
        let mut rows = self.get_scalar_result()?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(QueryError::not_found(entity).with_sql(sql)),
            n => Err(QueryError::not_unique(entity, n).with_sql(sql)),
        }
    }

    /// Execute and return exactly one row, hydrated or scalar.
    pub fn get_single_row<M: Entity>(self, hydrate: bool) -> QueryResult<Row<M>> {
        let row = self.get_single_scalar_result(M::entity_name())?;
        if hydrate {
            Ok(Row::Entity(M::from_row(&row)?))
        } else {
            Ok(Row::Scalar(row))
        }
    }

    /// Execute and hydrate exactly one row.
    pub fn get_single_result<M: Entity>(self) -> QueryResult<M> {
        let row = self.get_single_scalar_result(M::entity_name())?;
        Ok(M::from_row(&row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BlogPost, MockEngine, post_row};
    use crate::types::NullsOrder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_select() {
        let qb = QueryBuilder::new("blog_posts", "bp");
        let (sql, params) = qb.build_sql();
        assert_eq!(sql, "SELECT bp.* FROM blog_posts bp");
        assert!(params.is_empty());
    }

    #[test]
    fn test_empty_alias() {
        let mut qb = QueryBuilder::new("widgets", "");
        qb.and_where(Condition::eq(qb.column("id"), 1));
        let (sql, _) = qb.build_sql();
        assert_eq!(sql, "SELECT * FROM widgets WHERE id = $1");
    }

    #[test]
    fn test_conditions_are_numbered_across_clauses() {
        let mut qb = QueryBuilder::new("blog_posts", "bp");
        qb.and_where(Condition::eq("bp.published", true))
            .and_where(Condition::in_list("bp.category", ["rust", "go"]));

        let (sql, params) = qb.build_sql();
        assert_eq!(
            sql,
            "SELECT bp.* FROM blog_posts bp WHERE bp.published = $1 AND bp.category IN ($2, $3)"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_joins() {
        let mut qb = QueryBuilder::new("blog_posts", "bp");
        qb.inner_join("users", "u", "u.id = bp.author_id")
            .left_join("comments", "c", "c.post_id = bp.id");

        assert!(qb.has_join("u"));
        assert!(!qb.has_join("t"));

        let (sql, _) = qb.build_sql();
        assert_eq!(
            sql,
            "SELECT bp.* FROM blog_posts bp INNER JOIN users u ON u.id = bp.author_id \
             LEFT JOIN comments c ON c.post_id = bp.id"
        );
    }

    #[test]
    fn test_order_limit_offset() {
        let mut qb = QueryBuilder::new("blog_posts", "bp");
        qb.add_order_by(OrderByField::desc("created_at").nulls(NullsOrder::Last))
            .add_order_by(OrderByField::asc("id"))
            .set_max_results(Some(20))
            .set_first_result(Some(40));

        let (sql, _) = qb.build_sql();
        assert_eq!(
            sql,
            "SELECT bp.* FROM blog_posts bp ORDER BY bp.created_at DESC NULLS LAST, bp.id ASC \
             LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let mut qb = QueryBuilder::new("blog_posts", "bp");
        qb.set_first_result(Some(5));
        let (sql, _) = qb.build_sql();
        assert!(sql.ends_with("LIMIT -1 OFFSET 5"));
    }

    #[test]
    fn test_order_by_replaces() {
        let mut qb = QueryBuilder::new("blog_posts", "bp");
        qb.add_order_by(OrderByField::asc("title"))
            .order_by(OrderByField::desc("id"));
        assert_eq!(qb.order_by_fields(), &[OrderByField::desc("id")]);
    }

    #[test]
    fn test_get_result_hydrates() {
        let engine = MockEngine::with_rows(vec![post_row(1, "One", true), post_row(2, "Two", false)]);
        let qb = QueryBuilder::new("blog_posts", "bp");

        let posts: Vec<BlogPost> = qb.get_query(&engine).get_result().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].title, "Two");
        assert_eq!(engine.executed(), vec!["SELECT bp.* FROM blog_posts bp".to_string()]);
    }

    #[test]
    fn test_get_rows_scalar() {
        let engine = MockEngine::with_rows(vec![post_row(1, "One", true)]);
        let qb = QueryBuilder::new("blog_posts", "bp");

        let rows = qb.get_query(&engine).get_rows::<BlogPost>(false).unwrap();
        assert!(rows[0].is_scalar());
    }

    #[test]
    fn test_single_result_multiplicity() {
        let qb = QueryBuilder::new("blog_posts", "bp");

        let empty = MockEngine::with_rows(vec![]);
        let err = qb.get_query(&empty).get_single_result::<BlogPost>().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.context.sql.as_deref(), Some("SELECT bp.* FROM blog_posts bp"));

        let many = MockEngine::with_rows(vec![post_row(1, "One", true), post_row(2, "Two", true)])
            .ignoring_limit();
        let err = qb.get_query(&many).get_single_result::<BlogPost>().unwrap_err();
        assert!(err.is_not_unique());
    }

    #[test]
    fn test_hydration_error_is_reported() {
        let mut broken = post_row(1, "One", true);
        broken.shift_remove("title");
        let engine = MockEngine::with_rows(vec![broken]);

        let err = QueryBuilder::new("blog_posts", "bp")
            .get_query(&engine)
            .get_result::<BlogPost>()
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::DeserializationError);
        assert_eq!(err.context.column.as_deref(), Some("title"));
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let engine = MockEngine::failing(|| QueryError::database("no such table: blog_posts"));
        let err = QueryBuilder::new("blog_posts", "bp")
            .get_query(&engine)
            .get_scalar_result()
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::DatabaseError);
        assert_eq!(err.message, "no such table: blog_posts");
    }
}
