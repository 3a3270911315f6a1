//! Test doubles shared by the unit tests.

use parking_lot::Mutex;

use crate::condition::Condition;
use crate::error::{QueryError, QueryResult};
use crate::row::{RowError, ScalarRow, ScalarRowExt};
use crate::traits::{Entity, QueryEngine};
use crate::value::FilterValue;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BlogPost {
    pub id: i64,
    pub title: String,
    pub published: bool,
}

impl Entity for BlogPost {
    const TABLE_NAME: &'static str = "blog_posts";

    fn from_row(row: &ScalarRow) -> Result<Self, RowError> {
        Ok(Self {
            id: row.get_as("id")?,
            title: row.get_as("title")?,
            published: row.get_as("published")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct User {
    pub id: i64,
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";

    fn from_row(row: &ScalarRow) -> Result<Self, RowError> {
        Ok(Self {
            id: row.get_as("id")?,
        })
    }
}

pub(crate) fn post_row(id: i64, title: &str, published: bool) -> ScalarRow {
    let mut row = ScalarRow::new();
    row.insert("id".into(), FilterValue::Int(id));
    row.insert("title".into(), FilterValue::String(title.into()));
    row.insert("published".into(), FilterValue::Bool(published));
    row
}

/// Four posts, two of them published.
pub(crate) fn sample_posts() -> Vec<ScalarRow> {
    vec![
        post_row(1, "Hello", true),
        post_row(2, "Drafts", false),
        post_row(3, "Rust", true),
        post_row(4, "Later", false),
    ]
}

pub(crate) fn published_only() -> Condition {
    Condition::eq("bp.published", true)
}

type Failure = Box<dyn Fn() -> QueryError + Send + Sync>;

/// An in-memory engine that records every query.
///
/// It understands just enough SQL for the tests: `col = $n` conditions joined
/// by AND, plus LIMIT and OFFSET.
pub(crate) struct MockEngine {
    rows: Vec<ScalarRow>,
    failure: Option<Failure>,
    respect_limit: bool,
    log: Mutex<Vec<(String, Vec<FilterValue>)>>,
}

impl MockEngine {
    pub fn with_rows(rows: Vec<ScalarRow>) -> Self {
        Self {
            rows,
            failure: None,
            respect_limit: true,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: impl Fn() -> QueryError + Send + Sync + 'static) -> Self {
        Self {
            failure: Some(Box::new(failure)),
            ..Self::with_rows(Vec::new())
        }
    }

    /// Return every matching row even when the query carries a LIMIT.
    pub fn ignoring_limit(mut self) -> Self {
        self.respect_limit = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.log.lock().len()
    }

    pub fn executed(&self) -> Vec<String> {
        self.log.lock().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn last_sql(&self) -> Option<String> {
        self.log.lock().last().map(|(sql, _)| sql.clone())
    }

    fn matches(row: &ScalarRow, sql: &str, params: &[FilterValue]) -> bool {
        let Some((_, rest)) = sql.split_once(" WHERE ") else {
            return true;
        };
        let clause = [" ORDER BY ", " LIMIT ", " OFFSET "]
            .iter()
            .filter_map(|kw| rest.find(kw))
            .min()
            .map_or(rest, |end| &rest[..end]);

        clause.split(" AND ").all(|part| {
            let Some((lhs, rhs)) = part.split_once(" = $") else {
                return true;
            };
            let column = lhs.rsplit('.').next().unwrap_or(lhs);
            let index: usize = rhs.trim().parse().unwrap_or(0);
            match (row.get(column), index.checked_sub(1).and_then(|i| params.get(i))) {
                (Some(value), Some(param)) => value == param,
                _ => false,
            }
        })
    }

    fn clause_number(sql: &str, keyword: &str) -> Option<i64> {
        let (_, rest) = sql.split_once(keyword)?;
        rest.split_whitespace().next()?.parse().ok()
    }
}

impl QueryEngine for MockEngine {
    fn query_rows(&self, sql: &str, params: Vec<FilterValue>) -> QueryResult<Vec<ScalarRow>> {
        self.log.lock().push((sql.to_string(), params.clone()));
        if let Some(failure) = &self.failure {
            return Err(failure());
        }

        let mut rows: Vec<ScalarRow> = self
            .rows
            .iter()
            .filter(|row| Self::matches(row, sql, &params))
            .cloned()
            .collect();

        if self.respect_limit {
            let offset = Self::clause_number(sql, " OFFSET ").unwrap_or(0).max(0) as usize;
            rows = rows.into_iter().skip(offset).collect();
            if let Some(limit) = Self::clause_number(sql, " LIMIT ").filter(|&l| l >= 0) {
                rows.truncate(limit as usize);
            }
        }

        Ok(rows)
    }
}
