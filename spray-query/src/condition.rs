//! Predicates that filters add to a query builder's WHERE clause.
//!
//! A [`Condition`] renders to SQL with numbered `$n` placeholders and returns
//! the values to bind alongside it:
//!
//! ```rust
//! use spray_query::{Condition, FilterValue};
//!
//! let cond = Condition::and([
//!     Condition::eq("bp.published", true),
//!     Condition::gte("bp.views", 100),
//! ]);
//!
//! let (sql, params) = cond.to_sql(0);
//! assert_eq!(sql, "(bp.published = $1 AND bp.views >= $2)");
//! assert_eq!(params, vec![FilterValue::Bool(true), FilterValue::Int(100)]);
//! ```

use crate::value::FilterValue;

/// A WHERE clause predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equals comparison.
    Equals(String, FilterValue),
    /// Not equals comparison.
    NotEquals(String, FilterValue),

    /// Less than comparison.
    Lt(String, FilterValue),
    /// Less than or equal comparison.
    Lte(String, FilterValue),
    /// Greater than comparison.
    Gt(String, FilterValue),
    /// Greater than or equal comparison.
    Gte(String, FilterValue),

    /// In a list of values.
    In(String, Vec<FilterValue>),
    /// Not in a list of values.
    NotIn(String, Vec<FilterValue>),

    /// Contains (LIKE %value%).
    Contains(String, FilterValue),
    /// Starts with (LIKE value%).
    StartsWith(String, FilterValue),
    /// Ends with (LIKE %value).
    EndsWith(String, FilterValue),

    /// Is null check.
    IsNull(String),
    /// Is not null check.
    IsNotNull(String),

    /// Logical AND of multiple conditions.
    And(Vec<Condition>),
    /// Logical OR of multiple conditions.
    Or(Vec<Condition>),
    /// Logical NOT of a condition.
    Not(Box<Condition>),

    /// A raw SQL fragment; each `?` outside quotes is replaced by the next
    /// numbered placeholder.
    Raw(String, Vec<FilterValue>),
}

impl Condition {
    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Equals(column.into(), value.into())
    }

    /// `column != value`
    pub fn ne(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::NotEquals(column.into(), value.into())
    }

    /// `column < value`
    pub fn lt(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Lt(column.into(), value.into())
    }

    /// `column <= value`
    pub fn lte(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Lte(column.into(), value.into())
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Gt(column.into(), value.into())
    }

    /// `column >= value`
    pub fn gte(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Gte(column.into(), value.into())
    }

    /// `column IN (...)`
    pub fn in_list<V: Into<FilterValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    /// `column NOT IN (...)`
    pub fn not_in_list<V: Into<FilterValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::NotIn(column.into(), values.into_iter().map(Into::into).collect())
    }

    /// `column LIKE %value%`
    pub fn contains(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Contains(column.into(), value.into())
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull(column.into())
    }

    /// A raw fragment with `?` markers for its parameters.
    pub fn raw(sql: impl Into<String>, params: impl IntoIterator<Item = FilterValue>) -> Self {
        Self::Raw(sql.into(), params.into_iter().collect())
    }

    /// Create an AND condition. A single condition is returned as is.
    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut conditions: Vec<_> = conditions.into_iter().collect();
        if conditions.len() == 1 {
            return conditions.remove(0);
        }
        Self::And(conditions)
    }

    /// Create an OR condition. A single condition is returned as is.
    pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut conditions: Vec<_> = conditions.into_iter().collect();
        if conditions.len() == 1 {
            return conditions.remove(0);
        }
        Self::Or(conditions)
    }

    /// Create a NOT condition.
    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Self::Not(Box::new(condition))
    }

    /// Generate SQL with placeholders numbered after `param_offset`.
    ///
    /// Returns `(sql, params)` where params are the values to bind, in
    /// placeholder order.
    pub fn to_sql(&self, param_offset: usize) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let sql = self.write_sql(param_offset, &mut params);
        (sql, params)
    }

    fn write_sql(&self, offset: usize, params: &mut Vec<FilterValue>) -> String {
        // Placeholder number for the value about to be pushed.
        let bind = |value: FilterValue, params: &mut Vec<FilterValue>| {
            params.push(value);
            format!("${}", offset + params.len())
        };

        match self {
            Self::Equals(col, val) if val.is_null() => format!("{} IS NULL", col),
            Self::Equals(col, val) => format!("{} = {}", col, bind(val.clone(), params)),
            Self::NotEquals(col, val) if val.is_null() => format!("{} IS NOT NULL", col),
            Self::NotEquals(col, val) => format!("{} != {}", col, bind(val.clone(), params)),

            Self::Lt(col, val) => format!("{} < {}", col, bind(val.clone(), params)),
            Self::Lte(col, val) => format!("{} <= {}", col, bind(val.clone(), params)),
            Self::Gt(col, val) => format!("{} > {}", col, bind(val.clone(), params)),
            Self::Gte(col, val) => format!("{} >= {}", col, bind(val.clone(), params)),

            Self::In(_, values) if values.is_empty() => "1 = 0".to_string(),
            Self::In(col, values) => {
                let placeholders: Vec<_> =
                    values.iter().map(|v| bind(v.clone(), params)).collect();
                format!("{} IN ({})", col, placeholders.join(", "))
            }
            Self::NotIn(_, values) if values.is_empty() => "1 = 1".to_string(),
            Self::NotIn(col, values) => {
                let placeholders: Vec<_> =
                    values.iter().map(|v| bind(v.clone(), params)).collect();
                format!("{} NOT IN ({})", col, placeholders.join(", "))
            }

            Self::Contains(col, val) => {
                format!("{} LIKE {}", col, bind(like_pattern(val, "%", "%"), params))
            }
            Self::StartsWith(col, val) => {
                format!("{} LIKE {}", col, bind(like_pattern(val, "", "%"), params))
            }
            Self::EndsWith(col, val) => {
                format!("{} LIKE {}", col, bind(like_pattern(val, "%", ""), params))
            }

            Self::IsNull(col) => format!("{} IS NULL", col),
            Self::IsNotNull(col) => format!("{} IS NOT NULL", col),

            Self::And(conditions) if conditions.is_empty() => "1 = 1".to_string(),
            Self::And(conditions) => {
                let parts: Vec<_> = conditions
                    .iter()
                    .map(|c| c.write_sql(offset, params))
                    .collect();
                format!("({})", parts.join(" AND "))
            }
            Self::Or(conditions) if conditions.is_empty() => "1 = 0".to_string(),
            Self::Or(conditions) => {
                let parts: Vec<_> = conditions
                    .iter()
                    .map(|c| c.write_sql(offset, params))
                    .collect();
                format!("({})", parts.join(" OR "))
            }
            Self::Not(inner) => format!("NOT ({})", inner.write_sql(offset, params)),

            Self::Raw(sql, values) => {
                let mut values = values.iter();
                let mut out = String::with_capacity(sql.len() + 8);
                let mut quote: Option<char> = None;
                for ch in sql.chars() {
                    match (quote, ch) {
                        (Some(q), c) if c == q => quote = None,
                        (None, '\'' | '"') => quote = Some(ch),
                        (None, '?') => {
                            if let Some(value) = values.next() {
                                out.push_str(&bind(value.clone(), params));
                                continue;
                            }
                        }
                        _ => {}
                    }
                    out.push(ch);
                }
                out
            }
        }
    }
}

fn like_pattern(value: &FilterValue, prefix: &str, suffix: &str) -> FilterValue {
    match value {
        FilterValue::String(s) => FilterValue::String(format!("{}{}{}", prefix, s, suffix)),
        other => other.clone(),
    }
}
