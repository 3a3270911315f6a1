//! Value and placeholder conversion between Spray and SQLite.

use std::borrow::Cow;

use rusqlite::types::{Value, ValueRef};
use spray_query::FilterValue;

/// Convert a FilterValue to a SQLite Value.
pub fn filter_value_to_sqlite(value: &FilterValue) -> Value {
    match value {
        FilterValue::Null => Value::Null,
        FilterValue::Bool(b) => Value::Integer(i64::from(*b)),
        FilterValue::Int(i) => Value::Integer(*i),
        FilterValue::Float(f) => Value::Real(*f),
        FilterValue::String(s) => Value::Text(s.clone()),
        FilterValue::Json(j) => Value::Text(j.to_string()),
        // Lists bind as a JSON array, for use with json_each().
        FilterValue::List(_) => Value::Text(value.to_json().to_string()),
    }
}

/// Convert a SQLite column value to a FilterValue.
///
/// Text that is not valid UTF-8 is converted lossily. Blobs become a list of
/// byte values.
pub fn from_sqlite_value(value: ValueRef<'_>) -> FilterValue {
    match value {
        ValueRef::Null => FilterValue::Null,
        ValueRef::Integer(i) => FilterValue::Int(i),
        ValueRef::Real(f) => FilterValue::Float(f),
        ValueRef::Text(bytes) => FilterValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            FilterValue::List(bytes.iter().map(|b| FilterValue::Int(i64::from(*b))).collect())
        }
    }
}

/// Rewrite `$n` placeholders as SQLite's `?n`.
///
/// Placeholders inside single-quoted literals and double-quoted identifiers
/// are left alone.
pub fn translate_placeholders(sql: &str) -> Cow<'_, str> {
    if !sql.contains('$') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            (None, '$') if chars.peek().is_some_and(char::is_ascii_digit) => {
                out.push('?');
                continue;
            }
            _ => {}
        }
        out.push(ch);
    }

    Cow::Owned(out)
}
