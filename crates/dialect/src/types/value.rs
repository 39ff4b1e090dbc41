//! Bound parameter values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A SQL parameter value.
///
/// Values only ever travel to the database as positional parameters; they
/// are never spliced into statement text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// Null parameter.
    Null,
    /// Boolean parameter.
    Bool(bool),
    /// Integer parameter.
    Integer(i64),
    /// Floating point parameter.
    Float(f64),
    /// Text parameter.
    ///
    /// Every JSON string deserializes to this variant, including strings
    /// that look like timestamps or UUIDs.
    Text(String),
    /// Timestamp parameter. Only built explicitly, never deserialized.
    Timestamp(DateTime<Utc>),
    /// UUID parameter. Only built explicitly, never deserialized.
    Uuid(Uuid),
}

/// Named parameters referenced by template placeholders.
pub type ParamMap = BTreeMap<String, SqlValue>;

/// A result row keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

impl SqlValue {
    /// Creates a text parameter.
    pub fn text(s: impl Into<String>) -> Self {
        SqlValue::Text(s.into())
    }

    /// Returns true for [`SqlValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Returns the text content, if this is a text parameter.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Wraps a value in `%` markers for substring matching.
    ///
    /// Non-text values are rendered with their display form first.
    pub fn wildcard(&self) -> Self {
        match self {
            SqlValue::Null => SqlValue::Null,
            SqlValue::Text(s) => SqlValue::Text(format!("%{}%", s)),
            other => SqlValue::Text(format!("%{}%", other)),
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "null"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Float(x) => write!(f, "{}", x),
            SqlValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            SqlValue::Uuid(id) => write!(f, "{}", id),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(n)
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        SqlValue::Integer(i64::from(n))
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        SqlValue::Float(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(ts: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(ts)
    }
}

impl From<Uuid> for SqlValue {
    fn from(id: Uuid) -> Self {
        SqlValue::Uuid(id)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
