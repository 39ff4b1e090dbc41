//! Report filters and their compilation to SQL fragments.
//!
//! A report query is scoped to one website and narrowed by named filters
//! (`url`, `browser`, `referrer`, ...). [`FilterCompiler`] turns them into a
//! join fragment, a where fragment, a date range fragment and the parameter
//! map the fragments' placeholders refer to.
//!
//! ```
//! use helios_dialect::dialect::Dialect;
//! use helios_dialect::filter::{FilterCompiler, FilterOperator, FilterSpec, QueryFilters, QueryOptions};
//! use helios_dialect::lookup::Website;
//! use uuid::Uuid;
//!
//! let website = Website::new(Uuid::new_v4(), "example.com");
//! let filters = QueryFilters::new()
//!     .with_filter(FilterSpec::field("browser", FilterOperator::Equals, "firefox"));
//!
//! let compiled = FilterCompiler::new(Dialect::Postgres)
//!     .compile_for(&website, &filters, &QueryOptions::default());
//!
//! assert!(compiled.join_fragment.starts_with("inner join session"));
//! assert_eq!(compiled.where_fragment, "AND session.browser = {{browser}}");
//! ```

mod compiler;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SqlValue;

pub use compiler::{CompiledFilters, FilterCompiler, SESSION_JOIN};

/// Filter names whose columns live on the session table.
pub const SESSION_COLUMNS: &[&str] = &[
    "browser", "os", "device", "screen", "language", "country", "region", "city",
];

/// Default column for a filter name, if it has one.
pub fn default_column(name: &str) -> Option<&'static str> {
    let column = match name {
        "url" => "website_event.url_path",
        "referrer" => "website_event.referrer_domain",
        "title" => "website_event.page_title",
        "query" => "website_event.url_query",
        "host" => "website_event.hostname",
        "event" => "website_event.event_name",
        "browser" => "session.browser",
        "os" => "session.os",
        "device" => "session.device",
        "screen" => "session.screen",
        "language" => "session.language",
        "country" => "session.country",
        "region" => "session.subdivision1",
        "city" => "session.city",
        _ => return None,
    };
    Some(column)
}

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterOperator {
    /// `column = value`
    #[default]
    #[serde(rename = "eq")]
    Equals,
    /// `column != value`
    #[serde(rename = "neq")]
    NotEquals,
    /// Case-insensitive substring match.
    #[serde(rename = "c")]
    Contains,
    /// Negated case-insensitive substring match.
    #[serde(rename = "dnc")]
    DoesNotContain,
}

impl FilterOperator {
    /// Whether the value is matched as a substring.
    pub fn is_substring(&self) -> bool {
        matches!(
            self,
            FilterOperator::Contains | FilterOperator::DoesNotContain
        )
    }
}

/// A named filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Parameter name the value is bound under.
    pub name: String,

    /// Column the filter applies to; without one the filter only binds a
    /// parameter.
    #[serde(default)]
    pub column: Option<String>,

    /// Comparison.
    #[serde(default)]
    pub operator: FilterOperator,

    /// Value to compare against.
    pub value: SqlValue,

    /// Inline cast for the placeholder (PostgreSQL only).
    #[serde(default, rename = "type")]
    pub type_hint: Option<String>,
}

impl FilterSpec {
    /// Creates a filter on an explicit column.
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<SqlValue>,
    ) -> Self {
        Self {
            name: name.into(),
            column: Some(column.into()),
            operator,
            value: value.into(),
            type_hint: None,
        }
    }

    /// Creates a filter whose column comes from [`default_column`].
    pub fn field(name: &str, operator: FilterOperator, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.to_string(),
            column: default_column(name).map(str::to_string),
            operator,
            value: value.into(),
            type_hint: None,
        }
    }

    /// Creates a parameter-only filter.
    pub fn param(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.into(),
            column: None,
            operator: FilterOperator::Equals,
            value: value.into(),
            type_hint: None,
        }
    }

    /// Sets the placeholder type hint.
    pub fn with_type(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    /// Whether this filter needs the session table joined.
    pub fn is_session_scoped(&self) -> bool {
        SESSION_COLUMNS.contains(&self.name.as_str())
    }
}

/// Filters plus the requested date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    /// Named filters, compiled in order.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,

    /// Inclusive range start.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Inclusive range end.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl QueryFilters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter.
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the date range.
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Sets only the range start.
    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// The requested range.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Compilation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Join the session table even if no filter needs it.
    #[serde(default)]
    pub join_session: bool,
}

impl QueryOptions {
    /// Options that always join the session table.
    pub fn with_session() -> Self {
        Self { join_session: true }
    }
}

/// A report date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Range start.
    pub start_date: Option<DateTime<Utc>>,
    /// Range end.
    pub end_date: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Moves the start forward to `reset_at` when data was reset later.
    ///
    /// An absent bound takes the other's value.
    pub fn clamp(self, reset_at: Option<DateTime<Utc>>) -> Self {
        let start_date = match (self.start_date, reset_at) {
            (Some(start), Some(reset)) => Some(start.max(reset)),
            (start, reset) => start.or(reset),
        };
        Self {
            start_date,
            end_date: self.end_date,
        }
    }
}
