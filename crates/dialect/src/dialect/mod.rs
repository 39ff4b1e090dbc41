//! SQL dialects and the process-wide dialect registry.
//!
//! Every dialect-specific spelling lives behind [`SqlDialect`]. Callers resolve
//! a [`Dialect`] once (from configuration, see [`crate::config`]) and pass it
//! to the components that need it.
//!
//! ```
//! use helios_dialect::dialect::{DateUnit, Dialect};
//!
//! let pg = Dialect::Postgres.sql();
//! assert_eq!(pg.add_interval("created_at", "1 day"), "created_at + interval '1 day'");
//!
//! let mysql = Dialect::MySql.sql();
//! assert_eq!(
//!     mysql.truncate_date("created_at", DateUnit::Day, None),
//!     "date_format(created_at, '%Y-%m-%d')"
//! );
//! ```

mod fragments;
mod mysql;
mod postgres;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

pub use fragments::Fragments;
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;

/// The supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL: `$n::type` placeholders, explicit `ILIKE`.
    #[serde(alias = "postgresql")]
    Postgres,
    /// MySQL: `?` placeholders, case-insensitive collations.
    MySql,
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Dialect; 2] = [Dialect::Postgres, Dialect::MySql];

    /// Returns the fragment generator for this dialect.
    pub fn sql(self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &PostgresDialect,
            Dialect::MySql => &MySqlDialect,
        }
    }

    /// Resolves the dialect from a connection string scheme.
    pub fn from_database_url(url: &str) -> QueryResult<Self> {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme).unwrap_or("");
        scheme.parse().map_err(|_| QueryError::UnsupportedDialect {
            value: if scheme.is_empty() {
                url.to_string()
            } else {
                scheme.to_string()
            },
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgresql"),
            Dialect::MySql => write!(f, "mysql"),
        }
    }
}

impl FromStr for Dialect {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            _ => Err(QueryError::UnsupportedDialect {
                value: s.to_string(),
            }),
        }
    }
}

/// Time bucket granularity for [`SqlDialect::truncate_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateUnit {
    /// Truncate to the minute.
    Minute,
    /// Truncate to the hour.
    Hour,
    /// Truncate to the day.
    Day,
    /// Truncate to the first of the month.
    Month,
    /// Truncate to the first of the year.
    Year,
}

impl DateUnit {
    /// All bucket units, finest first.
    pub const ALL: [DateUnit; 5] = [
        DateUnit::Minute,
        DateUnit::Hour,
        DateUnit::Day,
        DateUnit::Month,
        DateUnit::Year,
    ];

    /// The unit name as used by `date_trunc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DateUnit::Minute => "minute",
            DateUnit::Hour => "hour",
            DateUnit::Day => "day",
            DateUnit::Month => "month",
            DateUnit::Year => "year",
        }
    }
}

impl fmt::Display for DateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateUnit {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute" => Ok(DateUnit::Minute),
            "hour" => Ok(DateUnit::Hour),
            "day" => Ok(DateUnit::Day),
            "month" => Ok(DateUnit::Month),
            "year" => Ok(DateUnit::Year),
            _ => Err(QueryError::InvalidDateUnit {
                unit: s.to_string(),
            }),
        }
    }
}

/// Dialect-specific SQL spelling.
///
/// All methods are pure: the same arguments always produce the same text.
/// Arguments are structural (column names, interval literals, type names,
/// timezones chosen by the caller), never user input, and are emitted as-is.
pub trait SqlDialect: Send + Sync {
    /// The dialect this implementation spells.
    fn kind(&self) -> Dialect;

    /// `field` shifted forward by `interval` (e.g. `"1 day"`).
    fn add_interval(&self, field: &str, interval: &str) -> String;

    /// Whole days between the dates of `a` and `b` (`a - b`).
    fn day_diff(&self, a: &str, b: &str) -> String;

    /// Explicit cast where the dialect needs one.
    fn cast_column(&self, field: &str, sql_type: &str) -> String;

    /// Formats `field` truncated to `unit`, optionally shifted to `timezone`
    /// first.
    ///
    /// When [`requires_utc_offset`](Self::requires_utc_offset) is true the
    /// timezone must already be a numeric offset such as `+05:30`.
    fn truncate_date(&self, field: &str, unit: DateUnit, timezone: Option<&str>) -> String;

    /// `"<day of week 0-6>:<hour 00-23>"` for heat-map bucketing.
    fn weekly_bucket(&self, field: &str, timezone: &str) -> String;

    /// Seconds since the epoch.
    fn unix_timestamp(&self, field: &str) -> String;

    /// Whole seconds from `start` to `end`.
    fn timestamp_diff_seconds(&self, start: &str, end: &str) -> String;

    /// Whole seconds between the earliest and latest `field` in a group.
    fn elapsed_seconds(&self, field: &str) -> String;

    /// The case-insensitive pattern match operator.
    fn like_operator(&self) -> &'static str;

    /// `AND column <like> {{search}}` for template search clauses.
    fn search_predicate(&self, column: &str) -> String {
        format!("AND {} {} {{{{search}}}}", column, self.like_operator())
    }

    /// Spelling of the `position`-th (1-based) positional parameter.
    fn placeholder(&self, position: usize, type_hint: Option<&str>) -> String;

    /// Whether timezone arguments must be numeric UTC offsets.
    fn requires_utc_offset(&self) -> bool;

    /// Whether case-insensitive matching must be requested explicitly.
    fn explicit_case_insensitive(&self) -> bool;
}

static CURRENT: OnceLock<Dialect> = OnceLock::new();

/// Installs the process dialect.
///
/// Installing the same dialect twice is a no-op; installing a different one
/// is rejected so there is a single source of truth.
pub fn install(dialect: Dialect) -> QueryResult<Dialect> {
    let current = *CURRENT.get_or_init(|| dialect);
    if current != dialect {
        return Err(QueryError::UnsupportedDialect {
            value: format!("{} (already configured as {})", dialect, current),
        });
    }
    tracing::debug!(dialect = %current, "SQL dialect installed");
    Ok(current)
}

/// Returns the process dialect, resolving it from the environment on first
/// use.
///
/// Fails with [`QueryError::UnsupportedDialect`] when the environment cannot
/// be parsed or names neither supported engine; binaries treat that as fatal.
pub fn current() -> QueryResult<Dialect> {
    if let Some(dialect) = CURRENT.get() {
        return Ok(*dialect);
    }
    let dialect = crate::config::DialectConfig::try_from_env()?.dialect()?;
    install(dialect)
}
