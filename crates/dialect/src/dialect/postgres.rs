//! PostgreSQL spelling.
//!
//! Uses `$N` parameter placeholders with optional inline casts, `ILIKE` for
//! case-insensitive matching, and `AT TIME ZONE` for zone conversion.

use super::{DateUnit, Dialect, SqlDialect};

/// PostgreSQL fragment generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    fn date_format(unit: DateUnit) -> &'static str {
        match unit {
            DateUnit::Minute => r#"YYYY-MM-DD"T"HH24:MI:00"#,
            DateUnit::Hour => r#"YYYY-MM-DD"T"HH24:00:00"#,
            DateUnit::Day => "YYYY-MM-DD",
            DateUnit::Month => "YYYY-MM-01",
            DateUnit::Year => "YYYY-01-01",
        }
    }

    fn in_zone(field: &str, timezone: &str) -> String {
        format!("{} at time zone '{}'", field, timezone)
    }
}

impl SqlDialect for PostgresDialect {
    fn kind(&self) -> Dialect {
        Dialect::Postgres
    }

    fn add_interval(&self, field: &str, interval: &str) -> String {
        format!("{} + interval '{}'", field, interval)
    }

    fn day_diff(&self, a: &str, b: &str) -> String {
        format!("{}::date - {}::date", a, b)
    }

    fn cast_column(&self, field: &str, sql_type: &str) -> String {
        format!("{}::{}", field, sql_type)
    }

    fn truncate_date(&self, field: &str, unit: DateUnit, timezone: Option<&str>) -> String {
        let source = match timezone {
            Some(tz) => Self::in_zone(field, tz),
            None => field.to_string(),
        };
        format!(
            "to_char(date_trunc('{}', {}), '{}')",
            unit,
            source,
            Self::date_format(unit)
        )
    }

    fn weekly_bucket(&self, field: &str, timezone: &str) -> String {
        let zoned = Self::in_zone(field, timezone);
        format!(
            "concat(extract(dow from ({})), ':', to_char(({}), 'HH24'))",
            zoned, zoned
        )
    }

    fn unix_timestamp(&self, field: &str) -> String {
        format!("floor(extract(epoch from {}))", field)
    }

    fn timestamp_diff_seconds(&self, start: &str, end: &str) -> String {
        format!("floor(extract(epoch from ({} - {})))", end, start)
    }

    fn elapsed_seconds(&self, field: &str) -> String {
        format!("floor(extract(epoch from max({}) - min({})))", field, field)
    }

    fn like_operator(&self) -> &'static str {
        "ilike"
    }

    fn placeholder(&self, position: usize, type_hint: Option<&str>) -> String {
        match type_hint {
            Some(hint) => format!("${}::{}", position, hint),
            None => format!("${}", position),
        }
    }

    fn requires_utc_offset(&self) -> bool {
        false
    }

    fn explicit_case_insensitive(&self) -> bool {
        true
    }
}
