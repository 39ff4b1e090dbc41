//! MySQL spelling.
//!
//! Uses `?` placeholders, relies on case-insensitive collations for `LIKE`,
//! and converts zones with `CONVERT_TZ` from UTC to a numeric offset.

use super::{DateUnit, Dialect, SqlDialect};

/// MySQL fragment generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    fn date_format(unit: DateUnit) -> &'static str {
        match unit {
            DateUnit::Minute => "%Y-%m-%dT%H:%i:00",
            DateUnit::Hour => "%Y-%m-%dT%H:00:00",
            DateUnit::Day => "%Y-%m-%d",
            DateUnit::Month => "%Y-%m-01",
            DateUnit::Year => "%Y-01-01",
        }
    }

    fn from_utc(field: &str, offset: &str) -> String {
        format!("convert_tz({},'+00:00','{}')", field, offset)
    }
}

impl SqlDialect for MySqlDialect {
    fn kind(&self) -> Dialect {
        Dialect::MySql
    }

    fn add_interval(&self, field: &str, interval: &str) -> String {
        format!("DATE_ADD({}, interval {})", field, interval)
    }

    fn day_diff(&self, a: &str, b: &str) -> String {
        format!("DATEDIFF({}, {})", a, b)
    }

    fn cast_column(&self, field: &str, _sql_type: &str) -> String {
        field.to_string()
    }

    fn truncate_date(&self, field: &str, unit: DateUnit, timezone: Option<&str>) -> String {
        let source = match timezone {
            Some(offset) => Self::from_utc(field, offset),
            None => field.to_string(),
        };
        format!("date_format({}, '{}')", source, Self::date_format(unit))
    }

    fn weekly_bucket(&self, field: &str, timezone: &str) -> String {
        format!("date_format({}, '%w:%H')", Self::from_utc(field, timezone))
    }

    fn unix_timestamp(&self, field: &str) -> String {
        format!("UNIX_TIMESTAMP({})", field)
    }

    fn timestamp_diff_seconds(&self, start: &str, end: &str) -> String {
        format!("timestampdiff(second, {}, {})", start, end)
    }

    fn elapsed_seconds(&self, field: &str) -> String {
        format!(
            "floor(unix_timestamp(max({})) - unix_timestamp(min({})))",
            field, field
        )
    }

    fn like_operator(&self) -> &'static str {
        "like"
    }

    fn placeholder(&self, _position: usize, _type_hint: Option<&str>) -> String {
        "?".to_string()
    }

    fn requires_utc_offset(&self) -> bool {
        true
    }

    fn explicit_case_insensitive(&self) -> bool {
        false
    }
}
