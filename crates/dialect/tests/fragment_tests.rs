//! Fragment generator tests across both dialects.
//!
//! These only inspect generated SQL text; output values are checked against
//! real databases in `postgres_tests.rs` and `mysql_tests.rs`.

use helios_dialect::dialect::{DateUnit, Dialect, Fragments};
use helios_dialect::error::QueryError;

#[test]
fn test_repeat_calls_are_byte_identical() {
    for dialect in Dialect::ALL {
        let sql = dialect.sql();
        for unit in DateUnit::ALL {
            assert_eq!(
                sql.truncate_date("created_at", unit, Some("+02:00")),
                sql.truncate_date("created_at", unit, Some("+02:00"))
            );
        }
        assert_eq!(
            sql.weekly_bucket("created_at", "+02:00"),
            sql.weekly_bucket("created_at", "+02:00")
        );
        assert_eq!(
            sql.timestamp_diff_seconds("a", "b"),
            sql.timestamp_diff_seconds("a", "b")
        );
    }
}

#[test]
fn test_bucket_formats_per_unit() {
    let expected = [
        (DateUnit::Minute, r#"YYYY-MM-DD"T"HH24:MI:00"#, "%Y-%m-%dT%H:%i:00"),
        (DateUnit::Hour, r#"YYYY-MM-DD"T"HH24:00:00"#, "%Y-%m-%dT%H:00:00"),
        (DateUnit::Day, "YYYY-MM-DD", "%Y-%m-%d"),
        (DateUnit::Month, "YYYY-MM-01", "%Y-%m-01"),
        (DateUnit::Year, "YYYY-01-01", "%Y-01-01"),
    ];

    for (unit, pg_format, mysql_format) in expected {
        let pg = Dialect::Postgres.sql().truncate_date("created_at", unit, None);
        assert_eq!(
            pg,
            format!("to_char(date_trunc('{}', created_at), '{}')", unit, pg_format)
        );

        let mysql = Dialect::MySql.sql().truncate_date("created_at", unit, None);
        assert_eq!(mysql, format!("date_format(created_at, '{}')", mysql_format));
    }
}

#[test]
fn test_mysql_converts_from_utc() {
    let sql = Dialect::MySql
        .sql()
        .truncate_date("website_event.created_at", DateUnit::Day, Some("+05:30"));
    assert_eq!(
        sql,
        "date_format(convert_tz(website_event.created_at,'+00:00','+05:30'), '%Y-%m-%d')"
    );
}

#[test]
fn test_interval_and_day_diff() {
    let pg = Dialect::Postgres.sql();
    let mysql = Dialect::MySql.sql();

    assert_eq!(pg.add_interval("created_at", "1 day"), "created_at + interval '1 day'");
    assert_eq!(mysql.add_interval("created_at", "1 day"), "DATE_ADD(created_at, interval 1 day)");

    assert_eq!(pg.day_diff("end_at", "start_at"), "end_at::date - start_at::date");
    assert_eq!(mysql.day_diff("end_at", "start_at"), "DATEDIFF(end_at, start_at)");
}

#[test]
fn test_cast_column_is_noop_on_mysql() {
    assert_eq!(Dialect::Postgres.sql().cast_column("x", "numeric"), "x::numeric");
    assert_eq!(Dialect::MySql.sql().cast_column("x", "numeric"), "x");
}

#[test]
fn test_epoch_arithmetic() {
    let pg = Dialect::Postgres.sql();
    let mysql = Dialect::MySql.sql();

    assert_eq!(pg.unix_timestamp("created_at"), "floor(extract(epoch from created_at))");
    assert_eq!(mysql.unix_timestamp("created_at"), "UNIX_TIMESTAMP(created_at)");
    assert_eq!(mysql.timestamp_diff_seconds("a", "b"), "timestampdiff(second, a, b)");
    assert_eq!(
        pg.elapsed_seconds("created_at"),
        "floor(extract(epoch from max(created_at) - min(created_at)))"
    );
    assert_eq!(
        mysql.elapsed_seconds("created_at"),
        "floor(unix_timestamp(max(created_at)) - unix_timestamp(min(created_at)))"
    );
}

#[test]
fn test_fragments_resolve_zone_only_for_mysql() {
    let pg = Fragments::fixed_offsets(Dialect::Postgres);
    let mysql = Fragments::fixed_offsets(Dialect::MySql);

    assert!(
        pg.weekly_bucket("created_at", "Europe/Berlin")
            .unwrap()
            .contains("at time zone 'Europe/Berlin'")
    );
    assert_eq!(
        mysql.weekly_bucket("created_at", "UTC").unwrap(),
        "date_format(convert_tz(created_at,'+00:00','+00:00'), '%w:%H')"
    );
    assert!(matches!(
        mysql.weekly_bucket("created_at", "Europe/Berlin"),
        Err(QueryError::UnknownTimezone { .. })
    ));
}

#[test]
fn test_unknown_unit_never_reaches_generator() {
    let err = "fortnight".parse::<DateUnit>().unwrap_err();
    assert_eq!(err.to_string(), "invalid date unit: fortnight");
}
