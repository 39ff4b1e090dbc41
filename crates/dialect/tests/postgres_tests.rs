//! PostgreSQL executor integration tests.
//!
//! Tests that need a running PostgreSQL instance use testcontainers to spin
//! one up in Docker.
//!
//! Run with: `cargo test -p helios-dialect --features postgres -- postgres`

#![cfg(feature = "postgres")]

use helios_dialect::backends::postgres::{PostgresConfig, PostgresSslMode};

// ============================================================================
// Configuration Tests (no PostgreSQL instance required)
// ============================================================================

#[test]
fn test_postgres_config_defaults() {
    let config = PostgresConfig::default();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 5432);
    assert_eq!(config.dbname, "helios");
    assert_eq!(config.user, "postgres");
    assert!(config.password.is_none());
    assert_eq!(config.max_connections, 10);
    assert_eq!(config.statement_timeout_ms, 30000);
    assert!(matches!(config.ssl_mode, PostgresSslMode::Prefer));
}

#[test]
fn test_postgres_config_serialization() {
    let config = PostgresConfig {
        host: "pg-server".to_string(),
        port: 5433,
        password: Some("secret".to_string()),
        ..Default::default()
    };

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: PostgresConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.host, "pg-server");
    assert_eq!(deserialized.port, 5433);
    assert_eq!(deserialized.password, Some("secret".to_string()));
}

#[test]
fn test_postgres_config_partial_json_uses_defaults() {
    let config: PostgresConfig = serde_json::from_str(r#"{"host": "db"}"#).unwrap();
    assert_eq!(config.host, "db");
    assert_eq!(config.port, 5432);
    assert_eq!(config.max_connections, 10);
}

// ============================================================================
// Integration Tests (require Docker)
// ============================================================================

mod postgres_integration {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use helios_dialect::backends::postgres::{PostgresConfig, PostgresExecutor};
    use helios_dialect::dialect::{DateUnit, Dialect, Fragments};
    use helios_dialect::executor::RawQuery;
    use helios_dialect::paging::paged_raw_query;
    use helios_dialect::types::{PageParams, ParamMap, SqlValue};

    use testcontainers::ImageExt;
    use testcontainers::runners::AsyncRunner;
    use testcontainers_modules::postgres::Postgres;
    use tokio::sync::OnceCell;

    /// Zone argument accepted by the raw generator.
    const UTC_ZONE: &str = "UTC";

    /// Shared PostgreSQL container reused across all tests in this module.
    struct SharedPg {
        executor: Arc<PostgresExecutor>,
        /// Kept alive for the duration of the test binary; dropped at process exit.
        _container: testcontainers::ContainerAsync<Postgres>,
    }

    static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

    async fn shared_pg() -> &'static SharedPg {
        SHARED_PG
            .get_or_init(|| async {
                let run_id = std::env::var("GITHUB_RUN_ID").unwrap_or_default();
                let container = Postgres::default()
                    .with_label("github.run_id", &run_id)
                    .start()
                    .await
                    .expect("Failed to start PostgreSQL container");

                let port = container
                    .get_host_port_ipv4(5432)
                    .await
                    .expect("Failed to get host port");
                let host = container
                    .get_host()
                    .await
                    .expect("Failed to get host")
                    .to_string();

                let config = PostgresConfig {
                    host,
                    port,
                    dbname: "postgres".to_string(),
                    user: "postgres".to_string(),
                    password: Some("postgres".to_string()),
                    max_connections: 4,
                    ..Default::default()
                };
                let executor = Arc::new(
                    PostgresExecutor::new(config)
                        .await
                        .expect("Failed to create PostgresExecutor"),
                );

                seed(&executor).await;

                SharedPg {
                    executor,
                    _container: container,
                }
            })
            .await
    }

    async fn seed(executor: &Arc<PostgresExecutor>) {
        let runner = RawQuery::new(Dialect::Postgres, executor.clone());
        runner
            .execute(
                "create table website_event (\
                 event_id serial primary key, \
                 created_at timestamptz not null, \
                 url_path varchar(500) not null)",
                &ParamMap::new(),
            )
            .await
            .expect("Failed to create website_event");

        let first = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 30).unwrap();
        let second = first + chrono::Duration::seconds(90);
        for (created_at, url) in [(first, "/"), (second, "/pricing")] {
            let mut params = ParamMap::new();
            params.insert("createdAt".to_string(), SqlValue::Timestamp(created_at));
            params.insert("url".to_string(), SqlValue::text(url));
            runner
                .execute(
                    "insert into website_event (created_at, url_path) values ({{createdAt}}, {{url}})",
                    &params,
                )
                .await
                .expect("Failed to insert fixture");
        }
    }

    fn runner(shared: &SharedPg) -> RawQuery<Arc<PostgresExecutor>> {
        RawQuery::new(Dialect::Postgres, shared.executor.clone())
    }

    #[tokio::test]
    async fn test_timestamp_diff_seconds_returns_ninety() {
        let shared = shared_pg().await;
        let diff = Dialect::Postgres.sql().timestamp_diff_seconds("s.a", "s.b");
        let sql = format!(
            "select {} as diff from (select min(created_at) as a, max(created_at) as b from website_event) as s",
            diff
        );

        let rows = runner(shared).execute(&sql, &ParamMap::new()).await.unwrap();
        assert_eq!(rows[0]["diff"].as_f64(), Some(90.0));
    }

    #[tokio::test]
    async fn test_elapsed_seconds_returns_ninety() {
        let shared = shared_pg().await;
        let sql = format!(
            "select {} as elapsed from website_event",
            Dialect::Postgres.sql().elapsed_seconds("created_at")
        );

        let rows = runner(shared).execute(&sql, &ParamMap::new()).await.unwrap();
        assert_eq!(rows[0]["elapsed"].as_f64(), Some(90.0));
    }

    #[tokio::test]
    async fn test_bucket_values() {
        let shared = shared_pg().await;
        let expected = [
            (DateUnit::Minute, "2024-03-05T14:07:00"),
            (DateUnit::Hour, "2024-03-05T14:00:00"),
            (DateUnit::Day, "2024-03-05"),
            (DateUnit::Month, "2024-03-01"),
            (DateUnit::Year, "2024-01-01"),
        ];

        for (unit, value) in expected {
            let sql = format!(
                "select {} as bucket from website_event order by event_id limit 1",
                Dialect::Postgres.sql().truncate_date("created_at", unit, Some("UTC"))
            );
            let rows = runner(shared).execute(&sql, &ParamMap::new()).await.unwrap();
            assert_eq!(rows[0]["bucket"], json!(value), "unit {}", unit);
        }
    }

    #[tokio::test]
    async fn test_case_insensitive_like() {
        let shared = shared_pg().await;
        let sql = format!(
            "select url_path from website_event where url_path {} {{{{search}}}}",
            Dialect::Postgres.sql().like_operator()
        );
        let mut params = ParamMap::new();
        params.insert("search".to_string(), SqlValue::text("%PRIC%"));

        let rows = runner(shared).execute(&sql, &params).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["url_path"], json!("/pricing"));
    }

    #[tokio::test]
    async fn test_paged_raw_query() {
        let shared = shared_pg().await;
        let page = PageParams::new(2, 1).with_order("event_id", false);

        let result = paged_raw_query(
            &runner(shared),
            "select event_id, url_path from website_event",
            &ParamMap::new(),
            &page,
        )
        .await
        .unwrap();

        assert_eq!(result.count, 2);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0]["url_path"], json!("/pricing"));
    }

    #[tokio::test]
    async fn test_same_hour_shares_bucket() {
        let shared = shared_pg().await;
        let fragments = Fragments::fixed_offsets(Dialect::Postgres);
        let bucket = |unit| {
            let sql = format!(
                "select {} as bucket from website_event order by event_id",
                fragments.date_bucket("created_at", unit, Some("UTC")).unwrap()
            );
            let runner = runner(shared);
            async move { runner.execute(&sql, &ParamMap::new()).await.unwrap() }
        };

        let hours = bucket(DateUnit::Hour).await;
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0]["bucket"], json!("2024-03-05T14:00:00"));
        assert_eq!(hours[0]["bucket"], hours[1]["bucket"]);

        let minutes = bucket(DateUnit::Minute).await;
        assert_eq!(minutes[0]["bucket"], json!("2024-03-05T14:07:00"));
        assert_eq!(minutes[1]["bucket"], json!("2024-03-05T14:09:00"));
    }

    #[tokio::test]
    async fn test_add_interval_moves_day_bucket() {
        let shared = shared_pg().await;
        let sql = format!(
            "select {} as bucket from (select {} as later from website_event order by event_id limit 1) as s",
            Dialect::Postgres.sql().truncate_date("s.later", DateUnit::Day, Some(UTC_ZONE)),
            Dialect::Postgres.sql().add_interval("created_at", "1 day"),
        );

        let rows = runner(shared).execute(&sql, &ParamMap::new()).await.unwrap();
        assert_eq!(rows[0]["bucket"], json!("2024-03-06"));
    }

    #[tokio::test]
    async fn test_day_diff_counts_days() {
        let shared = shared_pg().await;
        let sql = format!(
            "select {} as days from (select {} as later, created_at as earlier from website_event order by event_id limit 1) as s",
            Dialect::Postgres.sql().day_diff("s.later", "s.earlier"),
            Dialect::Postgres.sql().add_interval("created_at", "2 day"),
        );

        let rows = runner(shared).execute(&sql, &ParamMap::new()).await.unwrap();
        assert_eq!(rows[0]["days"].as_f64(), Some(2.0));
    }

    #[tokio::test]
    async fn test_unix_timestamp_matches_fixture() {
        let shared = shared_pg().await;
        let sql = format!(
            "select {} as epoch from website_event order by event_id",
            Dialect::Postgres.sql().unix_timestamp("created_at")
        );
        let first = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 30).unwrap();

        let rows = runner(shared).execute(&sql, &ParamMap::new()).await.unwrap();
        assert_eq!(rows[0]["epoch"].as_f64(), Some(first.timestamp() as f64));
        assert_eq!(rows[1]["epoch"].as_f64(), Some((first.timestamp() + 90) as f64));
    }

    #[tokio::test]
    async fn test_cast_column_compares_as_text() {
        let shared = shared_pg().await;
        let sql = format!(
            "select count(*) as num from website_event where {} = {{{{url}}}}",
            Dialect::Postgres.sql().cast_column("url_path", "text")
        );
        let mut params = ParamMap::new();
        params.insert("url".to_string(), SqlValue::text("/pricing"));

        let rows = runner(shared).execute(&sql, &params).await.unwrap();
        assert_eq!(rows[0]["num"].as_f64(), Some(1.0));
    }

    #[tokio::test]
    async fn test_weekly_bucket() {
        let shared = shared_pg().await;
        let sql = format!(
            "select {} as bucket from website_event order by event_id",
            Fragments::fixed_offsets(Dialect::Postgres)
                .weekly_bucket("created_at", "UTC")
                .unwrap()
        );

        let rows = runner(shared).execute(&sql, &ParamMap::new()).await.unwrap();
        // 2024-03-05 is a Tuesday.
        assert_eq!(rows[0]["bucket"], json!("2:14"));
        assert_eq!(rows[0]["bucket"], rows[1]["bucket"]);
    }
}
