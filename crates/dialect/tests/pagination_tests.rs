//! Paged query tests over the raw and structured paths.

mod common;

use std::sync::Arc;

use helios_dialect::dialect::Dialect;
use helios_dialect::entity::{Criteria, Entity, SqlEntityStore};
use helios_dialect::error::QueryError;
use helios_dialect::executor::RawQuery;
use helios_dialect::paging::{paged_query, paged_raw_query};
use helios_dialect::types::{PageParams, ParamMap, SqlValue};
use serde_json::json;

use common::{RecordingExecutor, row, website_id};

const EVENTS_SQL: &str = "select event_id, url_path from website_event where website_id = {{websiteId}}";

fn website_params() -> ParamMap {
    let mut params = ParamMap::new();
    params.insert("websiteId".to_string(), SqlValue::Uuid(website_id()));
    params
}

#[tokio::test]
async fn test_raw_third_page_of_ten() {
    let executor = Arc::new(
        RecordingExecutor::new()
            .with_rows(vec![row(json!({"event_id": 21, "url_path": "/"}))])
            .with_count(57),
    );
    let runner = RawQuery::new(Dialect::MySql, executor.clone());
    let page = PageParams::new(3, 10).with_order("url_path", true);

    let result = paged_raw_query(&runner, EVENTS_SQL, &website_params(), &page)
        .await
        .unwrap();

    assert_eq!(result.count, 57);
    assert_eq!(result.page, 3);
    assert_eq!(result.page_size, 10);
    assert_eq!(result.order_by.as_deref(), Some("url_path"));
    assert_eq!(result.data.len(), 1);

    let data = executor.find("select event_id").unwrap();
    assert_eq!(
        data.sql,
        "select event_id, url_path from website_event where website_id = ?\n\
         order by url_path desc\n\
         limit 10 offset 20"
    );

    let count = executor.find("select count(*) as num").unwrap();
    assert_eq!(
        count.sql,
        "select count(*) as num from (select event_id, url_path from website_event where website_id = ?) as t"
    );
    assert_eq!(count.params, vec![SqlValue::Uuid(website_id())]);
}

#[tokio::test]
async fn test_raw_zero_page_size_is_unlimited() {
    let executor = Arc::new(RecordingExecutor::new().with_count("123"));
    let runner = RawQuery::new(Dialect::Postgres, executor.clone());

    let result = paged_raw_query(&runner, EVENTS_SQL, &website_params(), &PageParams::new(2, 0))
        .await
        .unwrap();

    assert_eq!(result.count, 123);
    assert_eq!(result.page_size, 0);

    let data = executor.find("select event_id").unwrap();
    assert!(!data.sql.contains("limit"));
    assert!(!data.sql.contains("order by"));
}

#[tokio::test]
async fn test_raw_rejects_unsafe_order_by() {
    let executor = Arc::new(RecordingExecutor::new());
    let runner = RawQuery::new(Dialect::Postgres, executor.clone());
    let page = PageParams::new(1, 10).with_order("url_path; drop table session", false);

    let err = paged_raw_query(&runner, EVENTS_SQL, &website_params(), &page)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::InvalidOrderBy { .. }));
    assert!(executor.executed().is_empty());
}

#[tokio::test]
async fn test_structured_page_with_count() {
    let executor = Arc::new(
        RecordingExecutor::new()
            .with_rows(vec![
                row(json!({"website_id": "a", "name": "Blog"})),
                row(json!({"website_id": "b", "name": "Shop"})),
            ])
            .with_count(12),
    );
    let store = SqlEntityStore::new(RawQuery::new(Dialect::Postgres, executor.clone()));
    let criteria = Criteria::new().where_eq("team_id", "t-1");
    let page = PageParams::new(3, 5).with_order("name", false);

    let result = paged_query(&store, Entity::Website, &criteria, &page)
        .await
        .unwrap();

    assert_eq!(result.count, 12);
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.page, 3);

    let data = executor.find("select \"website\".*").unwrap();
    assert!(data.sql.ends_with("order by name asc\nlimit 5 offset 10"));
    assert_eq!(data.params, vec![SqlValue::text("t-1")]);

    let count = executor.find("select count(*) as num").unwrap();
    assert!(!count.sql.contains("limit"));
    assert_eq!(count.params, vec![SqlValue::text("t-1")]);
}

#[test]
fn test_page_envelope_serializes_camel_case() {
    let page = PageParams::new(2, 20);
    let result = helios_dialect::types::PagedResult::new(vec![1, 2], 42, &page);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        json!({"data": [1, 2], "count": 42, "page": 2, "pageSize": 20, "orderBy": null})
    );
}
