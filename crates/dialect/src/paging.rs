//! Paged queries over the structured and raw paths.
//!
//! Both paths issue two independent statements, the page itself and the
//! total count, and run them concurrently. The count is not taken in the
//! same transaction as the page, so it may drift under concurrent writes.

use serde_json::Value;

use crate::entity::{Criteria, Entity, EntityStore, FindArgs};
use crate::error::{ExecutionError, QueryResult};
use crate::executor::{QueryExecutor, RawQuery};
use crate::types::{PageParams, PagedResult, ParamMap, Row};

/// Pages through `entity` rows matching `criteria`.
pub async fn paged_query<S>(
    store: &S,
    entity: Entity,
    criteria: &Criteria,
    params: &PageParams,
) -> QueryResult<PagedResult<Row>>
where
    S: EntityStore + ?Sized,
{
    let args = FindArgs {
        criteria: criteria.clone(),
        order: params.order()?,
        window: params.window(),
    };

    let (data, count) = tokio::try_join!(
        store.find_many(entity, &args),
        store.count(entity, criteria)
    )?;

    tracing::debug!(
        entity = %entity,
        rows = data.len(),
        count,
        page = params.page,
        "Paged structured query"
    );

    Ok(PagedResult::new(data, count, params))
}

/// Pages through the rows of a raw template.
///
/// The count wraps the template as `select count(*) as num from (<sql>) as
/// t`; the page appends `order by` and `limit ... offset ...` when requested.
pub async fn paged_raw_query<E>(
    runner: &RawQuery<E>,
    sql: &str,
    params: &ParamMap,
    page: &PageParams,
) -> QueryResult<PagedResult<Row>>
where
    E: QueryExecutor,
{
    let count_sql = format!("select count(*) as num from ({}) as t", sql);

    let mut data_sql = sql.to_string();
    if let Some(order) = page.order()? {
        data_sql.push_str(&format!("\norder by {}", order.to_sql()));
    }
    let window = page.window();
    if let (Some(take), Some(skip)) = (window.take, window.skip) {
        data_sql.push_str(&format!("\nlimit {} offset {}", take, skip));
    }

    let (data, count_rows) = tokio::try_join!(
        runner.execute(&data_sql, params),
        runner.execute(&count_sql, params)
    )?;
    let count = read_count(&count_rows)?;

    tracing::debug!(
        dialect = %runner.dialect(),
        rows = data.len(),
        count,
        page = page.page,
        "Paged raw query"
    );

    Ok(PagedResult::new(data, count, page))
}

/// Reads `num` from the first row of a count query.
///
/// Drivers return counts as integers or as numeric strings depending on
/// the column type; both are accepted. No rows means zero.
pub(crate) fn read_count(rows: &[Row]) -> QueryResult<u64> {
    let Some(value) = rows.first().and_then(|row| row.get("num")) else {
        return Ok(0);
    };

    let count = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Null => Some(0),
        _ => None,
    };

    count.ok_or_else(|| {
        ExecutionError::Decode {
            column: "num".to_string(),
            message: format!("expected a row count, got {}", value),
        }
        .into()
    })
}
