//! Executing bound templates.
//!
//! [`QueryExecutor`] is the seam to the database driver. [`RawQuery`] binds
//! a template for the configured dialect, hands the statement to the
//! [`DiagnosticSink`], then executes it. Driver errors are returned as-is;
//! there is no retry at this layer.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::dialect::Dialect;
use crate::error::{ExecutionError, QueryResult};
use crate::template::{BindMode, BoundQuery, Template};
use crate::types::{ParamMap, Row, SqlValue};

/// Runs positional-parameter SQL and returns rows.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes `sql` with `params` bound in order.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, ExecutionError>;
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, ExecutionError> {
        (**self).query(sql, params).await
    }
}

/// Receives every statement right before it is executed.
///
/// Implementations must not fail or panic.
pub trait DiagnosticSink: Send + Sync {
    /// Records a bound statement.
    fn record(&self, query: &BoundQuery);
}

/// Discards diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _query: &BoundQuery) {}
}

/// Logs statements at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, query: &BoundQuery) {
        let params = serde_json::to_string(&query.params).unwrap_or_default();
        tracing::debug!(
            target: "helios_dialect::query",
            sql = %query.sql,
            params = %params,
            "Executing query"
        );
    }
}

/// Keeps statements in memory, mostly for assertions in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    queries: Mutex<Vec<BoundQuery>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded statements.
    pub fn queries(&self) -> Vec<BoundQuery> {
        self.queries.lock().clone()
    }

    /// Removes and returns the recorded statements.
    pub fn take(&self) -> Vec<BoundQuery> {
        std::mem::take(&mut *self.queries.lock())
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, query: &BoundQuery) {
        self.queries.lock().push(query.clone());
    }
}

/// Binds templates for one dialect and runs them on an executor.
#[derive(Clone)]
pub struct RawQuery<E> {
    dialect: Dialect,
    executor: E,
    sink: Arc<dyn DiagnosticSink>,
    mode: BindMode,
}

impl<E> std::fmt::Debug for RawQuery<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawQuery")
            .field("dialect", &self.dialect)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<E: QueryExecutor> RawQuery<E> {
    /// Creates a runner with strict binding and no diagnostics.
    pub fn new(dialect: Dialect, executor: E) -> Self {
        Self {
            dialect,
            executor,
            sink: Arc::new(NoopSink),
            mode: BindMode::Strict,
        }
    }

    /// Sets the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the bind mode.
    pub fn with_bind_mode(mut self, mode: BindMode) -> Self {
        self.mode = mode;
        self
    }

    /// The dialect templates are rendered for.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Binds `template` without executing it.
    pub fn bind(&self, template: &str, params: &ParamMap) -> QueryResult<BoundQuery> {
        Template::parse(template).bind(self.dialect, params, self.mode)
    }

    /// Binds and executes `template`.
    pub async fn execute(&self, template: &str, params: &ParamMap) -> QueryResult<Vec<Row>> {
        let bound = self.bind(template, params)?;
        self.run(&bound).await
    }

    /// Executes an already bound statement.
    pub async fn run(&self, bound: &BoundQuery) -> QueryResult<Vec<Row>> {
        self.sink.record(bound);
        let rows = self.executor.query(&bound.sql, &bound.params).await?;
        Ok(rows)
    }
}
