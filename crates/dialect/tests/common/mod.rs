//! Shared test infrastructure for the dialect crate.
//!
//! - [`RecordingExecutor`] captures every statement and answers with canned
//!   rows, so paging and store tests can assert on the SQL that was sent.
//! - Fixtures for websites and timestamps.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use uuid::Uuid;

use helios_dialect::error::ExecutionError;
use helios_dialect::executor::QueryExecutor;
use helios_dialect::lookup::{StaticWebsites, Website};
use helios_dialect::types::{Row, SqlValue};

/// A statement as received by the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Executor that records statements and returns canned rows.
///
/// Statements starting with `select count(*) as num` get a single row with
/// the configured count; every other statement gets the configured data
/// rows.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    rows: Vec<Row>,
    count: Option<Value>,
    executed: Mutex<Vec<Executed>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_count(mut self, count: impl Into<Value>) -> Self {
        self.count = Some(count.into());
        self
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.executed.lock().clone()
    }

    /// The recorded statement whose SQL starts with `prefix`.
    pub fn find(&self, prefix: &str) -> Option<Executed> {
        self.executed
            .lock()
            .iter()
            .find(|e| e.sql.starts_with(prefix))
            .cloned()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, ExecutionError> {
        self.executed.lock().push(Executed {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        if sql.starts_with("select count(*) as num") {
            let mut row = Row::new();
            row.insert(
                "num".to_string(),
                self.count.clone().unwrap_or_else(|| json!(self.rows.len())),
            );
            return Ok(vec![row]);
        }
        Ok(self.rows.clone())
    }
}

/// Builds a row from a JSON object literal.
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("row fixture must be an object, got {}", other),
    }
}

pub fn website_id() -> Uuid {
    Uuid::parse_str("5f3c6a9e-8a43-4a7a-9d2c-1c7b0f3e2a11").unwrap()
}

pub fn website() -> Website {
    Website::new(website_id(), "example.com")
}

pub fn websites() -> StaticWebsites {
    StaticWebsites::new().with(website())
}

pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}
