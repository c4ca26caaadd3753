//! Query results as handed to callers

use serde::{Serialize, Deserialize};

use crate::core::errors::QueryError;
use crate::core::record::Record;

/// Outcome of one query run.
///
/// Either the rows are populated, or `error` is set and `columns`/`rows` are
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Column names, taken from the first row
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub row_count: usize,
    /// Wall-clock time in milliseconds
    pub execution_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    pub fn success(rows: Vec<Record>, execution_time: f64) -> Self {
        let columns = rows
            .first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default();

        QueryResult {
            columns,
            row_count: rows.len(),
            rows,
            execution_time,
            error: None,
        }
    }

    pub fn failure(error: &QueryError, execution_time: f64) -> Self {
        QueryResult {
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            execution_time,
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
