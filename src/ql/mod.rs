//! Query Language for KQL Dojo
//!
//! This module runs pipe-chained queries against a table store:
//!
//! ```text
//! SigninLogs
//! | where ResultType == 50126
//! | summarize Attempts = count() by UserPrincipalName
//! | order by Attempts desc
//! ```

pub mod ast;
pub mod parser;
pub mod evaluator;
pub mod aggregate;
pub mod executor;
pub mod result;

use std::time::Instant;
use log::{debug, trace, warn};

use crate::core::errors::QueryError;
use crate::core::record::Record;
use crate::core::store::TableStore;

pub use result::QueryResult;

/// Execute a query string against the given store.
///
/// Never fails: every error is reported through `QueryResult::error`.
pub fn execute<S: TableStore + ?Sized>(query: &str, store: &S) -> QueryResult {
    let started = Instant::now();
    let outcome = run(query, store);
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(rows) => QueryResult::success(rows, elapsed),
        Err(e) => {
            warn!("Query failed: {}", e);
            QueryResult::failure(&e, elapsed)
        }
    }
}

fn run<S: TableStore + ?Sized>(query: &str, store: &S) -> Result<Vec<Record>, QueryError> {
    let script = parser::parse_script(query)?;

    let source = store
        .table(&script.table)
        .ok_or_else(|| QueryError::UnknownTable {
            name: script.table.clone(),
            available: store.table_names(),
        })?;

    // Stages work on a copy; the store is never touched
    let mut rows = source.to_vec();
    for text in &script.stages {
        let stage = parser::parse_stage(text);
        debug!("Applying stage {:?}", stage);
        rows = executor::apply_stage(&stage, rows);
        trace!("{} rows after `{}`", rows.len(), text);
    }

    Ok(rows)
}
