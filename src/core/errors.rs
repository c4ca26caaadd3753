//! Error types for KQL Dojo
//!
//! `QueryError` covers everything that can go wrong while running a query;
//! `StoreError` covers loading and saving table data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while evaluating a query.
///
/// These never escape `execute`: they are folded into `QueryResult::error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Unknown table: {name}. Available tables: {}", .available.join(", "))]
    UnknownTable {
        name: String,
        available: Vec<String>,
    },

    #[error("Query execution error: {0}")]
    Execution(String),
}

/// Errors that can occur while loading or saving tables
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid table file {}: {reason}", .path.display())]
    InvalidTable {
        path: PathBuf,
        reason: String,
    },
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
