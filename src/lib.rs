//! KQL Dojo: a pipe-chained query evaluator for log-hunting challenges
//!
//! This crate runs a small, forgiving subset of a log query language
//! against in-memory tables. The built-in dataset simulates the sign-in,
//! security and network logs the dojo challenges are played on.

pub mod core;
pub mod storage;
pub mod ql;
pub mod server;

use std::path::Path as StdPath;
use crate::core::store::TableStore;
use storage::MemoryStore;

/// Main API for KQL Dojo
pub struct Dojo {
    store: Box<dyn TableStore>,
}

impl Dojo {
    /// Create an instance over the built-in dataset generated from `seed`
    pub fn with_builtin_dataset(seed: u64) -> Self {
        Dojo::from_store(Box::new(storage::builtin(seed)))
    }

    /// Create an instance over every `<Table>.json` file of a directory
    pub fn load_dir<P: AsRef<StdPath>>(dir: P) -> Result<Self> {
        let store = MemoryStore::load_dir(dir)?;
        Ok(Dojo::from_store(Box::new(store)))
    }

    /// Create an instance over any table store
    pub fn from_store(store: Box<dyn TableStore>) -> Self {
        Dojo { store }
    }

    /// Run a query. Errors are reported inside the result.
    pub fn execute(&self, query: &str) -> QueryResult {
        ql::execute(query, &*self.store)
    }

    /// Names and row counts of the available tables
    pub fn tables(&self) -> Vec<TableInfo> {
        self.store.tables()
    }

    /// The underlying table store
    pub fn store(&self) -> &dyn TableStore {
        &*self.store
    }
}

// Re-export the main types
pub use crate::core::value::Value;
pub use crate::core::record::Record;
pub use crate::core::store::TableInfo;
pub use crate::core::errors::{Result, QueryError, StoreError};
pub use ql::{execute, QueryResult};
