use serde::{Serialize, Deserialize};

use crate::core::record::Record;

/// Read-only source of named tables the query engine runs against
pub trait TableStore: Send + Sync {
    /// Get the rows of a table, or `None` if no such table exists
    fn table(&self, name: &str) -> Option<&[Record]>;

    /// Names of every known table, in registration order
    fn table_names(&self) -> Vec<String>;

    /// Name and row count of every table
    fn tables(&self) -> Vec<TableInfo> {
        self.table_names()
            .into_iter()
            .map(|name| {
                let rows = self.table(&name).map_or(0, <[Record]>::len);
                TableInfo { name, rows }
            })
            .collect()
    }
}

/// Summary of a table, as listed by the CLI and the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub rows: usize,
}
