//! In-memory table store for KQL Dojo
//!
//! This module provides the table store every query runs against, plus
//! loading and saving it as a directory of `<Table>.json` files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use log::{debug, info};

use crate::core::errors::{Result, StoreError};
use crate::core::record::Record;
use crate::core::store::TableStore;

/// A named table
#[derive(Debug, Clone, PartialEq)]
struct Table {
    name: String,
    rows: Vec<Record>,
}

/// An in-memory store mapping table names to rows
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Tables in registration order
    tables: Vec<Table>,
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        MemoryStore { tables: Vec::new() }
    }

    /// Register a table, replacing any table of the same name
    pub fn insert_table(&mut self, name: impl Into<String>, rows: Vec<Record>) {
        let name = name.into();
        match self.tables.iter_mut().find(|t| t.name == name) {
            Some(table) => table.rows = rows,
            None => self.tables.push(Table { name, rows }),
        }
    }

    /// Builder-style variant of [`MemoryStore::insert_table`]
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Record>) -> Self {
        self.insert_table(name, rows);
        self
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the store holds no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Load every `*.json` file of a directory as a table named after the
    /// file stem. Each file must hold a JSON array of objects.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut paths: Vec<_> = fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut store = MemoryStore::new();
        for path in paths {
            let name = table_name(&path)?;
            let rows = load_table_file(&path)?;
            debug!("Loaded table {} ({} rows) from {}", name, rows.len(), path.display());
            store.insert_table(name, rows);
        }

        info!("Loaded {} tables from {}", store.len(), dir.as_ref().display());
        Ok(store)
    }

    /// Write every table to `<dir>/<Table>.json`, creating the directory
    pub fn save_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for table in &self.tables {
            let path = dir.join(format!("{}.json", table.name));
            let writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(writer, &table.rows)?;
            debug!("Wrote {} rows to {}", table.rows.len(), path.display());
        }

        Ok(())
    }
}

impl TableStore for MemoryStore {
    fn table(&self, name: &str) -> Option<&[Record]> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.rows.as_slice())
    }

    fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }
}

fn table_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::InvalidTable {
            path: path.to_path_buf(),
            reason: "file name is not a valid table name".to_string(),
        })
}

fn load_table_file(path: &Path) -> Result<Vec<Record>> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| StoreError::InvalidTable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn row(a: i64, b: &str) -> Record {
        vec![("A", Value::Integer(a)), ("B", Value::from(b))].into_iter().collect()
    }

    #[test]
    fn test_lookup_and_names_keep_registration_order() {
        let store = MemoryStore::new()
            .with_table("Sample", vec![row(1, "x")])
            .with_table("Another", vec![]);

        assert_eq!(store.table_names(), vec!["Sample", "Another"]);
        assert_eq!(store.table("Sample").map(<[Record]>::len), Some(1));
        assert!(store.table("sample").is_none());
    }

    #[test]
    fn test_insert_replaces_existing_table() {
        let mut store = MemoryStore::new().with_table("Sample", vec![row(1, "x")]);
        store.insert_table("Sample", vec![row(2, "y"), row(3, "z")]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.table("Sample").map(<[Record]>::len), Some(2));
    }

    #[test]
    fn test_save_and_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new()
            .with_table("Sample", vec![row(1, "x"), row(2, "y")])
            .with_table("Empty", vec![]);

        store.save_dir(dir.path()).unwrap();
        let loaded = MemoryStore::load_dir(dir.path()).unwrap();

        // Files are read back in name order
        assert_eq!(loaded.table_names(), vec!["Empty", "Sample"]);
        assert_eq!(loaded.table("Sample"), store.table("Sample"));
    }

    #[test]
    fn test_load_rejects_non_array_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Broken.json"), r#"{"not": "an array"}"#).unwrap();

        match MemoryStore::load_dir(dir.path()) {
            Err(StoreError::InvalidTable { path, .. }) => {
                assert!(path.ends_with("Broken.json"));
            }
            other => panic!("expected InvalidTable, got {:?}", other),
        }
    }

    #[test]
    fn test_load_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "not a table").unwrap();
        fs::write(dir.path().join("Sample.json"), r#"[{"A": 1}]"#).unwrap();

        let loaded = MemoryStore::load_dir(dir.path()).unwrap();
        assert_eq!(loaded.table_names(), vec!["Sample"]);
    }
}
