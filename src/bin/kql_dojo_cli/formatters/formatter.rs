use anyhow::Result;
use kql_dojo::{QueryResult, TableInfo};

/// Trait définissant un formateur de sortie
pub trait Formatter {
    /// Formate le résultat d'une requête (lignes ou erreur)
    fn format_result(&self, result: &QueryResult) -> Result<String>;

    /// Formate la liste des tables
    fn format_tables(&self, tables: &[TableInfo]) -> Result<String>;

    /// Formate un message d'erreur
    fn format_error(&self, error: &str) -> String;

    /// Formate un message d'information
    fn format_info(&self, info: &str) -> String;

    /// Formate un message de succès
    fn format_success(&self, success: &str) -> String;
}
