use anyhow::Result;
use colored::*;
use serde::Serialize;
use serde_json::json;
use kql_dojo::{QueryResult, TableInfo};
use crate::formatters::Formatter;

/// Formateur au format JSON, dans la forme renvoyée par le serveur
pub struct JsonFormatter {
    /// Indique si l'indentation est activée
    pretty: bool,
}

impl JsonFormatter {
    /// Crée un nouveau formateur JSON
    pub fn new() -> Self {
        JsonFormatter {
            pretty: true,
        }
    }

    /// Désactive l'indentation
    #[cfg(test)]
    pub fn without_pretty() -> Self {
        JsonFormatter {
            pretty: false,
        }
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl Formatter for JsonFormatter {
    fn format_result(&self, result: &QueryResult) -> Result<String> {
        self.render(result)
    }

    fn format_tables(&self, tables: &[TableInfo]) -> Result<String> {
        self.render(tables)
    }

    fn format_error(&self, error: &str) -> String {
        let json = json!({ "error": error });
        format!("{}", json.to_string().red())
    }

    fn format_info(&self, info: &str) -> String {
        let json = json!({ "info": info });
        format!("{}", json.to_string().blue())
    }

    fn format_success(&self, success: &str) -> String {
        let json = json!({ "success": success });
        format!("{}", json.to_string().green())
    }
}
