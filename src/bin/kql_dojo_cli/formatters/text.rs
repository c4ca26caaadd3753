use anyhow::Result;
use colored::*;
use kql_dojo::{QueryResult, TableInfo};
use crate::formatters::Formatter;

/// Formateur au format texte: une ligne par enregistrement, colonnes
/// séparées par des tabulations
pub struct TextFormatter {
    /// Indique si les couleurs sont activées
    colored: bool,
}

impl TextFormatter {
    /// Crée un nouveau formateur texte
    pub fn new() -> Self {
        TextFormatter {
            colored: true,
        }
    }

    /// Désactive les couleurs
    #[cfg(test)]
    pub fn without_colors() -> Self {
        TextFormatter {
            colored: false,
        }
    }
}

impl Formatter for TextFormatter {
    fn format_result(&self, result: &QueryResult) -> Result<String> {
        if let Some(error) = &result.error {
            return Ok(self.format_error(error));
        }
        if result.rows.is_empty() {
            return Ok(self.format_info("Aucun résultat"));
        }

        let header = result.columns.join("\t");
        let mut lines = vec![if self.colored { header.bold().to_string() } else { header }];

        // Les colonnes absentes d'une ligne restent vides
        for row in &result.rows {
            let cells: Vec<String> = result.columns.iter().map(|c| row.text(c)).collect();
            lines.push(cells.join("\t"));
        }

        Ok(lines.join("\n"))
    }

    fn format_tables(&self, tables: &[TableInfo]) -> Result<String> {
        let lines: Vec<String> = tables
            .iter()
            .map(|t| format!("{}\t{}", t.name, t.rows))
            .collect();
        Ok(lines.join("\n"))
    }

    fn format_error(&self, error: &str) -> String {
        if self.colored {
            format!("{}", error.red().bold())
        } else {
            format!("Erreur: {}", error)
        }
    }

    fn format_info(&self, info: &str) -> String {
        if self.colored {
            format!("{}", info.blue())
        } else {
            format!("Info: {}", info)
        }
    }

    fn format_success(&self, success: &str) -> String {
        if self.colored {
            format!("{}", success.green().bold())
        } else {
            format!("Succès: {}", success)
        }
    }
}
