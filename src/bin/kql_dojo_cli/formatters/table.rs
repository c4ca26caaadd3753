use anyhow::Result;
use colored::*;
use prettytable::{Table, Row, Cell};
use kql_dojo::{QueryResult, TableInfo, Value};
use crate::formatters::Formatter;

/// Longueur maximale d'une cellule avant troncature
const MAX_CELL_WIDTH: usize = 50;

/// Formateur au format tableau
pub struct TableFormatter {
    /// Indique si les couleurs sont activées
    colored: bool,
}

impl TableFormatter {
    /// Crée un nouveau formateur tableau
    pub fn new() -> Self {
        TableFormatter {
            colored: true,
        }
    }

    /// Désactive les couleurs
    #[cfg(test)]
    pub fn without_colors() -> Self {
        TableFormatter {
            colored: false,
        }
    }
}

impl Formatter for TableFormatter {
    fn format_result(&self, result: &QueryResult) -> Result<String> {
        if let Some(error) = &result.error {
            return Ok(self.format_error(error));
        }

        let mut table = Table::new();

        // En-têtes
        table.set_titles(Row::new(
            result.columns.iter().map(|c| Cell::new(c).style_spec("b")).collect(),
        ));

        // Une ligne par enregistrement, colonnes manquantes vides
        for row in &result.rows {
            let cells = result
                .columns
                .iter()
                .map(|c| Cell::new(&cell_text(row.get(c))))
                .collect();
            table.add_row(Row::new(cells));
        }

        let footer = format!("{} ligne(s)", result.row_count);
        Ok(format!("{}{}", table, self.format_info(&footer)))
    }

    fn format_tables(&self, tables: &[TableInfo]) -> Result<String> {
        let mut table = Table::new();

        // En-têtes
        table.set_titles(Row::new(vec![
            Cell::new("Table").style_spec("b"),
            Cell::new("Lignes").style_spec("b"),
        ]));

        for info in tables {
            table.add_row(Row::new(vec![
                Cell::new(&info.name),
                Cell::new(&info.rows.to_string()).style_spec("r"),
            ]));
        }

        Ok(table.to_string())
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

/// Convertit une cellule en texte, en tronquant les chaînes longues
fn cell_text(value: Option<&Value>) -> String {
    let text = value.map(Value::to_text).unwrap_or_default();
    if text.chars().count() > MAX_CELL_WIDTH {
        let head: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        text
    }
}
