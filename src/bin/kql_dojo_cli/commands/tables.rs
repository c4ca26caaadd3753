// src/bin/kql_dojo_cli/commands/tables.rs
use anyhow::Result;
use crate::context::Context;

/// Exécute la commande de listage des tables
pub fn execute(context: &Context) -> Result<()> {
    let tables = context.tables()?;

    // Formater et afficher les tables
    let formatted = context.formatter().format_tables(&tables)?;
    println!("{}", formatted);

    Ok(())
}
