// src/bin/kql_dojo_cli/commands/query.rs
use anyhow::Result;
use crate::context::Context;

/// Exécute la commande d'exécution de requête
pub fn execute(context: &Context, query: &str) -> Result<()> {
    // Exécuter la requête (localement ou sur le serveur)
    let result = context.execute(query)?;

    // Formater et afficher le résultat
    let formatted = context.formatter().format_result(&result)?;
    println!("{}", formatted);

    if context.verbosity() > 0 {
        let summary = format!("{} lignes en {:.3} ms", result.row_count, result.execution_time);
        println!("{}", context.formatter().format_info(&summary));
    }

    Ok(())
}
