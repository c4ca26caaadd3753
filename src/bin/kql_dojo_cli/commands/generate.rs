// src/bin/kql_dojo_cli/commands/generate.rs
use std::path::Path;
use anyhow::Result;
use kql_dojo::storage;
use crate::context::Context;

/// Écrit le jeu de données intégré, une table par fichier JSON
pub fn execute(context: &Context, output: &Path, seed: u64) -> Result<()> {
    let store = storage::builtin(seed);
    store.save_dir(output)?;

    let message = format!("{} tables écrites dans {}", store.len(), output.display());
    println!("{}", context.formatter().format_success(&message));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_dojo::Dojo;
    use crate::context::Backend;
    use crate::formatters::OutputFormat;

    #[test]
    fn test_generated_files_reload() {
        let dir = tempfile::tempdir().unwrap();
        let context = Context::new(0, OutputFormat::Text, Backend::Local(Dojo::with_builtin_dataset(7))).unwrap();

        execute(&context, dir.path(), 7).unwrap();

        // Les fichiers sont relus par ordre alphabétique
        let mut expected = Dojo::with_builtin_dataset(7).tables();
        expected.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(Dojo::load_dir(dir.path()).unwrap().tables(), expected);
        assert!(dir.path().join("SigninLogs.json").exists());
    }
}
