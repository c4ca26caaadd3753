// src/bin/kql_dojo_cli/context.rs
use tokio::runtime::Runtime;
use kql_dojo::{Dojo, QueryResult, TableInfo};
use crate::client::{DojoClient, ClientConfig};
use crate::formatters::{OutputFormat, Formatter};
use crate::formatters::text::TextFormatter;
use crate::formatters::json::JsonFormatter;
use crate::formatters::table::TableFormatter;
use crate::utils::error::CliError;
use anyhow::{Result, anyhow};

/// Source des résultats de requêtes
pub enum Backend {
    /// Évaluation en mémoire dans ce processus
    Local(Dojo),
    /// Évaluation par un serveur KQL Dojo
    Remote(DojoClient),
}

/// Contexte d'exécution du CLI
pub struct Context {
    /// Moteur local ou client distant
    backend: Backend,

    /// Format de sortie
    format: OutputFormat,

    /// Niveau de verbosité
    verbosity: u8,

    /// Formateur actuel
    formatter: Box<dyn Formatter>,

    /// Runtime Tokio pour les appels asynchrones
    runtime: Runtime,
}

impl Context {
    /// Crée un nouveau contexte
    pub fn new(verbosity: u8, format: OutputFormat, backend: Backend) -> Result<Self> {
        // Créer un runtime Tokio
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| anyhow!("Failed to create Tokio runtime: {}", e))?;

        Ok(Context {
            backend,
            format,
            verbosity,
            formatter: formatter_for(format),
            runtime,
        })
    }

    /// Vérifie si les requêtes passent par un serveur
    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    /// Bascule vers un serveur distant
    pub fn connect(&mut self, server_url: &str) -> Result<()> {
        let config = ClientConfig {
            server_url: server_url.trim_end_matches('/').to_string(),
        };

        let client = DojoClient::with_config(config);

        // Vérifier la connexion
        let healthy = self.runtime.block_on(async {
            client.check_connection().await
        })?;
        if !healthy {
            return Err(CliError::ServerUnavailable(server_url.to_string()).into());
        }

        self.backend = Backend::Remote(client);
        Ok(())
    }

    /// Exécute une requête sur le backend courant
    pub fn execute(&self, query: &str) -> Result<QueryResult> {
        match &self.backend {
            Backend::Local(dojo) => Ok(dojo.execute(query)),
            Backend::Remote(client) => self.runtime.block_on(client.execute_query(query)),
        }
    }

    /// Liste les tables du backend courant
    pub fn tables(&self) -> Result<Vec<TableInfo>> {
        match &self.backend {
            Backend::Local(dojo) => Ok(dojo.tables()),
            Backend::Remote(client) => self.runtime.block_on(client.list_tables()),
        }
    }

    /// Obtient le formateur actuel
    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Définit le format de sortie
    pub fn set_format(&mut self, format: OutputFormat) {
        if format != self.format {
            self.format = format;
            self.formatter = formatter_for(format);
        }
    }

    /// Obtient le niveau de verbosité
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }
}

fn formatter_for(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Table => Box::new(TableFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_dojo::storage::MemoryStore;
    use kql_dojo::Value;

    fn local() -> Context {
        let rows = vec![
            vec![("A", Value::Integer(1))].into_iter().collect(),
            vec![("A", Value::Integer(2))].into_iter().collect(),
        ];
        let dojo = Dojo::from_store(Box::new(MemoryStore::new().with_table("Sample", rows)));
        Context::new(0, OutputFormat::Text, Backend::Local(dojo)).unwrap()
    }

    #[test]
    fn test_local_backend() {
        let context = local();
        assert!(!context.is_remote());

        let result = context.execute("Sample | count").unwrap();
        assert_eq!(result.rows[0].get("Count"), Some(&Value::Integer(2)));

        let tables = context.tables().unwrap();
        assert_eq!(tables[0].name, "Sample");
        assert_eq!(tables[0].rows, 2);
    }

    #[test]
    fn test_connect_to_missing_server_keeps_local_backend() {
        let mut context = local();
        assert!(context.connect("http://127.0.0.1:9").is_err());
        assert!(!context.is_remote());
    }
}
