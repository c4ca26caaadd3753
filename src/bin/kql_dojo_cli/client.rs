// src/bin/kql_dojo_cli/client.rs
//! Client HTTP pour communiquer avec le serveur KQL Dojo
//!
//! Ce module fournit une interface pour envoyer des requêtes au serveur.

use anyhow::{Result, anyhow};
use reqwest::Client as HttpClient;
use kql_dojo::server::routes::{ApiResponse, QueryRequest};
use kql_dojo::{QueryResult, TableInfo};

/// Configuration du client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL du serveur
    pub server_url: String,
}

/// Client pour communiquer avec le serveur KQL Dojo
pub struct DojoClient {
    /// Configuration du client
    config: ClientConfig,
    /// Client HTTP
    http_client: HttpClient,
}

impl DojoClient {
    /// Crée un nouveau client avec la configuration fournie
    pub fn with_config(config: ClientConfig) -> Self {
        DojoClient {
            config,
            http_client: HttpClient::new(),
        }
    }

    /// Exécute une requête sur le serveur
    ///
    /// Une requête invalide n'est pas une erreur de transport: le résultat
    /// porte alors son message dans `error`.
    pub async fn execute_query(&self, query: &str) -> Result<QueryResult> {
        let url = format!("{}/api/query", self.config.server_url);

        let request = QueryRequest {
            query: query.to_string(),
        };

        let response: ApiResponse<QueryResult> = self.http_client.post(&url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        response.data.ok_or_else(|| {
            anyhow!(response.error.unwrap_or_else(|| "No data returned".to_string()))
        })
    }

    /// Liste les tables du serveur
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let url = format!("{}/api/tables", self.config.server_url);

        let response: ApiResponse<Vec<TableInfo>> = self.http_client.get(&url)
            .send()
            .await?
            .json()
            .await?;

        if response.success {
            response.data.ok_or_else(|| anyhow!("No data returned"))
        } else {
            Err(anyhow!(response.error.unwrap_or_else(|| "Unknown error".to_string())))
        }
    }

    /// Vérifie la connexion au serveur
    pub async fn check_connection(&self) -> Result<bool> {
        let url = format!("{}/health", self.config.server_url);

        let response = self.http_client.get(&url)
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
