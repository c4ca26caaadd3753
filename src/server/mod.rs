// src/server/mod.rs
//! Serveur HTTP pour KQL Dojo
//!
//! Ce module expose l'évaluateur de requêtes à l'interface web des défis.

pub mod routes;

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use log::info;
use warp::Filter;
use crate::Dojo;

/// Configuration du serveur
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port d'écoute
    pub port: u16,
    /// Adresse d'écoute
    pub host: String,
    /// Latence simulée avant chaque requête, en millisecondes
    pub latency_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 3000,
            host: "127.0.0.1".to_string(),
            latency_ms: 0,
        }
    }
}

impl ServerConfig {
    /// Adresse de socket construite à partir de l'hôte et du port
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Serveur HTTP pour KQL Dojo
pub struct DojoServer {
    /// Instance partagée (lecture seule)
    dojo: Arc<Dojo>,
    /// Configuration du serveur
    config: ServerConfig,
}

impl DojoServer {
    /// Crée un nouveau serveur avec l'instance fournie
    pub fn new(dojo: Dojo, config: ServerConfig) -> Self {
        DojoServer {
            dojo: Arc::new(dojo),
            config,
        }
    }

    /// Démarre le serveur HTTP
    pub async fn run(&self) -> Result<(), AddrParseError> {
        let addr = self.config.socket_addr()?;

        // Route GET /health pour vérifier l'état du serveur
        let health_route = warp::path("health")
            .and(warp::get())
            .map(|| "KQL Dojo server is running");

        let api_routes = routes::api_routes(Arc::clone(&self.dojo), self.config.latency_ms);
        let routes = health_route.or(api_routes).with(warp::log("kql_dojo::server"));

        info!("KQL Dojo server running at {}", addr);
        warp::serve(routes).run(addr).await;

        Ok(())
    }
}
