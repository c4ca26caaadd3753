// src/bin/server/main.rs
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use kql_dojo::Dojo;
use kql_dojo::server::{DojoServer, ServerConfig};
use kql_dojo::storage::DEFAULT_SEED;

#[derive(Parser)]
#[command(name = "kql-dojo-server")]
#[command(about = "Serveur HTTP pour KQL Dojo", long_about = None)]
struct Cli {
    /// Port d'écoute
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Adresse d'écoute
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Latence simulée avant chaque requête (ms)
    #[arg(short, long, default_value_t = 0)]
    latency_ms: u64,

    /// Graine du jeu de données intégré
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Répertoire de tables JSON à charger à la place du jeu intégré
    #[arg(short, long)]
    data: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialiser le logger
    env_logger::init();

    // Parser les arguments
    let args = Cli::parse();

    // Créer un runtime Tokio manuellement au lieu d'utiliser la macro
    let rt = Runtime::new()?;

    // Exécuter le programme principal de manière asynchrone
    rt.block_on(async_main(args))
}

async fn async_main(args: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Créer la configuration du serveur
    let config = ServerConfig {
        port: args.port,
        host: args.host.clone(),
        latency_ms: args.latency_ms,
    };

    // Charger les tables
    let dojo = match &args.data {
        Some(dir) => {
            println!("Chargement des tables depuis: {:?}", dir);
            Dojo::load_dir(dir)?
        }
        None => {
            println!("Génération du jeu de données (graine {})", args.seed);
            Dojo::with_builtin_dataset(args.seed)
        }
    };

    for table in dojo.tables() {
        println!("  {} ({} lignes)", table.name, table.rows);
    }

    // Créer et démarrer le serveur
    let server = DojoServer::new(dojo, config);

    println!("Démarrage du serveur sur {}:{}", args.host, args.port);
    server.run().await?;

    Ok(())
}
