// src/bin/kql_dojo_cli/app.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::io::{self, Read};
use std::path::PathBuf;
use kql_dojo::Dojo;
use kql_dojo::storage::DEFAULT_SEED;

use crate::commands;
use crate::context::{Backend, Context};
use crate::formatters::OutputFormat;
use crate::repl::Repl;

#[derive(Parser)]
#[command(name = "kql-dojo")]
#[command(about = "CLI pour KQL Dojo", long_about = None)]
struct Cli {
    /// Niveau de verbosité
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Format de sortie (text, json, table)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// URL d'un serveur KQL Dojo (sinon exécution locale)
    #[arg(short, long)]
    server: Option<String>,

    /// Graine du jeu de données intégré
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Répertoire de tables JSON à charger à la place du jeu intégré
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Fichier d'historique du mode interactif
    #[arg(long, default_value = ".kql_dojo_history")]
    history: PathBuf,

    /// Commande à exécuter
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Exécuter une requête ("-" pour lire l'entrée standard)
    Query {
        /// Requête à exécuter
        query: String,
    },

    /// Lister les tables disponibles
    Tables,

    /// Écrire le jeu de données intégré en fichiers JSON
    Generate {
        /// Répertoire de sortie
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Exécute l'application CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.verbose);
    info!("Démarrage de l'application KQL Dojo CLI");

    // Créer un contexte
    let backend = match &cli.data {
        Some(dir) => Backend::Local(Dojo::load_dir(dir)?),
        None => Backend::Local(Dojo::with_builtin_dataset(cli.seed)),
    };
    let mut context = Context::new(cli.verbose, cli.format, backend)?;

    // Si une URL de serveur est fournie, se connecter
    if let Some(server) = &cli.server {
        commands::connect::execute(&mut context, server)?;
    }

    // Exécuter la commande spécifiée ou entrer en mode interactif
    match cli.command {
        Some(Commands::Query { query }) => {
            let query = if query == "-" { read_stdin()? } else { query };
            commands::query::execute(&context, &query)?;
        },
        Some(Commands::Tables) => {
            commands::tables::execute(&context)?;
        },
        Some(Commands::Generate { output }) => {
            commands::generate::execute(&context, &output, cli.seed)?;
        },
        None => {
            // Mode interactif
            let mut repl = Repl::new(context, cli.history)?;
            repl.run()?;
        },
    }

    Ok(())
}

/// Initialise le logger; RUST_LOG reste prioritaire sur -v
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
