mod app;
mod context;
mod commands;
mod formatters;
mod repl;
mod utils;
mod client;

use anyhow::Result;
use log::info;

fn main() -> Result<()> {
    // Le logger est initialisé par app::run, après lecture de -v
    let result = app::run();

    info!("Fin de l'application KQL Dojo CLI");

    result
}
