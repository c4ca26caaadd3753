use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Serveur injoignable: {0}")]
    ServerUnavailable(String),

    #[error("Format inconnu: {0} (attendu: text, json, table)")]
    UnknownFormat(String),

    #[error("Commande inconnue: .{0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}
