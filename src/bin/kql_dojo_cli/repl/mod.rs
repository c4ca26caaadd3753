mod buffer;
mod history;

use std::path::PathBuf;
use anyhow::Result;
use clap::ValueEnum;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use crate::context::Context;
use crate::commands;
use crate::formatters::OutputFormat;
use crate::utils::error::CliError;
use self::buffer::QueryBuffer;
use self::history::History;

/// Nombre maximal de requêtes conservées dans l'historique
const HISTORY_SIZE: usize = 1000;

/// Suite à donner après une commande spéciale
enum Flow {
    Continue,
    Exit,
}

/// Mode interactif (REPL)
pub struct Repl {
    /// Contexte d'exécution
    context: Context,

    /// Éditeur de ligne
    editor: DefaultEditor,

    /// Historique personnalisé
    history: History,

    /// Requête en cours de saisie
    buffer: QueryBuffer,
}

impl Repl {
    /// Crée un nouveau REPL
    pub fn new(context: Context, history_path: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        // Charger l'historique s'il existe
        let mut history = History::new(history_path, HISTORY_SIZE);
        if let Err(e) = history.load() {
            log::warn!("Impossible de charger l'historique: {}", e);
        }

        // Charger l'historique dans l'éditeur
        for cmd in history.get_all() {
            let _ = editor.add_history_entry(cmd.as_str());
        }

        Ok(Repl {
            context,
            editor,
            history,
            buffer: QueryBuffer::new(),
        })
    }

    /// Exécute le REPL
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.context.formatter().format_info("KQL Dojo - Mode interactif"));
        println!("{}", self.context.formatter().format_info(
            "Terminez une requête par une ligne vide ou ';'. Tapez .help pour l'aide ou .exit pour quitter"
        ));

        loop {
            // Afficher le prompt
            let prompt = match (self.buffer.is_empty(), self.context.is_remote()) {
                (false, _) => "   ...> ",
                (true, true) => "kql (distant)> ",
                (true, false) => "kql> ",
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    match self.process_line(&line) {
                        Ok(Flow::Continue) => {},
                        Ok(Flow::Exit) => break,
                        Err(e) => {
                            println!("{}", self.context.formatter().format_error(&e.to_string()));
                        }
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C abandonne la requête en cours
                    self.buffer.clear();
                    println!("Interruption (Ctrl-C)");
                },
                Err(ReadlineError::Eof) => {
                    println!("Fin de l'entrée (Ctrl-D)");
                    break;
                },
                Err(err) => {
                    println!("{}", self.context.formatter().format_error(&format!("Erreur: {}", err)));
                    break;
                }
            }
        }

        // Sauvegarder l'historique
        self.history.save()?;

        Ok(())
    }

    /// Traite une ligne entrée par l'utilisateur
    fn process_line(&mut self, line: &str) -> Result<Flow> {
        let trimmed = line.trim();

        // Les commandes spéciales ne sont reconnues qu'en début de requête
        if self.buffer.is_empty() {
            if let Some(cmd) = trimmed.strip_prefix('.') {
                return self.process_special_command(cmd);
            }
        }

        if let Some(query) = self.buffer.push(line) {
            let _ = self.editor.add_history_entry(query.as_str());
            self.history.add(&query);
            commands::query::execute(&self.context, &query)?;
        }

        Ok(Flow::Continue)
    }

    /// Traite les commandes spéciales (commençant par '.')
    fn process_special_command(&mut self, cmd: &str) -> Result<Flow> {
        let parts: Vec<&str> = cmd.split_whitespace().collect();

        match parts.first().copied().unwrap_or("") {
            "help" => {
                self.print_help();
            },
            "exit" | "quit" => {
                println!("Au revoir !");
                return Ok(Flow::Exit);
            },
            "tables" => {
                commands::tables::execute(&self.context)?;
            },
            "format" => {
                let name = parts
                    .get(1)
                    .ok_or(CliError::Usage(".format <text|json|table>"))?;
                let format = OutputFormat::from_str(name, true)
                    .map_err(|_| CliError::UnknownFormat(name.to_string()))?;

                self.context.set_format(format);
                println!("{}", self.context.formatter().format_success(&format!("Format défini à {}", name)));
            },
            "history" => {
                let commands = match parts.get(1) {
                    Some(pattern) => self.history.search(pattern),
                    None => self.history.get_all().to_vec(),
                };

                if commands.is_empty() {
                    println!("Aucune requête dans l'historique.");
                } else {
                    for (i, cmd) in commands.iter().enumerate() {
                        println!("{}: {}", i + 1, cmd);
                    }
                }
            },
            other => {
                return Err(CliError::UnknownCommand(other.to_string()).into());
            }
        }

        Ok(Flow::Continue)
    }

    /// Affiche l'aide
    fn print_help(&self) {
        println!("Commandes disponibles:");
        println!("  .help                     Affiche cette aide");
        println!("  .exit, .quit              Quitte le CLI");
        println!("  .tables                   Liste les tables et leur nombre de lignes");
        println!("  .format <text|json|table> Définit le format de sortie");
        println!("  .history [motif]          Affiche l'historique des requêtes (filtré par motif optionnel)");
        println!();
        println!("Toute autre entrée est ajoutée à la requête en cours.");
        println!("Une ligne vide ou un ';' final l'exécute, par exemple:");
        println!("  SigninLogs");
        println!("  | where ResultType == 50126");
        println!("  | summarize Attempts = count() by UserPrincipalName;");
    }
}
