use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use anyhow::Result;

/// Structure pour gérer l'historique des requêtes
///
/// Chaque entrée est écrite sur une ligne sous forme de chaîne JSON, ce qui
/// conserve les requêtes sur plusieurs lignes.
pub struct History {
    /// Chemin du fichier d'historique
    file_path: PathBuf,

    /// Requêtes en mémoire
    commands: Vec<String>,

    /// Taille maximale de l'historique
    max_size: usize,
}

impl History {
    /// Crée un nouvel historique
    pub fn new(file_path: impl Into<PathBuf>, max_size: usize) -> Self {
        History {
            file_path: file_path.into(),
            commands: Vec::new(),
            max_size,
        }
    }

    /// Charge l'historique depuis un fichier
    pub fn load(&mut self) -> Result<()> {
        // Vérifier si le fichier existe
        if !self.file_path.exists() {
            return Ok(());
        }

        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);

        // Lire les entrées; une ligne non JSON est reprise telle quelle
        self.commands.clear();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str::<String>(&line).unwrap_or(line);
            self.commands.push(entry);
        }

        // Limiter la taille
        if self.commands.len() > self.max_size {
            self.commands.drain(..self.commands.len() - self.max_size);
        }

        Ok(())
    }

    /// Sauvegarde l'historique dans un fichier
    pub fn save(&self) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.file_path)?;

        for cmd in &self.commands {
            writeln!(file, "{}", serde_json::to_string(cmd)?)?;
        }

        Ok(())
    }

    /// Ajoute une requête à l'historique
    pub fn add(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }

        // Éviter les doublons consécutifs
        if self.commands.last().map(String::as_str) == Some(command) {
            return;
        }

        self.commands.push(command.to_string());

        if self.commands.len() > self.max_size {
            self.commands.remove(0);
        }
    }

    /// Récupère toutes les requêtes
    pub fn get_all(&self) -> &[String] {
        &self.commands
    }

    /// Recherche des requêtes correspondant à un motif
    pub fn search(&self, pattern: &str) -> Vec<String> {
        self.commands
            .iter()
            .filter(|cmd| cmd.contains(pattern))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_entries_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        let mut history = History::new(&path, 10);
        history.add("SigninLogs\n| count");
        history.add("SecurityEvent | take 5");
        history.save().unwrap();

        let mut reloaded = History::new(&path, 10);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_all(), &["SigninLogs\n| count", "SecurityEvent | take 5"]);
    }

    #[test]
    fn test_size_limit_and_duplicates() {
        let mut history = History::new("unused", 2);
        history.add("a");
        history.add("a");
        history.add("b");
        history.add("  ");
        history.add("c");

        assert_eq!(history.get_all(), &["b", "c"]);
        assert_eq!(history.search("c"), vec!["c"]);
    }

    #[test]
    fn test_plain_lines_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        std::fs::write(&path, "SigninLogs | count\n\n\"AzureActivity\"\n").unwrap();

        let mut history = History::new(&path, 10);
        history.load().unwrap();
        assert_eq!(history.get_all(), &["SigninLogs | count", "AzureActivity"]);
    }
}
