/// Accumule les lignes saisies jusqu'à former une requête complète.
///
/// Une ligne vide ou un `;` final soumet la requête en cours.
#[derive(Default)]
pub struct QueryBuffer {
    lines: Vec<String>,
}

impl QueryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vrai tant qu'aucune ligne n'est en attente
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Ajoute une ligne; renvoie la requête complète si elle est soumise
    pub fn push(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end();

        if line.trim().is_empty() {
            return self.take();
        }

        match line.strip_suffix(';') {
            Some(head) => {
                if !head.trim().is_empty() {
                    self.lines.push(head.to_string());
                }
                self.take()
            }
            None => {
                self.lines.push(line.to_string());
                None
            }
        }
    }

    /// Abandonne la requête en cours
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn take(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.lines).join("\n"))
        }
    }
}
