use crate::guarded::Guarded;

/// Names watching one game, in join order. The two players are members from
/// the start and `leave` never removes them.
#[derive(Debug)]
pub struct ObserverSet {
    players: [String; 2],
    names: Guarded<Vec<String>>,
}

impl ObserverSet {
    pub fn with_players(white: &str, black: &str) -> Self {
        Self {
            players: [white.to_string(), black.to_string()],
            names: Guarded::new(vec![white.to_string(), black.to_string()]),
        }
    }

    /// Add `name`. Returns false if already present.
    pub async fn join(&self, name: &str) -> bool {
        self.names
            .write(|names| {
                if names.iter().any(|n| n == name) {
                    false
                } else {
                    names.push(name.to_string());
                    true
                }
            })
            .await
    }

    /// Remove a spectator. Returns false for players and unknown names.
    pub async fn leave(&self, name: &str) -> bool {
        if self.players.iter().any(|p| p == name) {
            return false;
        }
        self.names
            .write(|names| {
                let before = names.len();
                names.retain(|n| n != name);
                names.len() != before
            })
            .await
    }

    pub async fn list(&self) -> Vec<String> {
        self.names.read(Vec::clone).await
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.names.read(|names| names.iter().any(|n| n == name)).await
    }
}
