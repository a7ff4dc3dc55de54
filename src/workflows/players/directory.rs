use std::sync::{Arc, Mutex};

use super::domain::{Player, PlayerId};

/// Roster abstraction so the bid workflow can be exercised in isolation.
pub trait PlayerDirectory: Send + Sync {
    fn all_players(&self) -> Result<Vec<Player>, DirectoryError>;
    fn find(&self, id: &PlayerId) -> Result<Option<Player>, DirectoryError>;
    /// Registers a player; an e-mail address may only be registered once.
    fn create_player(&self, player: Player) -> Result<Player, DirectoryError>;
    fn update_player(&self, player: Player) -> Result<(), DirectoryError>;
    /// Removes a player. The id must resolve to exactly one stored record;
    /// anything else signals a consistency violation upstream.
    fn delete_player(&self, id: &PlayerId) -> Result<(), DirectoryError>;
}

/// Error enumeration for directory failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("a player with e-mail {0} is already registered")]
    DuplicatePlayer(String),
    #[error("delete target did not resolve to exactly one player: {0:?}")]
    InvalidDeleteTarget(PlayerId),
    #[error("player not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// In-memory roster used by the binary wiring and the test suite.
#[derive(Default, Clone)]
pub struct MemoryPlayerDirectory {
    players: Arc<Mutex<Vec<Player>>>,
}

impl PlayerDirectory for MemoryPlayerDirectory {
    fn all_players(&self) -> Result<Vec<Player>, DirectoryError> {
        let guard = self.players.lock().expect("directory mutex poisoned");
        Ok(guard.clone())
    }

    fn find(&self, id: &PlayerId) -> Result<Option<Player>, DirectoryError> {
        let guard = self.players.lock().expect("directory mutex poisoned");
        Ok(guard.iter().find(|player| &player.id == id).cloned())
    }

    fn create_player(&self, player: Player) -> Result<Player, DirectoryError> {
        let mut guard = self.players.lock().expect("directory mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&player.email))
        {
            return Err(DirectoryError::DuplicatePlayer(player.email));
        }
        guard.push(player.clone());
        Ok(player)
    }

    fn update_player(&self, player: Player) -> Result<(), DirectoryError> {
        let mut guard = self.players.lock().expect("directory mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == player.id) {
            Some(existing) => {
                *existing = player;
                Ok(())
            }
            None => Err(DirectoryError::NotFound),
        }
    }

    fn delete_player(&self, id: &PlayerId) -> Result<(), DirectoryError> {
        let mut guard = self.players.lock().expect("directory mutex poisoned");
        let matches: Vec<usize> = guard
            .iter()
            .enumerate()
            .filter(|(_, player)| &player.id == id)
            .map(|(index, _)| index)
            .collect();
        match matches.as_slice() {
            [index] => {
                guard.remove(*index);
                Ok(())
            }
            _ => Err(DirectoryError::InvalidDeleteTarget(id.clone())),
        }
    }
}
