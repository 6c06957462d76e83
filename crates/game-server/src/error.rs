use chess_core::IllegalMove;

use crate::record::GameId;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game {0} not found")]
    NotFound(GameId),

    #[error("Pending match {0} not found")]
    MatchNotFound(u64),

    #[error("Game {0} already exists")]
    AlreadyExists(GameId),

    #[error("{0} is not a participant")]
    NotParticipant(String),

    #[error(transparent)]
    IllegalMove(#[from] IllegalMove),

    #[error("Game {0} is over")]
    GameOver(GameId),

    /// The live game exists but its record has not been registered yet, or
    /// was already taken out during archiving. Safe to retry.
    #[error("Game {0} is not ready")]
    NotReady(GameId),

    #[error("No draw offer from the opponent")]
    NoDrawOffer,

    #[error("No draw can be claimed")]
    DrawNotAvailable,

    #[error("Spectating is disabled for game {0}")]
    SpectateDisabled(GameId),

    #[error("Game {0} was aborted: {1}")]
    Corrupt(GameId, String),
}
