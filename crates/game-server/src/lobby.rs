//! Pending matches: seeks wait here until someone accepts them.

use std::sync::atomic::Ordering;

use chess_core::Color;
use tracing::info;

use crate::error::GameError;
use crate::record::{GameId, GameSettings, MatchId, Seek};
use crate::service::GameServer;

impl GameServer {
    /// Put a seek in the lobby.
    pub async fn propose_match(&self, seek: Seek) -> MatchId {
        let mut seek = seek;
        loop {
            let id = self.inner.next_match.fetch_add(1, Ordering::Relaxed);
            match self.inner.pending.insert(id, seek).await {
                Ok(entry) => {
                    info!(match_id = id, player = %entry.player, "Match proposed");
                    return id;
                }
                Err(back) => seek = back,
            }
        }
    }

    /// Withdraw a seek. Only its proposer may do so.
    pub async fn cancel_match(&self, match_id: MatchId, player: &str) -> Result<(), GameError> {
        if self
            .inner
            .pending
            .remove_if(&match_id, |seek| seek.player == player)
            .await
            .is_some()
        {
            info!(match_id, player, "Match cancelled");
            return Ok(());
        }
        if self.inner.pending.contains(&match_id).await {
            Err(GameError::NotParticipant(player.to_string()))
        } else {
            Err(GameError::MatchNotFound(match_id))
        }
    }

    /// Open seeks, oldest first.
    pub async fn pending_matches(&self) -> Vec<(MatchId, Seek)> {
        let mut seeks: Vec<(MatchId, Seek)> = self
            .inner
            .pending
            .snapshot()
            .await
            .into_iter()
            .map(|(id, seek)| (id, seek.as_ref().clone()))
            .collect();
        seeks.sort_by_key(|(id, _)| *id);
        seeks
    }

    /// Take the seek out of the lobby and start its game. A seek can be
    /// accepted once; later attempts fail with `MatchNotFound`.
    pub async fn accept_match(&self, match_id: MatchId, acceptor: &str, rating: u16) -> Result<GameId, GameError> {
        let Some(seek) = self
            .inner
            .pending
            .remove_if(&match_id, |seek| seek.player != acceptor)
            .await
        else {
            return if self.inner.pending.contains(&match_id).await {
                Err(GameError::NotParticipant(acceptor.to_string()))
            } else {
                Err(GameError::MatchNotFound(match_id))
            };
        };

        let (white, black, white_rating, black_rating) = match seek.color {
            Some(Color::Black) => (acceptor, seek.player.as_str(), rating, seek.rating),
            _ => (seek.player.as_str(), acceptor, seek.rating, rating),
        };
        let settings = GameSettings {
            time_control: seek.time_control,
            white_rating,
            black_rating,
            rated: seek.rated,
            spectate: true,
        };

        loop {
            let game_id = self.allocate_game_id();
            match self.init_game(game_id, white, black, settings.clone()).await {
                Ok(()) => {
                    info!(match_id, game_id, white, black, "Match accepted");
                    return Ok(game_id);
                }
                // Id taken by a game created directly through `init_game`.
                Err(GameError::AlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
