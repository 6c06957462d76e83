//! The process-scoped game service.
//!
//! `GameServer` owns the game registry (live tables), the session directory
//! (game records), the lobby and the private-chat index. It is constructed
//! once at startup and handed to whatever serves players; clones share state.
//!
//! Creation inserts the record before the live game, and archiving removes
//! the live game before the record, so a live game is never visible without
//! its record. Lookups still treat a missing record as `NotReady`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chess_core::{AppliedMove, Color, IllegalMove, Move, MoveRecord, Table, Termination};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::{self, ClockSignals};
use crate::config::ServerConfig;
use crate::error::GameError;
use crate::game::LiveGame;
use crate::guarded::Guarded;
use crate::private_chat::PrivateChatIndex;
use crate::record::{EndReason, GameId, GameRecord, GameSettings, GameStatus, MatchId, Outcome, Seek};
use crate::registry::Registry;

/// What a player sees after a move was accepted.
#[derive(Debug, Clone, Serialize)]
pub struct MoveReport {
    pub applied: AppliedMove,
    pub status: GameStatus,
}

#[derive(Clone)]
pub struct GameServer {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) config: ServerConfig,
    pub(crate) games: Registry<GameId, LiveGame>,
    pub(crate) sessions: Registry<GameId, Guarded<GameRecord>>,
    pub(crate) pending: Registry<MatchId, Seek>,
    pub(crate) chats: PrivateChatIndex,
    pub(crate) next_match: AtomicU64,
    pub(crate) next_game: AtomicU64,
    archive: Option<mpsc::UnboundedSender<GameRecord>>,
    shutdown: CancellationToken,
}

impl GameServer {
    pub fn new(config: ServerConfig) -> Self {
        Self::build(config, None)
    }

    /// Like [`GameServer::new`], also returning a stream of finished game
    /// records for persistence.
    pub fn with_archive(config: ServerConfig) -> (Self, mpsc::UnboundedReceiver<GameRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::build(config, Some(tx)), rx)
    }

    fn build(config: ServerConfig, archive: Option<mpsc::UnboundedSender<GameRecord>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                games: Registry::new(),
                sessions: Registry::new(),
                pending: Registry::new(),
                chats: PrivateChatIndex::new(),
                next_match: AtomicU64::new(1),
                next_game: AtomicU64::new(1),
                archive,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub(crate) fn allocate_game_id(&self) -> GameId {
        self.inner.next_game.fetch_add(1, Ordering::Relaxed)
    }

    /// Create the record, the live game with both players watching, the
    /// private-chat pairing and the clock task for `game_id`.
    pub async fn init_game(
        &self,
        game_id: GameId,
        white: &str,
        black: &str,
        settings: GameSettings,
    ) -> Result<(), GameError> {
        if self.inner.games.contains(&game_id).await {
            return Err(GameError::AlreadyExists(game_id));
        }
        let record = self
            .inner
            .sessions
            .insert(game_id, Guarded::new(GameRecord::new(game_id, white, black, &settings)))
            .await
            .map_err(|_| GameError::AlreadyExists(game_id))?;

        let table = Table::new().with_default_promotion(self.inner.config.default_promotion);
        let (signals, resets) = ClockSignals::new(self.inner.shutdown.child_token());
        let token = signals.token();
        if self
            .inner
            .games
            .insert(game_id, LiveGame::new(game_id, white, black, table, signals))
            .await
            .is_err()
        {
            self.inner.sessions.remove(&game_id).await;
            return Err(GameError::AlreadyExists(game_id));
        }

        if !self.inner.chats.pair(white, black).await {
            debug!(game_id, white, black, "players already paired elsewhere");
        }

        let server = self.clone();
        let tick = self.inner.config.clock_tick;
        tokio::spawn(async move {
            if let Some(flagged) = clock::countdown(record, resets, token, tick).await {
                if let Err(e) = server.flag_timeout(game_id, flagged).await {
                    debug!(game_id, error = %e, "timeout not applied");
                }
            }
        });

        info!(
            game_id,
            white,
            black,
            time_control = ?settings.time_control.kind,
            rated = settings.rated,
            "Game created"
        );
        Ok(())
    }

    /// Validate and apply `mv` for `player`.
    pub async fn submit_move(&self, game_id: GameId, player: &str, mv: Move) -> Result<MoveReport, GameError> {
        let game = self.live(game_id).await?;
        let color = game
            .color_of(player)
            .ok_or_else(|| GameError::NotParticipant(player.to_string()))?;
        let session = self
            .inner
            .sessions
            .get(&game_id)
            .await
            .ok_or(GameError::NotReady(game_id))?;

        let _turn = game.sequencer.lock().await;

        if let Some(flagged) = session.write(|record| record.charge_clock(Instant::now())).await {
            info!(game_id, player = game.player(flagged), "Out of time");
            self.finish(&game, Outcome::win(flagged.opposite(), EndReason::Timeout)).await;
            return Err(GameError::GameOver(game_id));
        }

        let (applied, invariants) = match game
            .table
            .write(|table| {
                let applied = table.propose_move_as(color, mv)?;
                Ok::<_, IllegalMove>((applied, table.verify_invariants()))
            })
            .await
        {
            Ok(result) => result,
            Err(IllegalMove::GameOver) => return Err(GameError::GameOver(game_id)),
            Err(e) => {
                debug!(game_id, player, mv = %mv, reason = ?e, "Move rejected");
                return Err(e.into());
            }
        };

        let mut status = GameStatus::to_move(color.opposite());
        session
            .write(|record| {
                record.moves.push(MoveRecord::from(&applied));
                record.status = status;
                record.credit(color);
                // Moving answers an open offer from the opponent.
                if record.pending_draw == Some(color.opposite()) {
                    record.pending_draw = None;
                }
            })
            .await;
        game.signals.reset(color);

        if let Err(violation) = invariants {
            error!(game_id, %violation, "Board state corrupted, aborting game");
            self.finish(&game, Outcome::aborted()).await;
            return Err(GameError::Corrupt(game_id, violation.to_string()));
        }

        let outcome = match applied.termination {
            Some(Termination::Checkmate { winner }) => Some(Outcome::win(winner, EndReason::Checkmate)),
            Some(Termination::Stalemate) => Some(Outcome::draw(EndReason::Stalemate)),
            None if self.inner.config.auto_fifty_move_draw && applied.draw.fifty_move => {
                Some(Outcome::draw(EndReason::FiftyMoveRule))
            }
            None => None,
        };
        if let Some(outcome) = outcome {
            self.finish(&game, outcome).await;
            status = outcome.status;
        }

        debug!(game_id, player, mv = %applied.mv, fen = %applied.fen, "Move applied");
        Ok(MoveReport { applied, status })
    }

    /// FEN of the current position.
    pub async fn position(&self, game_id: GameId) -> Result<String, GameError> {
        let game = self.live(game_id).await?;
        Ok(game.table.read(Table::to_fen).await)
    }

    pub async fn legal_moves(&self, game_id: GameId) -> Result<Vec<Move>, GameError> {
        let game = self.live(game_id).await?;
        Ok(game.table.read(Table::legal_moves).await)
    }

    /// Snapshot of the game's record.
    pub async fn record(&self, game_id: GameId) -> Result<GameRecord, GameError> {
        match self.inner.sessions.get(&game_id).await {
            Some(session) => Ok(session.read(GameRecord::clone).await),
            None if self.inner.games.contains(&game_id).await => Err(GameError::NotReady(game_id)),
            None => Err(GameError::NotFound(game_id)),
        }
    }

    pub async fn live_games(&self) -> Vec<GameId> {
        let mut ids = self.inner.games.keys().await;
        ids.sort_unstable();
        ids
    }

    /// Join the game's observers. Returns false if already watching.
    pub async fn spectate(&self, game_id: GameId, name: &str) -> Result<bool, GameError> {
        let game = self.live(game_id).await?;
        let allowed = match self.inner.sessions.get(&game_id).await {
            Some(session) => session.read(|r| r.spectate).await,
            None => return Err(GameError::NotReady(game_id)),
        };
        if !allowed && game.color_of(name).is_none() {
            return Err(GameError::SpectateDisabled(game_id));
        }
        Ok(game.observers.join(name).await)
    }

    pub async fn leave(&self, game_id: GameId, name: &str) -> Result<bool, GameError> {
        let game = self.live(game_id).await?;
        Ok(game.observers.leave(name).await)
    }

    pub async fn spectators(&self, game_id: GameId) -> Result<Vec<String>, GameError> {
        let game = self.live(game_id).await?;
        Ok(game.observers.list().await)
    }

    pub async fn resign(&self, game_id: GameId, player: &str) -> Result<GameRecord, GameError> {
        let game = self.live(game_id).await?;
        let color = self.participant(&game, player)?;
        self.end(&game, Outcome::win(color.opposite(), EndReason::Resignation))
            .await
    }

    pub async fn offer_draw(&self, game_id: GameId, player: &str) -> Result<(), GameError> {
        let game = self.live(game_id).await?;
        let color = self.participant(&game, player)?;
        if game.signals.is_game_over() {
            return Err(GameError::GameOver(game_id));
        }
        let session = self.session(game_id).await?;
        session.write(|r| r.pending_draw = Some(color)).await;
        info!(game_id, player, "Draw offered");
        Ok(())
    }

    pub async fn accept_draw(&self, game_id: GameId, player: &str) -> Result<GameRecord, GameError> {
        let game = self.live(game_id).await?;
        let color = self.participant(&game, player)?;
        if !self.take_draw_offer(game_id, color).await? {
            return Err(GameError::NoDrawOffer);
        }
        self.end(&game, Outcome::draw(EndReason::Agreement)).await
    }

    pub async fn decline_draw(&self, game_id: GameId, player: &str) -> Result<(), GameError> {
        let game = self.live(game_id).await?;
        let color = self.participant(&game, player)?;
        if !self.take_draw_offer(game_id, color).await? {
            return Err(GameError::NoDrawOffer);
        }
        info!(game_id, player, "Draw declined");
        Ok(())
    }

    /// Clear an offer made by the opponent of `color`, reporting whether one existed.
    async fn take_draw_offer(&self, game_id: GameId, color: Color) -> Result<bool, GameError> {
        let session = self.session(game_id).await?;
        Ok(session
            .write(|r| {
                if r.pending_draw == Some(color.opposite()) {
                    r.pending_draw = None;
                    true
                } else {
                    false
                }
            })
            .await)
    }

    pub async fn claim_fifty_move_draw(&self, game_id: GameId, player: &str) -> Result<GameRecord, GameError> {
        let game = self.live(game_id).await?;
        self.participant(&game, player)?;
        let _turn = game.sequencer.lock().await;
        if !game.table.read(Table::fifty_move_draw_available).await {
            return Err(GameError::DrawNotAvailable);
        }
        self.finish(&game, Outcome::draw(EndReason::FiftyMoveRule))
            .await
            .ok_or(GameError::GameOver(game_id))
    }

    pub(crate) async fn flag_timeout(&self, game_id: GameId, flagged: Color) -> Result<GameRecord, GameError> {
        let game = self.live(game_id).await?;
        info!(game_id, player = game.player(flagged), "Out of time");
        self.end(&game, Outcome::win(flagged.opposite(), EndReason::Timeout)).await
    }

    /// End a game from outside the move path. Only the first ending of a
    /// game takes effect; later ones return `None`.
    pub async fn conclude(&self, game_id: GameId, outcome: Outcome) -> Result<Option<GameRecord>, GameError> {
        let game = self.live(game_id).await?;
        let _turn = game.sequencer.lock().await;
        Ok(self.finish(&game, outcome).await)
    }

    async fn end(&self, game: &LiveGame, outcome: Outcome) -> Result<GameRecord, GameError> {
        let _turn = game.sequencer.lock().await;
        self.finish(game, outcome)
            .await
            .ok_or(GameError::GameOver(game.id))
    }

    /// Record the outcome and archive the game. Callers hold the sequencer.
    async fn finish(&self, game: &LiveGame, outcome: Outcome) -> Option<GameRecord> {
        if !game.signals.fire_game_over() {
            return None;
        }
        game.table.write(Table::conclude).await;

        let record = match self.inner.sessions.get(&game.id).await {
            Some(session) => Some(
                session
                    .write(|r| {
                        r.finish(outcome);
                        r.clone()
                    })
                    .await,
            ),
            None => {
                warn!(game_id = game.id, "Game record missing at conclusion");
                None
            }
        };

        self.inner.games.remove(&game.id).await;
        self.inner.sessions.remove(&game.id).await;
        self.inner.chats.unpair(&game.white, &game.black).await;

        info!(
            game_id = game.id,
            status = ?outcome.status,
            reason = ?outcome.reason,
            "Game over"
        );

        if let (Some(record), Some(archive)) = (&record, &self.inner.archive) {
            if archive.send(record.clone()).is_err() {
                debug!(game_id = game.id, "Archive receiver dropped");
            }
        }
        record
    }

    /// Stop every clock. Games stay registered.
    pub async fn shutdown(&self) {
        let live = self.inner.games.len().await;
        self.inner.shutdown.cancel();
        info!(live, "Clocks stopped");
    }

    async fn live(&self, game_id: GameId) -> Result<Arc<LiveGame>, GameError> {
        self.inner
            .games
            .get(&game_id)
            .await
            .ok_or(GameError::NotFound(game_id))
    }

    async fn session(&self, game_id: GameId) -> Result<Arc<Guarded<GameRecord>>, GameError> {
        self.inner
            .sessions
            .get(&game_id)
            .await
            .ok_or(GameError::NotReady(game_id))
    }

    fn participant(&self, game: &LiveGame, player: &str) -> Result<Color, GameError> {
        game.color_of(player)
            .ok_or_else(|| GameError::NotParticipant(player.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chess_core::{PieceKind, Square};

    use crate::clock::TimeControlKind;

    fn settings(server: &GameServer) -> GameSettings {
        GameSettings {
            time_control: server.config().time_control(TimeControlKind::Standard),
            white_rating: 1500,
            black_rating: 1500,
            rated: true,
            spectate: true,
        }
    }

    fn mv(text: &str) -> Move {
        Move::from_uci(text).unwrap()
    }

    async fn started() -> (GameServer, mpsc::UnboundedReceiver<GameRecord>) {
        let (server, archive) = GameServer::with_archive(ServerConfig::default());
        server.init_game(1, "alice", "bob", settings(&server)).await.unwrap();
        (server, archive)
    }

    #[tokio::test]
    async fn test_init_game_registers_everything() {
        let (server, _archive) = started().await;
        assert_eq!(server.live_games().await, vec![1]);
        assert_eq!(server.spectators(1).await.unwrap(), vec!["alice", "bob"]);
        assert_eq!(
            server.position(1).await.unwrap(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(server.record(1).await.unwrap().status, GameStatus::WhiteToMove);
        assert_eq!(server.inner.chats.partner("alice").await.as_deref(), Some("bob"));
        assert_eq!(server.legal_moves(1).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_duplicate_game_id_rejected() {
        let (server, _archive) = started().await;
        let err = server.init_game(1, "carol", "dave", settings(&server)).await.unwrap_err();
        assert!(matches!(err, GameError::AlreadyExists(1)));
        assert_eq!(server.record(1).await.unwrap().white, "alice");
    }

    #[tokio::test]
    async fn test_moves_update_record() {
        let (server, _archive) = started().await;
        server.submit_move(1, "alice", mv("e2e4")).await.unwrap();
        let report = server.submit_move(1, "bob", mv("e7e5")).await.unwrap();
        assert_eq!(report.status, GameStatus::WhiteToMove);

        let record = server.record(1).await.unwrap();
        assert_eq!(record.moves.len(), 2);
        assert_eq!(record.moves[1].resulting_fen, report.applied.fen);
        assert_eq!(record.moves[0].source, "e2".parse::<Square>().unwrap());
    }

    #[tokio::test]
    async fn test_wrong_player_and_turn() {
        let (server, _archive) = started().await;
        assert!(matches!(
            server.submit_move(1, "mallory", mv("e2e4")).await,
            Err(GameError::NotParticipant(_))
        ));
        assert!(matches!(
            server.submit_move(1, "bob", mv("e7e5")).await,
            Err(GameError::IllegalMove(IllegalMove::NotYourTurn))
        ));
        assert!(matches!(
            server.submit_move(2, "alice", mv("e2e4")).await,
            Err(GameError::NotFound(2))
        ));
        assert!(server.record(1).await.unwrap().moves.is_empty());
    }

    #[tokio::test]
    async fn test_checkmate_archives_game() {
        let (server, mut archive) = started().await;
        for (player, m) in [("alice", "f2f3"), ("bob", "e7e5"), ("alice", "g2g4")] {
            server.submit_move(1, player, mv(m)).await.unwrap();
        }
        let report = server.submit_move(1, "bob", mv("d8h4")).await.unwrap();
        assert_eq!(report.status, GameStatus::BlackWon);

        let record = archive.recv().await.unwrap();
        assert_eq!(record.result, Some(0));
        assert_eq!(record.reason, Some(EndReason::Checkmate));
        assert_eq!(record.moves.len(), 4);

        assert!(matches!(
            server.submit_move(1, "alice", mv("a2a3")).await,
            Err(GameError::NotFound(1))
        ));
        assert!(matches!(server.record(1).await, Err(GameError::NotFound(1))));
        assert_eq!(server.inner.chats.partner("alice").await, None);
    }

    #[tokio::test]
    async fn test_resign_once() {
        let (server, mut archive) = started().await;
        let record = server.resign(1, "alice").await.unwrap();
        assert_eq!(record.status, GameStatus::BlackWon);
        assert_eq!(archive.recv().await.unwrap().reason, Some(EndReason::Resignation));
        assert!(matches!(server.resign(1, "bob").await, Err(GameError::NotFound(1))));
        assert!(archive.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_draw_offer_flow() {
        let (server, mut archive) = started().await;
        assert!(matches!(server.accept_draw(1, "bob").await, Err(GameError::NoDrawOffer)));

        server.offer_draw(1, "alice").await.unwrap();
        assert_eq!(server.record(1).await.unwrap().pending_draw, Some(Color::White));
        // The offerer cannot accept their own offer.
        assert!(matches!(server.accept_draw(1, "alice").await, Err(GameError::NoDrawOffer)));

        server.decline_draw(1, "bob").await.unwrap();
        assert_eq!(server.record(1).await.unwrap().pending_draw, None);

        server.offer_draw(1, "bob").await.unwrap();
        let record = server.accept_draw(1, "alice").await.unwrap();
        assert_eq!(record.status, GameStatus::Draw);
        assert_eq!(record.result, Some(2));
        assert_eq!(archive.recv().await.unwrap().reason, Some(EndReason::Agreement));
    }

    #[tokio::test]
    async fn test_move_clears_opponent_offer() {
        let (server, _archive) = started().await;
        server.offer_draw(1, "bob").await.unwrap();
        server.submit_move(1, "alice", mv("d2d4")).await.unwrap();
        assert_eq!(server.record(1).await.unwrap().pending_draw, None);
    }

    #[tokio::test]
    async fn test_fifty_move_claim_requires_threshold() {
        let (server, _archive) = started().await;
        assert!(matches!(
            server.claim_fifty_move_draw(1, "alice").await,
            Err(GameError::DrawNotAvailable)
        ));
    }

    #[tokio::test]
    async fn test_spectators_join_and_leave() {
        let (server, _archive) = started().await;
        assert!(server.spectate(1, "carol").await.unwrap());
        assert!(!server.spectate(1, "carol").await.unwrap());
        assert!(!server.leave(1, "alice").await.unwrap());
        assert!(server.leave(1, "carol").await.unwrap());
        assert_eq!(server.spectators(1).await.unwrap(), vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_spectating_disabled() {
        let server = GameServer::new(ServerConfig::default());
        let mut private = settings(&server);
        private.spectate = false;
        server.init_game(5, "alice", "bob", private).await.unwrap();
        assert!(matches!(
            server.spectate(5, "carol").await,
            Err(GameError::SpectateDisabled(5))
        ));
    }

    #[tokio::test]
    async fn test_configured_promotion_default() {
        let config = ServerConfig {
            default_promotion: PieceKind::Rook,
            ..ServerConfig::default()
        };
        let server = GameServer::new(config);
        server.init_game(3, "alice", "bob", settings(&server)).await.unwrap();
        let game = server.live(3).await.unwrap();
        game.table
            .write(|t| *t = Table::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap().with_default_promotion(PieceKind::Rook))
            .await;
        let report = server.submit_move(3, "alice", mv("a7a8")).await.unwrap();
        assert_eq!(report.applied.mv.promotion, Some(PieceKind::Rook));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_gives_opponent_the_win() {
        let config = ServerConfig {
            bullet: Duration::from_secs(5),
            ..ServerConfig::default()
        };
        let (server, mut archive) = GameServer::with_archive(config);
        let bullet = GameSettings {
            time_control: server.config().time_control(TimeControlKind::Bullet),
            white_rating: 1500,
            black_rating: 1500,
            rated: false,
            spectate: true,
        };
        server.init_game(9, "alice", "bob", bullet).await.unwrap();
        server.submit_move(9, "alice", mv("e2e4")).await.unwrap();

        let record = archive.recv().await.unwrap();
        assert_eq!(record.status, GameStatus::WhiteWon);
        assert_eq!(record.reason, Some(EndReason::Timeout));
        assert_eq!(record.result, Some(1));
        assert_eq!(record.black_remaining, Duration::ZERO);
        assert!(server.live_games().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_moves_are_charged() {
        let (server, _archive) = GameServer::with_archive(ServerConfig::default());
        let bullet = GameSettings {
            time_control: server.config().time_control(TimeControlKind::Bullet),
            white_rating: 1500,
            black_rating: 1500,
            rated: false,
            spectate: true,
        };
        server.init_game(5, "alice", "bob", bullet).await.unwrap();

        let shuffle = [("alice", "g1f3"), ("bob", "g8f6"), ("alice", "f3g1"), ("bob", "f6g8")];
        for (player, text) in shuffle.iter().cycle().take(40) {
            tokio::time::sleep(Duration::from_millis(900)).await;
            server.submit_move(5, player, mv(text)).await.unwrap();
        }

        let record = server.record(5).await.unwrap();
        assert_eq!(record.moves.len(), 40);
        assert_eq!(record.white_remaining, Duration::from_secs(42));
        assert_eq!(record.black_remaining, Duration::from_secs(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_after_flag_rejected() {
        let (server, mut archive) = started().await;
        let session = server.inner.sessions.get(&1).await.unwrap();
        session.write(|r| r.white_remaining = Duration::ZERO).await;

        assert!(matches!(
            server.submit_move(1, "alice", mv("e2e4")).await,
            Err(GameError::GameOver(1))
        ));
        let record = archive.recv().await.unwrap();
        assert_eq!(record.status, GameStatus::BlackWon);
        assert_eq!(record.reason, Some(EndReason::Timeout));
        assert!(record.moves.is_empty());
        assert!(server.live_games().await.is_empty());
    }

    #[tokio::test]
    async fn test_archive_drains_after_shutdown() {
        let (server, mut archive) = started().await;
        server.init_game(2, "carol", "dave", settings(&server)).await.unwrap();
        server.resign(1, "bob").await.unwrap();

        server.shutdown().await;
        drop(server);

        assert_eq!(archive.recv().await.unwrap().status, GameStatus::WhiteWon);
        assert!(archive.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_clocks() {
        let config = ServerConfig {
            bullet: Duration::from_secs(5),
            ..ServerConfig::default()
        };
        let server = GameServer::new(config);
        let bullet = GameSettings {
            time_control: server.config().time_control(TimeControlKind::Bullet),
            white_rating: 1500,
            black_rating: 1500,
            rated: false,
            spectate: true,
        };
        server.init_game(4, "alice", "bob", bullet).await.unwrap();
        server.shutdown().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(server.live_games().await, vec![4]);
        assert_eq!(server.record(4).await.unwrap().status, GameStatus::WhiteToMove);
    }
}
