//! Multiplayer game service: live game registry, session directory, lobby,
//! spectators and clocks around the `chess_core` rules engine.

pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod guarded;
pub mod lobby;
pub mod observers;
pub mod private_chat;
pub mod record;
pub mod registry;
pub mod service;

pub use clock::{TimeControl, TimeControlKind};
pub use config::ServerConfig;
pub use error::GameError;
pub use record::{EndReason, GameId, GameRecord, GameSettings, GameStatus, MatchId, Outcome, Seek};
pub use service::{GameServer, MoveReport};
