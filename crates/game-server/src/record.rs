//! Game metadata kept in the session directory, plus lobby seeks.

use std::time::Duration;

use chess_core::{Color, MoveRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::clock::TimeControl;

pub type GameId = u64;
pub type MatchId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    WhiteToMove,
    BlackToMove,
    WhiteWon,
    BlackWon,
    Draw,
    Aborted,
}

impl GameStatus {
    pub fn to_move(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteToMove,
            Color::Black => Self::BlackToMove,
        }
    }

    pub fn won_by(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteWon,
            Color::Black => Self::BlackWon,
        }
    }

    /// Side to move while the game is running.
    pub fn side_to_move(self) -> Option<Color> {
        match self {
            Self::WhiteToMove => Some(Color::White),
            Self::BlackToMove => Some(Color::Black),
            _ => None,
        }
    }

    pub fn is_over(self) -> bool {
        self.side_to_move().is_none()
    }

    /// Stored result: 0 black won, 1 white won, 2 draw.
    pub fn result_code(self) -> Option<u8> {
        match self {
            Self::BlackWon => Some(0),
            Self::WhiteWon => Some(1),
            Self::Draw => Some(2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Checkmate,
    Stalemate,
    Resignation,
    Timeout,
    Agreement,
    FiftyMoveRule,
    Aborted,
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: GameStatus,
    pub reason: EndReason,
}

impl Outcome {
    pub fn win(winner: Color, reason: EndReason) -> Self {
        Self {
            status: GameStatus::won_by(winner),
            reason,
        }
    }

    pub fn draw(reason: EndReason) -> Self {
        Self {
            status: GameStatus::Draw,
            reason,
        }
    }

    pub fn aborted() -> Self {
        Self {
            status: GameStatus::Aborted,
            reason: EndReason::Aborted,
        }
    }
}

/// Options fixed when a game is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub time_control: TimeControl,
    pub white_rating: u16,
    pub black_rating: u16,
    pub rated: bool,
    pub spectate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub white: String,
    pub black: String,
    pub white_rating: u16,
    pub black_rating: u16,
    pub moves: Vec<MoveRecord>,
    pub status: GameStatus,
    pub result: Option<u8>,
    pub reason: Option<EndReason>,
    pub time_control: TimeControl,
    pub white_remaining: Duration,
    pub black_remaining: Duration,
    /// When the running clock was last charged.
    #[serde(skip, default = "Instant::now")]
    pub clock_mark: Instant,
    /// Side that offered a draw the opponent has not answered yet.
    pub pending_draw: Option<Color>,
    pub rated: bool,
    pub spectate: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl GameRecord {
    pub fn new(id: GameId, white: &str, black: &str, settings: &GameSettings) -> Self {
        Self {
            id,
            white: white.to_string(),
            black: black.to_string(),
            white_rating: settings.white_rating,
            black_rating: settings.black_rating,
            moves: Vec::new(),
            status: GameStatus::WhiteToMove,
            result: None,
            reason: None,
            time_control: settings.time_control,
            white_remaining: settings.time_control.initial,
            black_remaining: settings.time_control.initial,
            clock_mark: Instant::now(),
            pending_draw: None,
            rated: settings.rated,
            spectate: settings.spectate,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn remaining(&self, color: Color) -> Duration {
        match color {
            Color::White => self.white_remaining,
            Color::Black => self.black_remaining,
        }
    }

    pub fn remaining_mut(&mut self, color: Color) -> &mut Duration {
        match color {
            Color::White => &mut self.white_remaining,
            Color::Black => &mut self.black_remaining,
        }
    }

    /// Charge the side to move for the time since the last charge. Returns
    /// that side if its clock has run out.
    pub fn charge_clock(&mut self, now: Instant) -> Option<Color> {
        let elapsed = now.saturating_duration_since(self.clock_mark);
        self.clock_mark = now;
        let side = self.status.side_to_move()?;
        let clock = self.remaining_mut(side);
        *clock = clock.saturating_sub(elapsed);
        clock.is_zero().then_some(side)
    }

    /// Credit the clock of the side that just moved.
    pub fn credit(&mut self, mover: Color) {
        let control = self.time_control;
        let clock = self.remaining_mut(mover);
        *clock = control.after_move(*clock);
    }

    pub fn finish(&mut self, outcome: Outcome) {
        self.status = outcome.status;
        self.result = outcome.status.result_code();
        self.reason = Some(outcome.reason);
        self.pending_draw = None;
        self.ended_at = Some(Utc::now());
    }
}

/// A proposed match waiting in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seek {
    pub player: String,
    pub rating: u16,
    pub time_control: TimeControl,
    pub rated: bool,
    /// Color the proposer wants; `None` lets the proposer take white.
    pub color: Option<Color>,
    pub created_at: DateTime<Utc>,
}

impl Seek {
    pub fn new(player: &str, rating: u16, time_control: TimeControl) -> Self {
        Self {
            player: player.to_string(),
            rating,
            time_control,
            rated: true,
            color: None,
            created_at: Utc::now(),
        }
    }
}
