use std::env;
use std::time::Duration;

use chess_core::PieceKind;

use crate::clock::{TimeControl, TimeControlKind};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Piece a pawn becomes when a move names no valid promotion.
    pub default_promotion: PieceKind,
    pub bullet: Duration,
    pub blitz: Duration,
    pub standard: Duration,
    /// Budget per move for correspondence games.
    pub correspondence: Duration,
    pub increment: Duration,
    pub clock_tick: Duration,
    /// End the game as a draw as soon as the fifty-move threshold is hit
    /// instead of waiting for a claim.
    pub auto_fifty_move_draw: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_promotion: PieceKind::Queen,
            bullet: Duration::from_secs(60),
            blitz: Duration::from_secs(5 * 60),
            standard: Duration::from_secs(15 * 60),
            correspondence: Duration::from_secs(3 * 24 * 60 * 60),
            increment: Duration::ZERO,
            clock_tick: Duration::from_secs(1),
            auto_fifty_move_draw: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let minutes = |key: &str, default: Duration| {
            env::var(key)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|m| Duration::from_secs(m * 60))
                .unwrap_or(default)
        };

        Self {
            default_promotion: env::var("DEFAULT_PROMOTION")
                .ok()
                .and_then(|v| v.trim().chars().next())
                .and_then(PieceKind::from_letter)
                .filter(|kind| kind.is_promotion_target())
                .unwrap_or(defaults.default_promotion),
            bullet: minutes("BULLET_MINUTES", defaults.bullet),
            blitz: minutes("BLITZ_MINUTES", defaults.blitz),
            standard: minutes("STANDARD_MINUTES", defaults.standard),
            correspondence: env::var("CORRESPONDENCE_DAYS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|d| Duration::from_secs(d * 24 * 60 * 60))
                .unwrap_or(defaults.correspondence),
            increment: env::var("INCREMENT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.increment),
            clock_tick: env::var("CLOCK_TICK_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&ms: &u64| ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.clock_tick),
            auto_fifty_move_draw: env::var("AUTO_FIFTY_MOVE_DRAW")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.auto_fifty_move_draw),
        }
    }

    /// Time control for `kind` using the configured budgets.
    pub fn time_control(&self, kind: TimeControlKind) -> TimeControl {
        let (initial, increment) = match kind {
            TimeControlKind::Bullet => (self.bullet, self.increment),
            TimeControlKind::Blitz => (self.blitz, self.increment),
            TimeControlKind::Standard => (self.standard, self.increment),
            TimeControlKind::Correspondence => (self.correspondence, Duration::ZERO),
        };
        TimeControl {
            kind,
            initial,
            increment,
        }
    }
}
