//! Time controls, per-game clock signals and the countdown task.
//!
//! The move path never waits on the clock: every move charges the mover the
//! time since the last charge, credits them in the game record and drops a
//! reset signal into a capacity-1 channel. The countdown task charges
//! whichever side the record says is to move on each tick, so partial ticks
//! are never lost, and stops when the game-over token is cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chess_core::Color;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::guarded::Guarded;
use crate::record::GameRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeControlKind {
    Bullet,
    Blitz,
    Standard,
    Correspondence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    pub kind: TimeControlKind,
    /// Starting budget; for correspondence, the budget per move.
    pub initial: Duration,
    pub increment: Duration,
}

impl TimeControl {
    /// Clock value of the mover once their move is accepted.
    pub fn after_move(&self, remaining: Duration) -> Duration {
        match self.kind {
            TimeControlKind::Correspondence => self.initial,
            _ => remaining + self.increment,
        }
    }
}

/// Signals a live game exposes to its countdown task.
#[derive(Debug)]
pub struct ClockSignals {
    white_reset: mpsc::Sender<()>,
    black_reset: mpsc::Sender<()>,
    game_over: CancellationToken,
    fired: AtomicBool,
}

/// Consumer half of the reset channels.
#[derive(Debug)]
pub struct ResetReceivers {
    pub white: mpsc::Receiver<()>,
    pub black: mpsc::Receiver<()>,
}

impl ClockSignals {
    pub fn new(game_over: CancellationToken) -> (Self, ResetReceivers) {
        let (white_reset, white) = mpsc::channel(1);
        let (black_reset, black) = mpsc::channel(1);
        let signals = Self {
            white_reset,
            black_reset,
            game_over,
            fired: AtomicBool::new(false),
        };
        (signals, ResetReceivers { white, black })
    }

    /// Note that `mover` just moved. Never blocks: if a reset for that color
    /// is still unconsumed, or nobody listens any more, the signal is dropped.
    pub fn reset(&self, mover: Color) -> bool {
        let sender = match mover {
            Color::White => &self.white_reset,
            Color::Black => &self.black_reset,
        };
        match sender.try_send(()) {
            Ok(()) => true,
            Err(e) => {
                debug!(color = %mover, error = %e, "clock reset not queued");
                false
            }
        }
    }

    /// Emit game over. Only the first call returns true.
    pub fn fire_game_over(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.game_over.cancel();
        true
    }

    pub fn is_game_over(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Cancelled on game over and on server shutdown.
    pub fn token(&self) -> CancellationToken {
        self.game_over.clone()
    }
}

enum Tick {
    Running,
    Flagged(Color),
    Finished,
}

/// Run one game's clock until a side runs out of time (returned) or the game
/// ends some other way (`None`).
pub async fn countdown(
    record: Arc<Guarded<GameRecord>>,
    mut resets: ResetReceivers,
    game_over: CancellationToken,
    tick: Duration,
) -> Option<Color> {
    let mut interval = time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = game_over.cancelled() => return None,

            Some(()) = resets.white.recv() => interval.reset(),

            Some(()) = resets.black.recv() => interval.reset(),

            _ = interval.tick() => {
                let outcome = record
                    .write(|r| {
                        if r.status.is_over() {
                            return Tick::Finished;
                        }
                        match r.charge_clock(Instant::now()) {
                            Some(side) => Tick::Flagged(side),
                            None => Tick::Running,
                        }
                    })
                    .await;

                match outcome {
                    Tick::Running => {}
                    Tick::Finished => return None,
                    Tick::Flagged(side) => {
                        let game_id = record.read(|r| r.id).await;
                        info!(game_id, color = %side, "flag fell");
                        return Some(side);
                    }
                }
            }
        }
    }
}
