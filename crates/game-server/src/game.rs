use chess_core::{Color, Table};
use tokio::sync::Mutex;

use crate::clock::ClockSignals;
use crate::guarded::Guarded;
use crate::observers::ObserverSet;
use crate::record::GameId;

/// Live state of one running game, owned by the game registry.
#[derive(Debug)]
pub struct LiveGame {
    pub id: GameId,
    pub white: String,
    pub black: String,
    pub table: Guarded<Table>,
    pub observers: ObserverSet,
    pub signals: ClockSignals,
    /// Held while a move or an ending is applied to the table and written to
    /// the record, so records list moves in the order they were accepted.
    pub(crate) sequencer: Mutex<()>,
}

impl LiveGame {
    pub fn new(id: GameId, white: &str, black: &str, table: Table, signals: ClockSignals) -> Self {
        Self {
            id,
            white: white.to_string(),
            black: black.to_string(),
            table: Guarded::new(table),
            observers: ObserverSet::with_players(white, black),
            signals,
            sequencer: Mutex::new(()),
        }
    }

    /// Color `player` plays, if they play in this game.
    pub fn color_of(&self, player: &str) -> Option<Color> {
        if player == self.white {
            Some(Color::White)
        } else if player == self.black {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn player(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}
