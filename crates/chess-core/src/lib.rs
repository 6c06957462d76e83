//! Chess rules core: board state, move verification, FEN and move histories.

mod board;
pub mod fen;
pub mod game_data;
pub mod notation;
pub mod table;
pub mod types;

pub use fen::{FenError, STARTING_FEN};
pub use game_data::{parse_history, replay, replay_records, MoveRecord, ReplayError};
pub use notation::NotationError;
pub use table::{
    AppliedMove, CastleSide, CastlingRights, DrawCounters, DrawFlags, EnPassant, IllegalMove, InvariantViolation,
    MoveKind, Table, Termination,
};
pub use types::{Color, Move, Piece, PieceKind, Square};
