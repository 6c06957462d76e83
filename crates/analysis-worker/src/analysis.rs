//! Best-move analysis of a finished game.
//!
//! The game is replayed on its own `Table`; live games are never touched.
//! Every played move is checked against the replay first; the engine is then
//! asked for its choice in the position before it, and both resulting
//! positions are reported as FEN.

use chess_core::{Move, Table, STARTING_FEN};
use serde::{Deserialize, Serialize};
use shakmaty::uci::UciMove;
use tracing::{debug, warn};

use crate::engine::BestMoveSearch;
use crate::error::WorkerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveAnalysis {
    /// `None` for the starting position entry.
    pub played_move: Option<Move>,
    pub fen_before: String,
    /// Position after the played move.
    pub played_fen: String,
    pub best_move: Option<Move>,
    /// Position after the engine's move, if it suggested one.
    pub best_fen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub depth: u8,
    pub moves: Vec<MoveAnalysis>,
}

/// Analyze `moves` from the standard starting position at `depth`.
///
/// Entry 0 describes the starting position; entry `i` the `i`-th move.
pub async fn analyze_game<E: BestMoveSearch>(
    engine: &mut E,
    moves: &[Move],
    depth: u8,
    max_depth: u8,
) -> Result<GameAnalysis, WorkerError> {
    if depth == 0 || depth > max_depth {
        return Err(WorkerError::DepthOutOfRange {
            depth,
            max: max_depth,
        });
    }

    let mut analysis = GameAnalysis {
        depth,
        moves: Vec::with_capacity(moves.len() + 1),
    };
    analysis.moves.push(MoveAnalysis {
        played_move: None,
        fen_before: STARTING_FEN.to_string(),
        played_fen: STARTING_FEN.to_string(),
        best_move: None,
        best_fen: None,
    });

    let mut table = Table::new();
    for (i, &played) in moves.iter().enumerate() {
        let ply = i + 1;
        let before = table.clone();
        let fen_before = before.to_fen();

        let applied = table.propose_move(played).map_err(|source| {
            warn!(ply, mv = %played, fen = %fen_before, "Illegal move in game history, aborting analysis");
            WorkerError::IllegalMove {
                ply,
                mv: played.to_string(),
                source,
            }
        })?;

        let suggestion = engine.best_move(&fen_before, depth).await?;

        let (best_move, best_fen) = match suggestion {
            Some(text) => {
                let mv = parse_engine_move(&text).inspect_err(|e| {
                    warn!(ply, text = %text, fen = %fen_before, error = %e, "Unreadable engine move, aborting analysis");
                })?;
                let mut best = before;
                let best_applied = best.propose_move(mv).map_err(|source| {
                    warn!(ply, mv = %mv, fen = %fen_before, "Engine suggested an illegal move, aborting analysis");
                    WorkerError::IllegalMove {
                        ply,
                        mv: text.clone(),
                        source,
                    }
                })?;
                (Some(best_applied.mv), Some(best_applied.fen))
            }
            None => (None, None),
        };

        debug!(ply, played = %applied.mv, best = ?best_move.map(|m| m.to_string()), "Move analyzed");
        analysis.moves.push(MoveAnalysis {
            played_move: Some(applied.mv),
            fen_before,
            played_fen: applied.fen,
            best_move,
            best_fen,
        });
    }

    Ok(analysis)
}

/// Engine output goes through the external library's UCI parser, then the
/// notation bridge into the internal move type.
fn parse_engine_move(text: &str) -> Result<Move, WorkerError> {
    let uci: UciMove = text
        .parse()
        .map_err(|_| WorkerError::Notation(format!("invalid engine move {text:?}")))?;
    Ok(Move::try_from(&uci)?)
}
