use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::notation::parse_promotion_field;
use crate::table::{AppliedMove, IllegalMove, Table};
use crate::types::{Move, PieceKind, Square};

/// One entry of a persisted or transmitted move history.
///
/// Written camelCase; the short legacy names (`S`, `T`, `P`, `Fen`) and an
/// empty promotion string are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    #[serde(alias = "S")]
    pub source: Square,
    #[serde(alias = "T")]
    pub target: Square,
    #[serde(
        alias = "P",
        default,
        serialize_with = "promotion_letter",
        deserialize_with = "promotion_field"
    )]
    pub promotion: Option<PieceKind>,
    #[serde(alias = "Fen", default)]
    pub resulting_fen: String,
}

fn promotion_letter<S: Serializer>(promotion: &Option<PieceKind>, serializer: S) -> Result<S::Ok, S::Error> {
    match promotion {
        Some(kind) => serializer.serialize_char(kind.letter()),
        None => serializer.serialize_none(),
    }
}

fn promotion_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PieceKind>, D::Error> {
    let text = Option::<String>::deserialize(deserializer)?;
    match text {
        None => Ok(None),
        Some(text) => parse_promotion_field(&text).map_err(serde::de::Error::custom),
    }
}

impl MoveRecord {
    #[must_use]
    pub fn to_move(&self) -> Move {
        Move {
            source: self.source,
            target: self.target,
            promotion: self.promotion,
        }
    }
}

impl From<&AppliedMove> for MoveRecord {
    fn from(applied: &AppliedMove) -> Self {
        Self {
            source: applied.mv.source,
            target: applied.mv.target,
            promotion: applied.mv.promotion,
            resulting_fen: applied.fen.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("move {ply} ({mv}) rejected: {source}")]
    Illegal {
        ply: usize,
        mv: Move,
        #[source]
        source: IllegalMove,
    },

    #[error("recorded position after move {ply} does not match")]
    FenMismatch { ply: usize },
}

/// Rebuild a table by applying `moves` from the standard starting position.
pub fn replay(moves: &[Move]) -> Result<Table, ReplayError> {
    let mut table = Table::new();
    for (i, mv) in moves.iter().enumerate() {
        table.propose_move(*mv).map_err(|source| ReplayError::Illegal {
            ply: i + 1,
            mv: *mv,
            source,
        })?;
    }
    Ok(table)
}

/// Like [`replay`], but also checks each recorded resulting position.
/// Records with an empty FEN are not checked.
pub fn replay_records(records: &[MoveRecord]) -> Result<Table, ReplayError> {
    let mut table = Table::new();
    for (i, record) in records.iter().enumerate() {
        let mv = record.to_move();
        let applied = table.propose_move(mv).map_err(|source| ReplayError::Illegal {
            ply: i + 1,
            mv,
            source,
        })?;
        if !record.resulting_fen.is_empty() && applied.fen != record.resulting_fen {
            return Err(ReplayError::FenMismatch { ply: i + 1 });
        }
    }
    Ok(table)
}

/// Parse a JSON array of move records.
pub fn parse_history(json: &str) -> Result<Vec<MoveRecord>, serde_json::Error> {
    serde_json::from_str(json)
}
