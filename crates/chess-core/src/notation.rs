//! Conversions between the internal move representation and external
//! notations: UCI text and the `shakmaty` library's move types.
//!
//! All functions here are pure; they never consult a position.

use shakmaty::uci::UciMove;
use thiserror::Error;

use crate::types::{Move, PieceKind, Square};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("invalid square: {0:?}")]
    Square(String),

    #[error("invalid move: {0:?}")]
    Move(String),

    #[error("invalid promotion piece: {0:?}")]
    Promotion(String),

    #[error("unsupported external move: {0}")]
    Unsupported(String),
}

impl Move {
    /// Parse UCI long algebraic text such as `e2e4` or `e7e8q`.
    pub fn from_uci(text: &str) -> Result<Self, NotationError> {
        let text = text.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(NotationError::Move(text.to_string()));
        }
        let source: Square = text[0..2].parse()?;
        let target: Square = text[2..4].parse()?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => Some(parse_promotion(c).ok_or_else(|| NotationError::Promotion(c.to_string()))?),
        };
        Ok(Self {
            source,
            target,
            promotion,
        })
    }

    /// UCI text form of this move.
    #[must_use]
    pub fn to_uci(&self) -> String {
        self.to_string()
    }
}

/// Promotion letter as used by UCI and by stored move histories.
fn parse_promotion(c: char) -> Option<PieceKind> {
    PieceKind::from_letter(c).filter(|kind| kind.is_promotion_target())
}

/// Parse a stored promotion field. Empty text means "no promotion".
pub fn parse_promotion_field(text: &str) -> Result<Option<PieceKind>, NotationError> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => parse_promotion(c)
            .map(Some)
            .ok_or_else(|| NotationError::Promotion(text.to_string())),
        _ => Err(NotationError::Promotion(text.to_string())),
    }
}

fn to_external_square(sq: Square) -> shakmaty::Square {
    shakmaty::Square::from_coords(
        shakmaty::File::new(u32::from(sq.file())),
        shakmaty::Rank::new(u32::from(sq.rank())),
    )
}

fn from_external_square(sq: shakmaty::Square) -> Square {
    Square::at(sq.file() as u8, sq.rank() as u8)
}

fn to_external_role(kind: PieceKind) -> shakmaty::Role {
    match kind {
        PieceKind::Pawn => shakmaty::Role::Pawn,
        PieceKind::Knight => shakmaty::Role::Knight,
        PieceKind::Bishop => shakmaty::Role::Bishop,
        PieceKind::Rook => shakmaty::Role::Rook,
        PieceKind::Queen => shakmaty::Role::Queen,
        PieceKind::King => shakmaty::Role::King,
    }
}

fn from_external_role(role: shakmaty::Role) -> PieceKind {
    match role {
        shakmaty::Role::Pawn => PieceKind::Pawn,
        shakmaty::Role::Knight => PieceKind::Knight,
        shakmaty::Role::Bishop => PieceKind::Bishop,
        shakmaty::Role::Rook => PieceKind::Rook,
        shakmaty::Role::Queen => PieceKind::Queen,
        shakmaty::Role::King => PieceKind::King,
    }
}

impl From<Move> for UciMove {
    fn from(mv: Move) -> Self {
        UciMove::Normal {
            from: to_external_square(mv.source),
            to: to_external_square(mv.target),
            promotion: mv.promotion.map(to_external_role),
        }
    }
}

impl TryFrom<&UciMove> for Move {
    type Error = NotationError;

    fn try_from(uci: &UciMove) -> Result<Self, Self::Error> {
        match uci {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Ok(Move {
                source: from_external_square(*from),
                target: from_external_square(*to),
                promotion: promotion.map(from_external_role),
            }),
            other => Err(NotationError::Unsupported(other.to_string())),
        }
    }
}
