//! FEN import and export for [`Table`].

use thiserror::Error;

use crate::board::Board;
use crate::table::{CastleSide, CastlingRights, DrawCounters, EnPassant, Table, Termination};
use crate::types::{Color, Piece, PieceKind, Square};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 6 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid piece placement: {0}")]
    Placement(String),

    #[error("invalid side to move: {0:?}")]
    Turn(String),

    #[error("invalid castling field: {0:?}")]
    Castling(String),

    #[error("invalid en passant field: {0:?}")]
    EnPassant(String),

    #[error("invalid move counter: {0:?}")]
    Counter(String),

    #[error("{color} has {count} kings")]
    Kings { color: Color, count: usize },

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),

    #[error("side not to move is in check")]
    OpponentInCheck,
}

impl Table {
    /// Load a position from a six-field FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::FieldCount(fields.len()));
        }

        let board = parse_placement(fields[0])?;

        let turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::Turn(other.to_string())),
        };

        let mut kings = [Square::at(0, 0); 2];
        for color in [Color::White, Color::Black] {
            let found: Vec<Square> = board
                .pieces()
                .filter(|(_, p)| *p == Piece::new(color, PieceKind::King))
                .map(|(sq, _)| sq)
                .collect();
            if found.len() != 1 {
                return Err(FenError::Kings {
                    color,
                    count: found.len(),
                });
            }
            kings[color.index()] = found[0];
        }

        if let Some((sq, _)) = board
            .pieces()
            .find(|(sq, p)| p.kind == PieceKind::Pawn && (sq.rank() == 0 || sq.rank() == 7))
        {
            return Err(FenError::PawnOnBackRank(sq));
        }

        let castling = parse_castling(fields[2], &board)?;
        let en_passant = parse_en_passant(fields[3], turn, &board)?;

        let halfmove: u32 = fields[4]
            .parse()
            .map_err(|_| FenError::Counter(fields[4].to_string()))?;
        let fullmove: u32 = fields[5]
            .parse()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| FenError::Counter(fields[5].to_string()))?;

        let ply = (fullmove - 1)
            .checked_mul(2)
            .and_then(|p| p.checked_add(u32::from(turn == Color::Black)))
            .ok_or_else(|| FenError::Counter(fields[5].to_string()))?;
        let baseline = i64::from(ply) - i64::from(halfmove);

        let mut table = Table {
            board,
            turn,
            castling,
            en_passant,
            kings,
            counters: DrawCounters {
                pawn_move: baseline,
                last_capture: baseline,
            },
            ply,
            default_promotion: PieceKind::Queen,
            termination: None,
            concluded: false,
        };

        if table
            .board
            .is_attacked(table.king_square(turn.opposite()), turn)
        {
            return Err(FenError::OpponentInCheck);
        }

        if table.legal_moves().is_empty() {
            table.termination = Some(if table.is_check() {
                Termination::Checkmate {
                    winner: turn.opposite(),
                }
            } else {
                Termination::Stalemate
            });
            table.concluded = true;
        }

        Ok(table)
    }

    /// Standard FEN of the current position.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.board.get(Square::at(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(self.turn.fen_char());

        fen.push(' ');
        let before = fen.len();
        for (color, side, c) in [
            (Color::White, CastleSide::KingSide, 'K'),
            (Color::White, CastleSide::QueenSide, 'Q'),
            (Color::Black, CastleSide::KingSide, 'k'),
            (Color::Black, CastleSide::QueenSide, 'q'),
        ] {
            if self.castling.has(color, side) {
                fen.push(c);
            }
        }
        if fen.len() == before {
            fen.push('-');
        }

        fen.push(' ');
        // The side that just moved is the one whose double push may be taken.
        let pusher = self.turn.opposite();
        match self.en_passant.file(pusher) {
            Some(file) => {
                let rank = match pusher {
                    Color::White => 2,
                    Color::Black => 5,
                };
                fen.push_str(&Square::at(file, rank).to_string());
            }
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock(), self.fullmove_number()));
        fen
    }
}

fn parse_placement(field: &str) -> Result<Board, FenError> {
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::Placement(field.to_string()));
    }

    let mut board = Board::empty();
    for (i, row) in rows.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as u8;
            } else {
                let piece = Piece::from_fen_char(c).ok_or_else(|| FenError::Placement(field.to_string()))?;
                if file >= 8 {
                    return Err(FenError::Placement(field.to_string()));
                }
                board.set(Square::at(file, rank), Some(piece));
                file += 1;
            }
            if file > 8 {
                return Err(FenError::Placement(field.to_string()));
            }
        }
        if file != 8 {
            return Err(FenError::Placement(field.to_string()));
        }
    }
    Ok(board)
}

fn parse_castling(field: &str, board: &Board) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
        white_king_moved: false,
        black_king_moved: false,
    };
    if field == "-" {
        return Ok(rights);
    }

    for c in field.chars() {
        let (color, side) = match c {
            'K' => (Color::White, CastleSide::KingSide),
            'Q' => (Color::White, CastleSide::QueenSide),
            'k' => (Color::Black, CastleSide::KingSide),
            'q' => (Color::Black, CastleSide::QueenSide),
            _ => return Err(FenError::Castling(field.to_string())),
        };
        let rank = color.back_rank();
        let rook_file = match side {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        };
        // A claimed right needs its king and rook at home.
        if board.get(Square::at(4, rank)) != Some(Piece::new(color, PieceKind::King))
            || board.get(Square::at(rook_file, rank)) != Some(Piece::new(color, PieceKind::Rook))
        {
            return Err(FenError::Castling(field.to_string()));
        }
        let flag = match (color, side) {
            (Color::White, CastleSide::KingSide) => &mut rights.white_king_side,
            (Color::White, CastleSide::QueenSide) => &mut rights.white_queen_side,
            (Color::Black, CastleSide::KingSide) => &mut rights.black_king_side,
            (Color::Black, CastleSide::QueenSide) => &mut rights.black_queen_side,
        };
        if *flag {
            return Err(FenError::Castling(field.to_string()));
        }
        *flag = true;
    }
    Ok(rights)
}

fn parse_en_passant(field: &str, turn: Color, board: &Board) -> Result<EnPassant, FenError> {
    let mut en_passant = EnPassant::default();
    if field == "-" {
        return Ok(en_passant);
    }

    let invalid = || FenError::EnPassant(field.to_string());
    let target: Square = field.parse().map_err(|_| invalid())?;
    let pusher = turn.opposite();
    let expected_rank = match pusher {
        Color::White => 2,
        Color::Black => 5,
    };
    if target.rank() != expected_rank {
        return Err(invalid());
    }

    let forward = pusher.forward();
    let landed = target.offset(0, forward).ok_or_else(invalid)?;
    let origin = target.offset(0, -forward).ok_or_else(invalid)?;
    if board.get(landed) != Some(Piece::new(pusher, PieceKind::Pawn))
        || !board.is_empty(target)
        || !board.is_empty(origin)
    {
        return Err(invalid());
    }

    en_passant.set_only(pusher, target.file());
    Ok(en_passant)
}
