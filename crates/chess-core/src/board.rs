//! Piece placement grid and attack detection.

use crate::types::{Color, Piece, PieceKind, Square};

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub(crate) const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub(crate) const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// 8x8 grid of cell contents, indexed `[rank][file]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Board {
    cells: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub(crate) fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
        }
    }

    /// Standard initial placement.
    pub(crate) fn standard() -> Self {
        const BACK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Self::empty();
        for (file, kind) in BACK.iter().enumerate() {
            let file = file as u8;
            board.set(Square::at(file, 0), Some(Piece::new(Color::White, *kind)));
            board.set(Square::at(file, 1), Some(Piece::new(Color::White, PieceKind::Pawn)));
            board.set(Square::at(file, 6), Some(Piece::new(Color::Black, PieceKind::Pawn)));
            board.set(Square::at(file, 7), Some(Piece::new(Color::Black, *kind)));
        }
        board
    }

    pub(crate) fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.rank() as usize][sq.file() as usize]
    }

    pub(crate) fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.rank() as usize][sq.file() as usize] = piece;
    }

    pub(crate) fn take(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.rank() as usize][sq.file() as usize].take()
    }

    pub(crate) fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Occupied squares with their pieces, a1 first.
    pub(crate) fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Whether any piece of color `by` attacks `target`.
    ///
    /// Pawn pushes do not attack; en passant is irrelevant for king safety
    /// because a king is never the pawn captured en passant.
    pub(crate) fn is_attacked(&self, target: Square, by: Color) -> bool {
        let holds = |sq: Option<Square>, kinds: &[PieceKind]| {
            sq.and_then(|s| self.get(s))
                .is_some_and(|p| p.color == by && kinds.contains(&p.kind))
        };

        // A pawn of `by` attacks diagonally forward, so it sits one rank behind.
        let behind = -by.forward();
        if holds(target.offset(-1, behind), &[PieceKind::Pawn])
            || holds(target.offset(1, behind), &[PieceKind::Pawn])
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| holds(target.offset(df, dr), &[PieceKind::Knight]))
        {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&(df, dr)| holds(target.offset(df, dr), &[PieceKind::King]))
        {
            return true;
        }

        let ray_hits = |directions: &[(i8, i8)], kinds: &[PieceKind]| {
            directions.iter().any(|&(df, dr)| {
                let mut current = target.offset(df, dr);
                while let Some(sq) = current {
                    if let Some(piece) = self.get(sq) {
                        return piece.color == by && kinds.contains(&piece.kind);
                    }
                    current = sq.offset(df, dr);
                }
                false
            })
        };

        ray_hits(&ROOK_DIRECTIONS, &[PieceKind::Rook, PieceKind::Queen])
            || ray_hits(&BISHOP_DIRECTIONS, &[PieceKind::Bishop, PieceKind::Queen])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_standard_board_layout() {
        let board = Board::standard();
        assert_eq!(board.get(sq("e1")), Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(board.get(sq("d8")), Some(Piece::new(Color::Black, PieceKind::Queen)));
        assert!(board.is_empty(sq("e4")));
        assert_eq!(board.pieces().count(), 32);
    }

    #[test]
    fn test_pawn_attacks_only_diagonally_forward() {
        let mut board = Board::empty();
        board.set(sq("e4"), Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert!(board.is_attacked(sq("d5"), Color::White));
        assert!(board.is_attacked(sq("f5"), Color::White));
        assert!(!board.is_attacked(sq("e5"), Color::White));
        assert!(!board.is_attacked(sq("d3"), Color::White));
    }

    #[test]
    fn test_sliders_are_blocked() {
        let mut board = Board::empty();
        board.set(sq("a1"), Some(Piece::new(Color::Black, PieceKind::Rook)));
        board.set(sq("a4"), Some(Piece::new(Color::White, PieceKind::Knight)));
        assert!(board.is_attacked(sq("a3"), Color::Black));
        assert!(board.is_attacked(sq("a4"), Color::Black));
        assert!(!board.is_attacked(sq("a5"), Color::Black));
        assert!(board.is_attacked(sq("h1"), Color::Black));
    }

    #[test]
    fn test_knight_and_king_attacks() {
        let mut board = Board::empty();
        board.set(sq("g1"), Some(Piece::new(Color::White, PieceKind::Knight)));
        board.set(sq("a8"), Some(Piece::new(Color::Black, PieceKind::King)));
        assert!(board.is_attacked(sq("f3"), Color::White));
        assert!(board.is_attacked(sq("e2"), Color::White));
        assert!(!board.is_attacked(sq("g3"), Color::White));
        assert!(board.is_attacked(sq("b7"), Color::Black));
        assert!(!board.is_attacked(sq("c6"), Color::Black));
    }
}
