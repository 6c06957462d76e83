//! Per-game board state and authoritative move verification.
//!
//! A [`Table`] holds the position together with every piece of bookkeeping a
//! legality check needs beyond the current placement: castling rights,
//! en-passant eligibility, cached king squares and the draw-rule counters.
//! Proposals are checked against a simulated copy of the board first, so a
//! rejected move never mutates the table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};
use crate::types::{Color, Move, Piece, PieceKind, Square};

/// Half-moves without a pawn move or capture after which a draw may be claimed.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Why a proposal was refused. Every variant renders as "illegal move" so
/// callers cannot tell the reasons apart; tests and logs match on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("illegal move")]
    GameOver,

    #[error("illegal move")]
    NotYourTurn,

    #[error("illegal move")]
    EmptySource,

    #[error("illegal move")]
    Unreachable,

    #[error("illegal move")]
    CastlingNotAllowed,

    #[error("illegal move")]
    LeavesKingInCheck,
}

/// A table whose bookkeeping no longer matches its placement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{color} has {count} kings")]
    KingCount { color: Color, count: usize },

    #[error("{color} king cached on {cached} but stands on {actual}")]
    KingLocation {
        color: Color,
        cached: Square,
        actual: Square,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    const fn rook_file(self) -> u8 {
        match self {
            Self::KingSide => 7,
            Self::QueenSide => 0,
        }
    }

    const fn king_target_file(self) -> u8 {
        match self {
            Self::KingSide => 6,
            Self::QueenSide => 2,
        }
    }

    const fn rook_target_file(self) -> u8 {
        match self {
            Self::KingSide => 5,
            Self::QueenSide => 3,
        }
    }
}

/// Castling eligibility. A revoked right is never restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
    pub white_king_moved: bool,
    pub black_king_moved: bool,
}

impl CastlingRights {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
            white_king_moved: false,
            black_king_moved: false,
        }
    }

    /// Whether `color` may still castle on `side` as far as history goes.
    #[must_use]
    pub const fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_king_side && !self.white_king_moved,
            (Color::White, CastleSide::QueenSide) => self.white_queen_side && !self.white_king_moved,
            (Color::Black, CastleSide::KingSide) => self.black_king_side && !self.black_king_moved,
            (Color::Black, CastleSide::QueenSide) => self.black_queen_side && !self.black_king_moved,
        }
    }

    fn revoke(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_king_side = false,
            (Color::White, CastleSide::QueenSide) => self.white_queen_side = false,
            (Color::Black, CastleSide::KingSide) => self.black_king_side = false,
            (Color::Black, CastleSide::QueenSide) => self.black_queen_side = false,
        }
    }

    fn king_moved(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_moved = true,
            Color::Black => self.black_king_moved = true,
        }
        self.revoke(color, CastleSide::KingSide);
        self.revoke(color, CastleSide::QueenSide);
    }

    /// Revoke the right tied to a rook's home corner, if `sq` is one.
    fn corner_touched(&mut self, sq: Square) {
        for color in [Color::White, Color::Black] {
            if sq.rank() != color.back_rank() {
                continue;
            }
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                if sq.file() == side.rook_file() {
                    self.revoke(color, side);
                }
            }
        }
    }
}

/// Files on which a pawn of each color advanced two squares on the move just
/// played. At most one flag is set at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnPassant {
    flags: [[bool; 8]; 2],
}

impl EnPassant {
    #[must_use]
    pub fn is_eligible(&self, color: Color, file: u8) -> bool {
        self.flags[color.index()][file as usize]
    }

    pub(crate) fn set_only(&mut self, color: Color, file: u8) {
        self.clear();
        self.flags[color.index()][file as usize] = true;
    }

    fn clear(&mut self) {
        self.flags = [[false; 8]; 2];
    }

    /// The file a pawn of `color` just double-pushed on, if any.
    #[must_use]
    pub fn file(&self, color: Color) -> Option<u8> {
        self.flags[color.index()]
            .iter()
            .position(|&eligible| eligible)
            .map(|f| f as u8)
    }
}

/// Ply indices used by the fifty-move rule. A position loaded from FEN may
/// place them before its own first ply, so they can be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCounters {
    /// Ply of the most recent pawn move.
    pub pawn_move: i64,
    /// Ply of the most recent capture.
    pub last_capture: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Termination {
    Checkmate { winner: Color },
    Stalemate,
}

/// Draw conditions that can be claimed but never end the game by themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawFlags {
    pub fifty_move: bool,
    pub insufficient_material: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    DoublePush,
    EnPassant,
    Castle(CastleSide),
    Promotion,
}

/// Result of an accepted proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    /// The move as applied; `promotion` is set exactly when a pawn promoted.
    pub mv: Move,
    pub mover: Color,
    pub kind: MoveKind,
    pub captured: Option<PieceKind>,
    /// Position after the move.
    pub fen: String,
    /// Whether the opponent is now in check.
    pub check: bool,
    pub termination: Option<Termination>,
    pub draw: DrawFlags,
}

/// Board state of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: EnPassant,
    pub(crate) kings: [Square; 2],
    pub(crate) counters: DrawCounters,
    pub(crate) ply: u32,
    pub(crate) default_promotion: PieceKind,
    pub(crate) termination: Option<Termination>,
    pub(crate) concluded: bool,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Standard initial position, white to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::standard(),
            turn: Color::White,
            castling: CastlingRights::all(),
            en_passant: EnPassant::default(),
            kings: [Square::at(4, 0), Square::at(4, 7)],
            counters: DrawCounters::default(),
            ply: 0,
            default_promotion: PieceKind::Queen,
            termination: None,
            concluded: false,
        }
    }

    /// Piece a pawn becomes when a proposal names no (or an invalid) promotion.
    /// Kinds that are not promotion targets leave the default at queen.
    #[must_use]
    pub fn with_default_promotion(mut self, kind: PieceKind) -> Self {
        if kind.is_promotion_target() {
            self.default_promotion = kind;
        }
        self
    }

    #[must_use]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Half-moves played since the start of the game.
    #[must_use]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.ply / 2 + 1
    }

    #[must_use]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[must_use]
    pub fn en_passant(&self) -> EnPassant {
        self.en_passant
    }

    /// File of the pawn of `color` that just advanced two squares, if any.
    #[must_use]
    pub fn en_passant_file(&self, color: Color) -> Option<u8> {
        self.en_passant.file(color)
    }

    #[must_use]
    pub fn draw_counters(&self) -> DrawCounters {
        self.counters
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// True once the game ended on the board or was concluded externally.
    #[must_use]
    pub fn is_concluded(&self) -> bool {
        self.concluded
    }

    /// Stop accepting moves (resignation, timeout, agreed draw).
    pub fn conclude(&mut self) {
        self.concluded = true;
    }

    /// Whether the side to move is in check.
    #[must_use]
    pub fn is_check(&self) -> bool {
        self.board
            .is_attacked(self.king_square(self.turn), self.turn.opposite())
    }

    /// Half-moves since the last pawn move or capture.
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        let since = i64::from(self.ply) - self.counters.pawn_move.max(self.counters.last_capture);
        u32::try_from(since).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn fifty_move_draw_available(&self) -> bool {
        self.halfmove_clock() >= FIFTY_MOVE_PLIES
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// bishops that all stand on one square color.
    #[must_use]
    pub fn insufficient_material(&self) -> bool {
        let mut minors = 0;
        let mut bishop_colors = [false; 2];
        let mut knights = 0;
        for (sq, piece) in self.board.pieces() {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
                PieceKind::Knight => {
                    knights += 1;
                    minors += 1;
                }
                PieceKind::Bishop => {
                    bishop_colors[usize::from(sq.is_light())] = true;
                    minors += 1;
                }
            }
        }
        minors <= 1 || (knights == 0 && !(bishop_colors[0] && bishop_colors[1]))
    }

    #[must_use]
    pub fn draw_flags(&self) -> DrawFlags {
        DrawFlags {
            fifty_move: self.fifty_move_draw_available(),
            insufficient_material: self.insufficient_material(),
        }
    }

    /// Check the placement against the cached bookkeeping.
    pub fn verify_invariants(&self) -> Result<(), InvariantViolation> {
        for color in [Color::White, Color::Black] {
            let kings: Vec<Square> = self
                .board
                .pieces()
                .filter(|(_, p)| *p == Piece::new(color, PieceKind::King))
                .map(|(sq, _)| sq)
                .collect();
            if kings.len() != 1 {
                return Err(InvariantViolation::KingCount {
                    color,
                    count: kings.len(),
                });
            }
            let cached = self.king_square(color);
            if kings[0] != cached {
                return Err(InvariantViolation::KingLocation {
                    color,
                    cached,
                    actual: kings[0],
                });
            }
        }
        Ok(())
    }

    /// Propose a move on behalf of `color`. Fails with `NotYourTurn` when
    /// `color` is not the side to move.
    pub fn propose_move_as(&mut self, color: Color, mv: Move) -> Result<AppliedMove, IllegalMove> {
        if self.concluded {
            return Err(IllegalMove::GameOver);
        }
        if color != self.turn {
            return Err(IllegalMove::NotYourTurn);
        }
        self.propose_move(mv)
    }

    /// Validate `mv` for the side to move and apply it if legal.
    pub fn propose_move(&mut self, mv: Move) -> Result<AppliedMove, IllegalMove> {
        if self.concluded {
            return Err(IllegalMove::GameOver);
        }
        let piece = self.board.get(mv.source).ok_or(IllegalMove::EmptySource)?;
        if piece.color != self.turn {
            return Err(IllegalMove::NotYourTurn);
        }

        let kind = self.classify(mv.source, piece, mv.target)?;
        let promotion = (kind == MoveKind::Promotion).then(|| {
            mv.promotion
                .filter(|k| k.is_promotion_target())
                .unwrap_or(self.default_promotion)
        });
        let mv = Move {
            promotion,
            ..mv
        };

        let captured = match kind {
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            _ => self.board.get(mv.target).map(|p| p.kind),
        };

        let mut next = self.board.clone();
        apply(&mut next, mv, piece, kind);
        let king = if piece.kind == PieceKind::King {
            mv.target
        } else {
            self.king_square(piece.color)
        };
        if next.is_attacked(king, piece.color.opposite()) {
            return Err(IllegalMove::LeavesKingInCheck);
        }

        self.commit(next, mv, piece, kind, captured);

        let check = self.is_check();
        if self.legal_moves().is_empty() {
            self.termination = Some(if check {
                Termination::Checkmate { winner: piece.color }
            } else {
                Termination::Stalemate
            });
            self.concluded = true;
        }

        Ok(AppliedMove {
            mv,
            mover: piece.color,
            kind,
            captured,
            fen: self.to_fen(),
            check,
            termination: self.termination,
            draw: self.draw_flags(),
        })
    }

    fn commit(&mut self, next: Board, mv: Move, piece: Piece, kind: MoveKind, captured: Option<PieceKind>) {
        let color = piece.color;
        self.board = next;

        if piece.kind == PieceKind::King {
            self.castling.king_moved(color);
            self.kings[color.index()] = mv.target;
        }
        // Moving off a corner or capturing onto one both retire that rook.
        self.castling.corner_touched(mv.source);
        if captured.is_some() {
            self.castling.corner_touched(mv.target);
        }

        if kind == MoveKind::DoublePush {
            self.en_passant.set_only(color, mv.source.file());
        } else {
            self.en_passant.clear();
        }

        self.ply = self.ply.saturating_add(1);
        if piece.kind == PieceKind::Pawn {
            self.counters.pawn_move = i64::from(self.ply);
        }
        if captured.is_some() {
            self.counters.last_capture = i64::from(self.ply);
        }

        self.turn = color.opposite();
    }

    /// Decide which kind of move `source -> target` is for `piece`, or why it
    /// is outside the piece's movement rules. King safety is checked later.
    fn classify(&self, source: Square, piece: Piece, target: Square) -> Result<MoveKind, IllegalMove> {
        if piece.kind == PieceKind::King
            && source.rank() == target.rank()
            && source.file().abs_diff(target.file()) == 2
        {
            let side = if target.file() > source.file() {
                CastleSide::KingSide
            } else {
                CastleSide::QueenSide
            };
            self.check_castle(piece.color, side)?;
            return Ok(MoveKind::Castle(side));
        }

        self.destinations(source, piece)
            .into_iter()
            .find(|(sq, _)| *sq == target)
            .map(|(_, kind)| kind)
            .ok_or(IllegalMove::Unreachable)
    }

    /// Pseudo-legal destinations of the piece on `source`, castling included
    /// only when every castling condition holds.
    fn destinations(&self, source: Square, piece: Piece) -> Vec<(Square, MoveKind)> {
        let mut out = Vec::new();
        let color = piece.color;
        let enemy_or_empty = |sq: Square| !matches!(self.board.get(sq), Some(p) if p.color == color);

        match piece.kind {
            PieceKind::Pawn => self.pawn_destinations(source, color, &mut out),
            PieceKind::Knight => {
                for (df, dr) in KNIGHT_OFFSETS {
                    if let Some(sq) = source.offset(df, dr).filter(|&sq| enemy_or_empty(sq)) {
                        out.push((sq, MoveKind::Normal));
                    }
                }
            }
            PieceKind::Bishop => self.slide(source, color, &BISHOP_DIRECTIONS, &mut out),
            PieceKind::Rook => self.slide(source, color, &ROOK_DIRECTIONS, &mut out),
            PieceKind::Queen => {
                self.slide(source, color, &BISHOP_DIRECTIONS, &mut out);
                self.slide(source, color, &ROOK_DIRECTIONS, &mut out);
            }
            PieceKind::King => {
                for (df, dr) in KING_OFFSETS {
                    if let Some(sq) = source.offset(df, dr).filter(|&sq| enemy_or_empty(sq)) {
                        out.push((sq, MoveKind::Normal));
                    }
                }
                for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                    if self.check_castle(color, side).is_ok() {
                        let target = Square::at(side.king_target_file(), color.back_rank());
                        out.push((target, MoveKind::Castle(side)));
                    }
                }
            }
        }
        out
    }

    fn pawn_destinations(&self, source: Square, color: Color, out: &mut Vec<(Square, MoveKind)>) {
        let forward = color.forward();
        let last_rank = color.opposite().back_rank();
        let advance = |sq: Square| {
            if sq.rank() == last_rank {
                MoveKind::Promotion
            } else {
                MoveKind::Normal
            }
        };

        if let Some(one) = source.offset(0, forward).filter(|&sq| self.board.is_empty(sq)) {
            out.push((one, advance(one)));
            let start_rank = if color == Color::White { 1 } else { 6 };
            if source.rank() == start_rank {
                if let Some(two) = one.offset(0, forward).filter(|&sq| self.board.is_empty(sq)) {
                    out.push((two, MoveKind::DoublePush));
                }
            }
        }

        // Rank a pawn must stand on to capture en passant.
        let passing_rank = if color == Color::White { 4 } else { 3 };
        for df in [-1, 1] {
            let Some(diag) = source.offset(df, forward) else {
                continue;
            };
            match self.board.get(diag) {
                Some(p) if p.color != color => out.push((diag, advance(diag))),
                None if source.rank() == passing_rank
                    && self.en_passant.is_eligible(color.opposite(), diag.file()) =>
                {
                    out.push((diag, MoveKind::EnPassant));
                }
                _ => {}
            }
        }
    }

    fn slide(&self, source: Square, color: Color, directions: &[(i8, i8)], out: &mut Vec<(Square, MoveKind)>) {
        for &(df, dr) in directions {
            let mut current = source.offset(df, dr);
            while let Some(sq) = current {
                match self.board.get(sq) {
                    None => out.push((sq, MoveKind::Normal)),
                    Some(p) => {
                        if p.color != color {
                            out.push((sq, MoveKind::Normal));
                        }
                        break;
                    }
                }
                current = sq.offset(df, dr);
            }
        }
    }

    /// Castling needs the right, king and rook at home, an empty gap, and a
    /// king that is not in check and never crosses or lands on an attacked square.
    fn check_castle(&self, color: Color, side: CastleSide) -> Result<(), IllegalMove> {
        let rank = color.back_rank();
        let king_home = Square::at(4, rank);
        let rook_home = Square::at(side.rook_file(), rank);
        let enemy = color.opposite();

        if !self.castling.has(color, side)
            || self.king_square(color) != king_home
            || self.board.get(rook_home) != Some(Piece::new(color, PieceKind::Rook))
        {
            return Err(IllegalMove::CastlingNotAllowed);
        }

        let (low, high) = match side {
            CastleSide::KingSide => (5, 6),
            CastleSide::QueenSide => (1, 3),
        };
        if (low..=high).any(|file| !self.board.is_empty(Square::at(file, rank))) {
            return Err(IllegalMove::CastlingNotAllowed);
        }

        let transit = Square::at(side.rook_target_file(), rank);
        let target = Square::at(side.king_target_file(), rank);
        if [king_home, transit, target]
            .iter()
            .any(|&sq| self.board.is_attacked(sq, enemy))
        {
            return Err(IllegalMove::CastlingNotAllowed);
        }
        Ok(())
    }

    /// Every legal move for the side to move. Promotions appear once per
    /// promotion piece. Empty once the table is concluded.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.concluded {
            return Vec::new();
        }
        let mut moves = Vec::new();
        for (source, piece) in self.board.pieces().filter(|(_, p)| p.color == self.turn) {
            for (target, kind) in self.destinations(source, piece) {
                let mv = Move::new(source, target);
                let mut next = self.board.clone();
                apply(&mut next, mv.with_promotion(PieceKind::Queen), piece, kind);
                let king = if piece.kind == PieceKind::King {
                    target
                } else {
                    self.king_square(piece.color)
                };
                if next.is_attacked(king, piece.color.opposite()) {
                    continue;
                }
                if kind == MoveKind::Promotion {
                    for promo in [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight] {
                        moves.push(mv.with_promotion(promo));
                    }
                } else {
                    moves.push(mv);
                }
            }
        }
        moves
    }
}

/// Move the pieces for an already classified move.
fn apply(board: &mut Board, mv: Move, piece: Piece, kind: MoveKind) {
    board.take(mv.source);
    let placed = match (kind, mv.promotion) {
        (MoveKind::Promotion, Some(promo)) => Piece::new(piece.color, promo),
        _ => piece,
    };
    board.set(mv.target, Some(placed));

    match kind {
        MoveKind::EnPassant => {
            board.take(Square::at(mv.target.file(), mv.source.rank()));
        }
        MoveKind::Castle(side) => {
            let rank = mv.source.rank();
            let rook = board.take(Square::at(side.rook_file(), rank));
            board.set(Square::at(side.rook_target_file(), rank), rook);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(text: &str) -> Move {
        Move::from_uci(text).unwrap()
    }

    fn sq(text: &str) -> Square {
        text.parse().unwrap()
    }

    fn play(table: &mut Table, moves: &[&str]) {
        for m in moves {
            table
                .propose_move(mv(m))
                .unwrap_or_else(|e| panic!("{m} rejected: {e:?}"));
        }
    }

    #[test]
    fn test_initial_position() {
        let table = Table::new();
        assert_eq!(table.turn(), Color::White);
        assert_eq!(table.legal_moves().len(), 20);
        assert_eq!(table.king_square(Color::White), sq("e1"));
        assert_eq!(table.king_square(Color::Black), sq("e8"));
        assert!(!table.is_check());
        assert!(table.verify_invariants().is_ok());
    }

    #[test]
    fn test_turn_alternates_only_on_accepted_moves() {
        let mut table = Table::new();
        assert_eq!(table.propose_move(mv("e7e5")), Err(IllegalMove::NotYourTurn));
        assert_eq!(table.turn(), Color::White);
        play(&mut table, &["e2e4"]);
        assert_eq!(table.turn(), Color::Black);
        assert_eq!(table.ply(), 1);
        assert_eq!(table.propose_move_as(Color::White, mv("d2d4")), Err(IllegalMove::NotYourTurn));
    }

    #[test]
    fn test_rejections_leave_table_untouched() {
        let mut table = Table::new();
        play(&mut table, &["e2e4", "e7e5", "d1h5", "b8c6"]);
        let before = table.clone();

        assert_eq!(table.propose_move(mv("e4e5")), Err(IllegalMove::Unreachable));
        assert_eq!(table.propose_move(mv("e3e4")), Err(IllegalMove::EmptySource));
        assert_eq!(table.propose_move(mv("a1a3")), Err(IllegalMove::Unreachable));
        assert_eq!(table.propose_move(mv("e1g1")), Err(IllegalMove::CastlingNotAllowed));
        assert_eq!(table, before);
    }

    #[test]
    fn test_pinned_piece_cannot_expose_king() {
        let mut table = Table::from_fen("3k4/8/8/8/8/8/4R3/4K2r w - - 0 1").unwrap();
        // The king is in check from h1; moving the e2 rook elsewhere does not help.
        assert!(table.is_check());
        assert_eq!(table.propose_move(mv("e2e5")), Err(IllegalMove::LeavesKingInCheck));

        let mut pinned = Table::from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let before = pinned.clone();
        assert_eq!(pinned.propose_move(mv("e2d3")), Err(IllegalMove::LeavesKingInCheck));
        assert_eq!(pinned, before);
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut table = Table::from_fen("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
        assert_eq!(table.propose_move(mv("e1d1")), Err(IllegalMove::LeavesKingInCheck));
        assert!(table.propose_move(mv("e1e2")).is_ok());
        assert_eq!(table.king_square(Color::White), sq("e2"));
    }

    #[test]
    fn test_kingside_castling_moves_rook_and_revokes_rights() {
        let mut table = Table::new();
        play(&mut table, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
        let applied = table.propose_move(mv("e1g1")).unwrap();

        assert_eq!(applied.kind, MoveKind::Castle(CastleSide::KingSide));
        assert_eq!(table.piece_at(sq("g1")), Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(table.piece_at(sq("f1")), Some(Piece::new(Color::White, PieceKind::Rook)));
        assert_eq!(table.piece_at(sq("h1")), None);
        assert_eq!(table.king_square(Color::White), sq("g1"));
        assert!(!table.castling().has(Color::White, CastleSide::KingSide));
        assert!(!table.castling().has(Color::White, CastleSide::QueenSide));
        assert!(table.castling().has(Color::Black, CastleSide::KingSide));
    }

    #[test]
    fn test_queenside_castling() {
        let mut table = Table::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        let applied = table.propose_move(mv("e8c8")).unwrap();
        assert_eq!(applied.kind, MoveKind::Castle(CastleSide::QueenSide));
        assert_eq!(table.piece_at(sq("d8")), Some(Piece::new(Color::Black, PieceKind::Rook)));
        assert_eq!(table.piece_at(sq("c8")), Some(Piece::new(Color::Black, PieceKind::King)));
        assert_eq!(table.to_fen(), "2kr3r/8/8/8/8/8/8/R3K2R w KQ - 1 2");
    }

    #[test]
    fn test_castling_refused_through_or_out_of_check() {
        // f1 is covered by the bishop on c4.
        let mut through = Table::from_fen("4k3/8/8/8/2b5/8/8/4K2R w K - 0 1").unwrap();
        assert_eq!(through.propose_move(mv("e1g1")), Err(IllegalMove::CastlingNotAllowed));

        // King in check from e8 rook.
        let mut in_check = Table::from_fen("4r1k1/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        assert_eq!(in_check.propose_move(mv("e1g1")), Err(IllegalMove::CastlingNotAllowed));

        // Queenside: b1 attacked is fine, only the king's path matters.
        let mut b_file = Table::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(b_file.propose_move(mv("e1c1")).is_ok());

        // Blocked by a knight.
        let mut blocked = Table::from_fen("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1").unwrap();
        assert_eq!(blocked.propose_move(mv("e1c1")), Err(IllegalMove::CastlingNotAllowed));
    }

    #[test]
    fn test_rook_move_and_capture_revoke_rights() {
        let mut table = Table::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut table, &["h1h8"]);
        let rights = table.castling();
        assert!(!rights.has(Color::White, CastleSide::KingSide));
        assert!(rights.has(Color::White, CastleSide::QueenSide));
        assert!(!rights.has(Color::Black, CastleSide::KingSide));
        assert!(rights.has(Color::Black, CastleSide::QueenSide));

        // Returning a rook to its corner never restores the right.
        play(&mut table, &["e8d7", "h8h1", "d7e8"]);
        assert!(!table.castling().has(Color::White, CastleSide::KingSide));
        assert_eq!(table.to_fen(), "r3k3/8/8/8/8/8/8/R3K2R w Q - 3 3");
    }

    #[test]
    fn test_en_passant_capture() {
        let mut table = Table::new();
        play(&mut table, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert!(table.en_passant().is_eligible(Color::Black, 3));

        let applied = table.propose_move(mv("e5d6")).unwrap();
        assert_eq!(applied.kind, MoveKind::EnPassant);
        assert_eq!(applied.captured, Some(PieceKind::Pawn));
        assert_eq!(table.piece_at(sq("d5")), None);
        assert_eq!(table.piece_at(sq("d6")), Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert_eq!(table.halfmove_clock(), 0);
    }

    #[test]
    fn test_en_passant_expires_after_one_move() {
        let mut table = Table::new();
        play(&mut table, &["e2e4"]);
        assert!(table.en_passant().is_eligible(Color::White, 4));
        play(&mut table, &["g8f6"]);
        assert!(!table.en_passant().is_eligible(Color::White, 4));

        // A delayed en-passant attempt is refused.
        let mut late = Table::new();
        play(&mut late, &["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"]);
        assert_eq!(late.propose_move(mv("e5d6")), Err(IllegalMove::Unreachable));
    }

    #[test]
    fn test_en_passant_that_exposes_king_is_refused() {
        // Capturing would remove both pawns from the fifth rank and open the rook's line.
        let mut table = Table::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").unwrap();
        assert_eq!(table.propose_move(mv("e5d6")), Err(IllegalMove::LeavesKingInCheck));
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut table = Table::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let applied = table.propose_move(mv("a7a8")).unwrap();
        assert_eq!(applied.kind, MoveKind::Promotion);
        assert_eq!(applied.mv.promotion, Some(PieceKind::Queen));
        assert_eq!(table.piece_at(sq("a8")), Some(Piece::new(Color::White, PieceKind::Queen)));
    }

    #[test]
    fn test_promotion_to_requested_piece() {
        for (suffix, kind) in [("n", PieceKind::Knight), ("b", PieceKind::Bishop), ("r", PieceKind::Rook)] {
            let mut table = Table::from_fen("8/7k/8/8/8/8/p7/4K3 b - - 0 1").unwrap();
            table.propose_move(mv(&format!("a2a1{suffix}"))).unwrap();
            assert_eq!(table.piece_at(sq("a1")), Some(Piece::new(Color::Black, kind)));
        }
    }

    #[test]
    fn test_configured_default_promotion() {
        let mut table = Table::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1")
            .unwrap()
            .with_default_promotion(PieceKind::Knight);
        let mut king_promo = mv("a7a8");
        king_promo.promotion = Some(PieceKind::King);
        table.propose_move(king_promo).unwrap();
        assert_eq!(table.piece_at(sq("a8")), Some(Piece::new(Color::White, PieceKind::Knight)));
    }

    #[test]
    fn test_promotion_suffix_ignored_on_normal_move() {
        let mut table = Table::new();
        let applied = table.propose_move(mv("e2e4q")).unwrap();
        assert_eq!(applied.mv.promotion, None);
        assert_eq!(table.piece_at(sq("e4")), Some(Piece::new(Color::White, PieceKind::Pawn)));
    }

    #[test]
    fn test_fools_mate_is_checkmate() {
        let mut table = Table::new();
        play(&mut table, &["f2f3", "e7e5", "g2g4"]);
        let applied = table.propose_move(mv("d8h4")).unwrap();
        assert!(applied.check);
        assert_eq!(applied.termination, Some(Termination::Checkmate { winner: Color::Black }));
        assert!(table.is_concluded());
        assert_eq!(table.propose_move(mv("a2a3")), Err(IllegalMove::GameOver));
    }

    #[test]
    fn test_stalemate_detected() {
        let mut table = Table::from_fen("7k/8/8/6Q1/8/8/8/K7 w - - 0 1").unwrap();
        let applied = table.propose_move(mv("g5g6")).unwrap();
        assert!(!applied.check);
        assert_eq!(applied.termination, Some(Termination::Stalemate));
    }

    #[test]
    fn test_fifty_move_counter() {
        let mut table = Table::from_fen("4k3/8/8/8/8/8/4P3/R3K3 w - - 0 1").unwrap();
        let shuffle = ["a1a2", "e8d8", "a2a1", "d8e8"];
        for i in 0..100 {
            let applied = table.propose_move(mv(shuffle[i % 4])).unwrap();
            assert_eq!(applied.draw.fifty_move, i == 99, "ply {}", i + 1);
        }
        assert!(table.fifty_move_draw_available());
        assert_eq!(table.halfmove_clock(), 100);

        // A pawn move resets the count from that ply.
        table.propose_move(mv("e2e3")).unwrap();
        assert_eq!(table.halfmove_clock(), 0);
        assert_eq!(table.draw_counters().pawn_move, i64::from(table.ply()));
        assert!(!table.fifty_move_draw_available());
    }

    #[test]
    fn test_capture_resets_counter() {
        let mut table = Table::from_fen("4k3/8/8/8/8/8/r7/R3K3 w - - 30 40").unwrap();
        assert_eq!(table.halfmove_clock(), 30);
        let applied = table.propose_move(mv("a1a2")).unwrap();
        assert_eq!(applied.captured, Some(PieceKind::Rook));
        assert_eq!(table.halfmove_clock(), 0);
        assert_eq!(table.draw_counters().last_capture, i64::from(table.ply()));
    }

    #[test]
    fn test_insufficient_material() {
        assert!(Table::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap().insufficient_material());
        assert!(Table::from_fen("8/8/8/4k3/8/8/8/3NK3 w - - 0 1").unwrap().insufficient_material());
        // Bishops on c1 (dark) and f8 (dark).
        assert!(Table::from_fen("5b2/8/8/4k3/8/8/8/2B1K3 w - - 0 1").unwrap().insufficient_material());
        // Bishops on opposite colors can still mate in theory.
        assert!(!Table::from_fen("2b5/8/8/4k3/8/8/8/2B1K3 w - - 0 1").unwrap().insufficient_material());
        assert!(!Table::new().insufficient_material());
    }

    #[test]
    fn test_king_location_tracks_moves() {
        let mut table = Table::new();
        play(&mut table, &["e2e4", "e7e5", "e1e2", "e8e7"]);
        assert_eq!(table.king_square(Color::White), sq("e2"));
        assert_eq!(table.king_square(Color::Black), sq("e7"));
        assert!(table.castling().white_king_moved);
        assert!(table.castling().black_king_moved);
        assert!(table.verify_invariants().is_ok());
    }

    #[test]
    fn test_verify_invariants_detects_corruption() {
        let mut table = Table::new();
        table.board.take(sq("e8"));
        assert_eq!(
            table.verify_invariants(),
            Err(InvariantViolation::KingCount {
                color: Color::Black,
                count: 0
            })
        );
    }

    #[test]
    fn test_conclude_blocks_moves() {
        let mut table = Table::new();
        table.conclude();
        assert_eq!(table.propose_move(mv("e2e4")), Err(IllegalMove::GameOver));
        assert!(table.legal_moves().is_empty());
    }

    #[test]
    fn test_illegal_move_hides_reason() {
        assert_eq!(IllegalMove::LeavesKingInCheck.to_string(), "illegal move");
        assert_eq!(IllegalMove::NotYourTurn.to_string(), "illegal move");
    }
}
