//! Chess board representation
//!
//! The board keeps bitboards per piece type and color plus a mailbox for
//! square lookups. `apply` pushes an undo record and `unapply` pops it, so
//! search can walk the tree on one board without copying it per node. The
//! undo stack doubles as the game's repetition history.

use super::bitboard::Bitboard;
use super::moves::Move;
use super::types::{CastlingRights, Color, Piece, PieceType, Square};
use super::zobrist::ZobristKeys;
use crate::engine::attacks;
use std::fmt;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Halfmove clock value at which the fifty-move rule applies
pub const FIFTY_MOVE_LIMIT: u32 = 100;

/// Everything `apply` overwrites, so `unapply` can restore it exactly
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Undo {
    mv: Move,
    captured: Option<(Piece, Square)>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
}

/// The chess board state
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) pieces: [Bitboard; 6],
    pub(crate) colors: [Bitboard; 2],
    pub(crate) squares: [Option<Piece>; 64],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) hash: u64,
    undo: Vec<Undo>,
}

impl Board {
    /// Board with no pieces, white to move
    pub fn empty() -> Self {
        Board {
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
            squares: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            undo: Vec::with_capacity(256),
        }
    }

    /// The standard starting position
    pub fn startpos() -> Self {
        let mut board = Board::empty();
        let back = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (file, kind) in back.into_iter().enumerate() {
            let file = file as u8;
            board.put(Piece::new(kind, Color::White), Square::from_file_rank(file, 0));
            board.put(Piece::new(PieceType::Pawn, Color::White), Square::from_file_rank(file, 1));
            board.put(Piece::new(PieceType::Pawn, Color::Black), Square::from_file_rank(file, 6));
            board.put(Piece::new(kind, Color::Black), Square::from_file_rank(file, 7));
        }
        board.castling = CastlingRights::ALL;
        board.hash = board.compute_hash();
        board
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn pieces(&self, kind: PieceType) -> Bitboard {
        self.pieces[kind.index()]
    }

    #[inline]
    pub fn color(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn pieces_of(&self, kind: PieceType, color: Color) -> Bitboard {
        self.pieces[kind.index()] & self.colors[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// King square of `color`. Positions always hold exactly one king per side.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces_of(PieceType::King, color).lsb()
    }

    /// Pieces of `by` attacking `sq` given an occupancy, ignoring pieces in `removed`
    pub fn attackers_with(
        &self,
        sq: Square,
        by: Color,
        occupied: Bitboard,
        removed: Bitboard,
    ) -> Bitboard {
        let them = self.color(by) & !removed;
        let diagonal = self.pieces(PieceType::Bishop) | self.pieces(PieceType::Queen);
        let straight = self.pieces(PieceType::Rook) | self.pieces(PieceType::Queen);

        ((attacks::pawn(!by, sq) & self.pieces(PieceType::Pawn))
            | (attacks::knight(sq) & self.pieces(PieceType::Knight))
            | (attacks::king(sq) & self.pieces(PieceType::King))
            | (attacks::bishop(sq, occupied) & diagonal)
            | (attacks::rook(sq, occupied) & straight))
            & them
    }

    /// Pieces of `by` attacking `sq` in the current position
    #[inline]
    pub fn attackers_to(&self, sq: Square, by: Color) -> Bitboard {
        self.attackers_with(sq, by, self.occupied(), Bitboard::EMPTY)
    }

    #[inline]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers_to(sq, by).any()
    }

    /// True iff `color`'s king is attacked
    #[inline]
    pub fn in_check(&self, color: Color) -> bool {
        self.is_attacked(self.king_square(color), !color)
    }

    // ------------------------------------------------------------------
    // Draw rules
    // ------------------------------------------------------------------

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_LIMIT
    }

    /// How many times the current position has occurred, this one included.
    /// Only positions since the last capture or pawn move can repeat.
    pub fn repetition_count(&self) -> usize {
        let reach = (self.halfmove_clock as usize).min(self.undo.len());
        1 + (2..=reach)
            .step_by(2)
            .filter(|&back| self.undo[self.undo.len() - back].hash == self.hash)
            .count()
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Neither side can ever deliver mate
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.pieces(PieceType::Pawn)
            | self.pieces(PieceType::Rook)
            | self.pieces(PieceType::Queen);
        if heavy.any() {
            return false;
        }
        let knights = self.pieces(PieceType::Knight);
        let bishops = self.pieces(PieceType::Bishop);
        if (knights | bishops).count() <= 1 {
            return true;
        }
        knights.is_empty()
            && ((bishops & Bitboard::LIGHT_SQUARES).is_empty()
                || (bishops & Bitboard::DARK_SQUARES).is_empty())
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    pub(crate) fn put(&mut self, piece: Piece, sq: Square) {
        let bb = Bitboard::square(sq);
        self.pieces[piece.kind.index()] |= bb;
        self.colors[piece.color.index()] |= bb;
        self.squares[sq.index()] = Some(piece);
        self.hash ^= ZobristKeys::get().piece(piece, sq);
    }

    pub(crate) fn take(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.squares[sq.index()]?;
        let bb = !Bitboard::square(sq);
        self.pieces[piece.kind.index()] &= bb;
        self.colors[piece.color.index()] &= bb;
        self.squares[sq.index()] = None;
        self.hash ^= ZobristKeys::get().piece(piece, sq);
        Some(piece)
    }

    /// Hash contribution of the en passant square. It only counts when the
    /// side to move actually has a pawn that could capture there.
    fn en_passant_key(&self) -> u64 {
        match self.en_passant {
            Some(ep)
                if (attacks::pawn(!self.side_to_move, ep)
                    & self.pieces_of(PieceType::Pawn, self.side_to_move))
                .any() =>
            {
                ZobristKeys::get().en_passant(ep)
            }
            _ => 0,
        }
    }

    /// Hash of the position computed from scratch
    pub fn compute_hash(&self) -> u64 {
        let keys = ZobristKeys::get();
        let mut hash = self
            .occupied()
            .iter()
            .filter_map(|sq| self.piece_at(sq).map(|p| keys.piece(p, sq)))
            .fold(0, |acc, k| acc ^ k);
        hash ^= keys.side(self.side_to_move);
        hash ^= keys.castling(self.castling);
        hash ^ self.en_passant_key()
    }

    /// Play `mv`, which must be legal in this position.
    ///
    /// Updates castling rights, en passant target, both clocks and the hash,
    /// and records an undo entry.
    pub fn apply(&mut self, mv: Move) {
        let keys = ZobristKeys::get();
        let from = mv.from();
        let to = mv.to();
        let Some(piece) = self.piece_at(from) else {
            debug_assert!(false, "no piece on {} for {}", from, mv);
            return;
        };
        let us = self.side_to_move;

        let captured_sq = if mv.is_en_passant() {
            Square::from_file_rank(to.file(), from.rank())
        } else {
            to
        };
        let captured = self.piece_at(captured_sq).map(|p| (p, captured_sq));

        self.undo.push(Undo {
            mv,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });

        self.hash ^= self.en_passant_key();

        if captured.is_some() {
            self.take(captured_sq);
        }
        self.take(from);
        let placed = match mv.promotion_piece() {
            Some(kind) => Piece::new(kind, us),
            None => piece,
        };
        self.put(placed, to);

        if mv.is_castle() {
            let rank = from.rank();
            let (rook_from, rook_to) = if to.file() > from.file() {
                (Square::from_file_rank(7, rank), Square::from_file_rank(5, rank))
            } else {
                (Square::from_file_rank(0, rank), Square::from_file_rank(3, rank))
            };
            if let Some(rook) = self.take(rook_from) {
                self.put(rook, rook_to);
            }
        }

        let old_rights = self.castling;
        self.castling
            .remove(CastlingRights::lost_at(from) | CastlingRights::lost_at(to));
        self.hash ^= keys.castling(old_rights) ^ keys.castling(self.castling);

        self.en_passant = if mv.is_double_push() {
            from.offset(0, us.forward())
        } else {
            None
        };

        if piece.kind == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = !us;
        self.hash ^= keys.side(Color::Black);
        self.hash ^= self.en_passant_key();
    }

    /// Take back the most recent `apply`, restoring every field exactly
    pub fn unapply(&mut self) -> Option<Move> {
        let undo = self.undo.pop()?;
        let mv = undo.mv;
        let us = !self.side_to_move;

        if let Some(moved) = self.take(mv.to()) {
            let original = if mv.is_promotion() {
                Piece::new(PieceType::Pawn, us)
            } else {
                moved
            };
            self.put(original, mv.from());
        }

        if mv.is_castle() {
            let rank = mv.from().rank();
            let (rook_home, rook_now) = if mv.to().file() > mv.from().file() {
                (Square::from_file_rank(7, rank), Square::from_file_rank(5, rank))
            } else {
                (Square::from_file_rank(0, rank), Square::from_file_rank(3, rank))
            };
            if let Some(rook) = self.take(rook_now) {
                self.put(rook, rook_home);
            }
        }

        if let Some((piece, sq)) = undo.captured {
            self.put(piece, sq);
        }

        self.side_to_move = us;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.hash = undo.hash;
        Some(mv)
    }

    /// Forget the undo history; the current position becomes the root
    pub fn clear_history(&mut self) {
        self.undo.clear();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for rank in (0..8).rev() {
            write!(f, "  {} ", rank + 1)?;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(piece) => write!(f, "{} ", piece.to_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "    a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "  FEN: {}", self.to_fen())?;
        write!(f, "  Key: {:016X}", self.hash)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
