//! Move representation
//!
//! A move records its origin, destination, optional promotion piece and a
//! small flag set describing its side effects. Moves are only meaningful
//! against the position they were generated for.

use super::types::{PieceType, Square};
use std::fmt;

/// Side-effect flags of a move
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const QUIET: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1);
    pub const CASTLE: MoveFlags = MoveFlags(2);
    pub const EN_PASSANT: MoveFlags = MoveFlags(4);
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(8);

    #[inline]
    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: MoveFlags) -> MoveFlags {
        MoveFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for MoveFlags {
    type Output = MoveFlags;
    fn bitor(self, rhs: MoveFlags) -> MoveFlags {
        self.union(rhs)
    }
}

/// A chess move
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<PieceType>,
    flags: MoveFlags,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square, flags: MoveFlags) -> Self {
        Move { from, to, promotion: None, flags }
    }

    #[inline]
    pub const fn promotion(from: Square, to: Square, piece: PieceType, capture: bool) -> Self {
        let flags = if capture { MoveFlags::CAPTURE } else { MoveFlags::QUIET };
        Move { from, to, promotion: Some(piece), flags }
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn promotion_piece(self) -> Option<PieceType> {
        self.promotion
    }

    #[inline]
    pub const fn flags(self) -> MoveFlags {
        self.flags
    }

    /// En passant counts as a capture
    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE) || self.flags.contains(MoveFlags::EN_PASSANT)
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion.is_some()
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.flags.contains(MoveFlags::CASTLE)
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PUSH)
    }

    /// Captures and promotions
    #[inline]
    pub const fn is_tactical(self) -> bool {
        self.is_capture() || self.is_promotion()
    }

    /// Long algebraic notation (`e2e4`, `e7e8q`)
    pub fn to_uci(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

const MAX_MOVES: usize = 256;

/// Fixed-capacity move list kept on the stack
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub fn new() -> Self {
        MoveList { moves: [Move::default(); MAX_MOVES], len: 0 }
    }

    /// No legal position has more than 218 moves
    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        if self.len < MAX_MOVES {
            self.moves[self.len] = mv;
            self.len += 1;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.as_slice().contains(mv)
    }

    /// Keep only the moves matching `keep`, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(&Move) -> bool) {
        let mut write = 0;
        for read in 0..self.len {
            let mv = self.moves[read];
            if keep(&mv) {
                self.moves[write] = mv;
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;
    fn index(&self, index: usize) -> &Move {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
