//! Bitboard set of squares
//!
//! A bitboard is a 64-bit integer with one bit per square (a1 = bit 0,
//! h8 = bit 63). Piece placement, attack sets and masks are all bitboards.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use super::types::Square;

/// A set of squares packed into a `u64`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(!0);

    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);
    pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00FF);
    pub const RANK_8: Bitboard = Bitboard(0xFF00_0000_0000_0000);

    /// Promotion ranks for both colors
    pub const BACK_RANKS: Bitboard = Bitboard(Self::RANK_1.0 | Self::RANK_8.0);

    pub const LIGHT_SQUARES: Bitboard = Bitboard(0x55AA_55AA_55AA_55AA);
    pub const DARK_SQUARES: Bitboard = Bitboard(0xAA55_AA55_AA55_AA55);

    #[inline]
    pub const fn square(sq: Square) -> Self {
        Bitboard(1u64 << sq.0)
    }

    #[inline]
    pub const fn file(file: u8) -> Self {
        Bitboard(Self::FILE_A.0 << file)
    }

    #[inline]
    pub const fn rank(rank: u8) -> Self {
        Bitboard(Self::RANK_1.0 << (rank * 8))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn has(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.0) != 0
    }

    /// Lowest square in the set. Meaningless on an empty set.
    #[inline]
    pub const fn lsb(self) -> Square {
        Square(self.0.trailing_zeros() as u8)
    }

    /// Highest square in the set. Meaningless on an empty set.
    #[inline]
    pub const fn msb(self) -> Square {
        Square(63 - self.0.leading_zeros() as u8)
    }

    /// The single square of a one-element set
    #[inline]
    pub fn single(self) -> Option<Square> {
        (self.count() == 1).then(|| self.lsb())
    }

    #[inline]
    pub const fn with(self, sq: Square) -> Self {
        Bitboard(self.0 | (1u64 << sq.0))
    }

    #[inline]
    pub const fn without(self, sq: Square) -> Self {
        Bitboard(self.0 & !(1u64 << sq.0))
    }

    #[inline]
    pub const fn north(self) -> Self {
        Bitboard(self.0 << 8)
    }

    #[inline]
    pub const fn south(self) -> Self {
        Bitboard(self.0 >> 8)
    }

    #[inline]
    pub const fn east(self) -> Self {
        Bitboard((self.0 << 1) & !Self::FILE_A.0)
    }

    #[inline]
    pub const fn west(self) -> Self {
        Bitboard((self.0 >> 1) & !Self::FILE_H.0)
    }

    pub fn iter(self) -> Squares {
        Squares(self.0)
    }
}

/// Ascending iterator over the squares of a bitboard
pub struct Squares(u64);

impl Iterator for Squares {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let sq = Square(self.0.trailing_zeros() as u8);
        self.0 &= self.0 - 1;
        Some(sq)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Squares {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Squares;

    fn into_iter(self) -> Squares {
        self.iter()
    }
}

macro_rules! bit_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn $method(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $op rhs.0)
            }
        }

        impl $assign_trait for Bitboard {
            #[inline]
            fn $assign_method(&mut self, rhs: Bitboard) {
                self.0 = self.0 $op rhs.0;
            }
        }
    };
}

bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for rank in (0..8).rev() {
            write!(f, "  {} ", rank + 1)?;
            for file in 0..8 {
                let mark = if self.has(Square::from_file_rank(file, rank)) { 'X' } else { '.' };
                write!(f, "{} ", mark)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "    a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifts_do_not_wrap() {
        let h1 = Bitboard::square(Square::H1);
        assert!(h1.east().is_empty());
        let a1 = Bitboard::square(Square::A1);
        assert!(a1.west().is_empty());
        assert_eq!(a1.north(), Bitboard::square(Square::from_file_rank(0, 1)));
        assert!(Bitboard::square(Square::A8).north().is_empty());
    }

    #[test]
    fn test_iter_is_ascending() {
        let bb = Bitboard(0b1001_0100);
        let squares: Vec<u8> = bb.iter().map(|sq| sq.0).collect();
        assert_eq!(squares, vec![2, 4, 7]);
    }

    #[test]
    fn test_lsb_msb_single() {
        let bb = Bitboard::square(Square::C1).with(Square::F8);
        assert_eq!(bb.lsb(), Square::C1);
        assert_eq!(bb.msb(), Square::F8);
        assert_eq!(bb.single(), None);
        assert_eq!(bb.without(Square::F8).single(), Some(Square::C1));
    }

    #[test]
    fn test_masks() {
        assert_eq!(Bitboard::file(0), Bitboard::FILE_A);
        assert_eq!(Bitboard::rank(7), Bitboard::RANK_8);
        assert_eq!(Bitboard::LIGHT_SQUARES | Bitboard::DARK_SQUARES, Bitboard::FULL);
        assert!(Bitboard::DARK_SQUARES.has(Square::A1));
    }
}
