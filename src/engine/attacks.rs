//! Precomputed attack tables
//!
//! Leaper attacks (knight, king, pawn) are plain lookups. Sliding attacks use
//! per-direction rays: the ray from the square is cut at the first blocker by
//! xoring away the same ray seen from that blocker.

use std::sync::OnceLock;

use crate::core::bitboard::Bitboard;
use crate::core::types::{Color, Square};

/// File/rank step and whether the step increases the square index
const DIRECTIONS: [(i8, i8, bool); 8] = [
    (0, 1, true),   // north
    (1, 1, true),   // north-east
    (1, 0, true),   // east
    (-1, 1, true),  // north-west
    (0, -1, false), // south
    (-1, -1, false), // south-west
    (-1, 0, false), // west
    (1, -1, false), // south-east
];

const ROOK_DIRS: [usize; 4] = [0, 2, 4, 6];
const BISHOP_DIRS: [usize; 4] = [1, 3, 5, 7];

struct Tables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    pawn: [[Bitboard; 64]; 2],
    rays: [[Bitboard; 64]; 8],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(Tables::build)
}

impl Tables {
    fn build() -> Self {
        let mut t = Tables {
            knight: [Bitboard::EMPTY; 64],
            king: [Bitboard::EMPTY; 64],
            pawn: [[Bitboard::EMPTY; 64]; 2],
            rays: [[Bitboard::EMPTY; 64]; 8],
        };

        const KNIGHT_STEPS: [(i8, i8); 8] =
            [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];

        for i in 0..64u8 {
            let sq = Square(i);
            t.knight[sq.index()] = leaper(sq, &KNIGHT_STEPS);
            let king_steps: Vec<(i8, i8)> = DIRECTIONS.iter().map(|&(df, dr, _)| (df, dr)).collect();
            t.king[sq.index()] = leaper(sq, &king_steps);
            t.pawn[Color::White.index()][sq.index()] = leaper(sq, &[(-1, 1), (1, 1)]);
            t.pawn[Color::Black.index()][sq.index()] = leaper(sq, &[(-1, -1), (1, -1)]);

            for (dir, &(df, dr, _)) in DIRECTIONS.iter().enumerate() {
                let mut ray = Bitboard::EMPTY;
                let mut cur = sq;
                while let Some(next) = cur.offset(df, dr) {
                    ray = ray.with(next);
                    cur = next;
                }
                t.rays[dir][sq.index()] = ray;
            }
        }
        t
    }
}

fn leaper(sq: Square, steps: &[(i8, i8)]) -> Bitboard {
    steps
        .iter()
        .filter_map(|&(df, dr)| sq.offset(df, dr))
        .fold(Bitboard::EMPTY, Bitboard::with)
}

#[inline]
fn ray_attacks(t: &Tables, dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = t.rays[dir][sq.index()];
    let blockers = ray & occupied;
    if blockers.is_empty() {
        return ray;
    }
    let first = if DIRECTIONS[dir].2 { blockers.lsb() } else { blockers.msb() };
    ray ^ t.rays[dir][first.index()]
}

#[inline]
pub fn knight(sq: Square) -> Bitboard {
    tables().knight[sq.index()]
}

#[inline]
pub fn king(sq: Square) -> Bitboard {
    tables().king[sq.index()]
}

/// Squares a pawn of `color` on `sq` attacks
#[inline]
pub fn pawn(color: Color, sq: Square) -> Bitboard {
    tables().pawn[color.index()][sq.index()]
}

pub fn bishop(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = tables();
    BISHOP_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(t, dir, sq, occupied))
}

pub fn rook(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = tables();
    ROOK_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(t, dir, sq, occupied))
}

#[inline]
pub fn queen(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop(sq, occupied) | rook(sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn test_knight_attacks() {
        assert_eq!(knight(sq("e4")).count(), 8);
        assert_eq!(knight(Square::A1).count(), 2);
        assert!(knight(Square::G1).has(sq("f3")));
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(king(sq("e4")).count(), 8);
        assert_eq!(king(Square::A1).count(), 3);
    }

    #[test]
    fn test_pawn_attacks() {
        let white = pawn(Color::White, sq("e4"));
        assert!(white.has(sq("d5")) && white.has(sq("f5")));
        assert_eq!(white.count(), 2);
        assert_eq!(pawn(Color::Black, sq("a5")), Bitboard::square(sq("b4")));
    }

    #[test]
    fn test_sliders_on_empty_board() {
        assert_eq!(rook(sq("e4"), Bitboard::EMPTY).count(), 14);
        assert_eq!(bishop(sq("e4"), Bitboard::EMPTY).count(), 13);
        assert_eq!(queen(Square::A1, Bitboard::EMPTY).count(), 21);
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        let occ = Bitboard::square(sq("e6")).with(sq("c4")).with(sq("g6"));
        let r = rook(sq("e4"), occ);
        assert!(r.has(sq("e6")));
        assert!(!r.has(sq("e7")));
        assert!(r.has(sq("c4")));
        assert!(!r.has(sq("b4")));
        let b = bishop(sq("e4"), occ);
        assert!(b.has(sq("g6")));
        assert!(!b.has(sq("h7")));
        assert!(b.has(sq("a8")));
    }
}
