//! Static evaluation
//!
//! Material plus piece-square tables. Pawns and the king blend from their
//! middlegame to their endgame tables as pieces come off. Scores are centipawns from
//! the side to move's point of view.

use std::fmt;
use std::str::FromStr;

use crate::core::board::Board;
use crate::core::types::{Color, PieceType, Square};

/// Which terms the evaluation includes
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Evaluation {
    /// Material and piece-square tables
    #[default]
    Mixed,
    Material,
    Position,
    /// Always zero; search then only sees mates and draws
    None,
}

impl Evaluation {
    pub const fn name(self) -> &'static str {
        match self {
            Evaluation::Mixed => "mixed",
            Evaluation::Material => "material",
            Evaluation::Position => "position",
            Evaluation::None => "none",
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Evaluation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mixed" | "matpos" | "mat_pos" => Ok(Evaluation::Mixed),
            "material" => Ok(Evaluation::Material),
            "position" => Ok(Evaluation::Position),
            "none" => Ok(Evaluation::None),
            other => Err(format!("unknown evaluation '{}'", other)),
        }
    }
}

// Tables are written from white's side with rank 8 on the first row, so a
// white piece on `sq` reads `TABLE[sq.flip()]` and a black piece `TABLE[sq]`.

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     20,  20,  20,  20,  20,  20,  20,  20,
     20,  20,  20,  20,  20,  20,  20,  20,
     20,  20,  20,  20,  20,  20,  20,  20,
     20,  20,  20,  20,  20,  20,  20,  20,
     20,  20,  20,  20,  20,  20,  20,  20,
     20,  20,  20,  20,  20,  20,  20,  20,
     10,  10,  10,  10,  10,  10,  10,  10,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_ENDGAME_TABLE: [i32; 64] = [
    100, 100, 100, 100, 100, 100, 100, 100,
     80,  80,  80,  80,  80,  80,  80,  80,
     60,  60,  60,  60,  60,  60,  60,  60,
     40,  40,  40,  40,  40,  40,  40,  40,
     20,  20,  20,  20,  20,  20,  20,  20,
     10,  10,  10,  10,  10,  10,  10,  10,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
      0,   0,   0,  10,  10,   0,   0,   0,
      0,  10,  20,  30,  30,  20,  10,   0,
      0,  20,  40,  45,  45,  40,  20,   0,
     10,  30,  45,  50,  50,  45,  30,  10,
     10,  30,  45,  50,  50,  45,  30,  10,
      0,  20,  40,  45,  45,  40,  20,   0,
      0,  10,  20,  30,  30,  20,  10,   0,
      0,   0,   0,  10,  10,   0,   0,   0,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
     50,  40,  30,  20,  20,  30,  40,  50,
     40,  30,  25,  20,  20,  25,  30,  40,
     30,  25,  20,  15,  15,  20,  25,  30,
     20,  20,  15,  10,  10,  15,  20,  20,
     20,  20,  15,  10,  10,  15,  20,  20,
     30,  25,  20,  15,  15,  20,  25,  30,
     40,  30,  25,  20,  20,  25,  30,  40,
     50,  40,  30,  20,  20,  30,  40,  50,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     30,  30,  30,  30,  30,  30,  30,  30,
     30,  30,  30,  30,  30,  30,  30,  30,
     10,   0,   0,   0,   0,   0,   0,  10,
     10,   0,   0,   0,   0,   0,   0,  10,
     10,   0,   0,   0,   0,   0,   0,  10,
     10,   0,   0,   0,   0,   0,   0,  10,
     30,  30,  30,  30,  30,  30,  30,  30,
     30,  30,  30,  30,  30,  30,  30,  30,
];

#[rustfmt::skip]
const KING_TABLE: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
     10,  10,  10,  10,  10,  10,  10,  10,
];

#[rustfmt::skip]
const KING_ENDGAME_TABLE: [i32; 64] = [
      0,   0,   0,  10,  10,   0,   0,   0,
      0,  10,  20,  30,  30,  20,  10,   0,
      0,  20,  40,  45,  45,  40,  20,   0,
     10,  30,  45,  50,  50,  45,  30,  10,
     10,  30,  45,  50,  50,  45,  30,  10,
      0,  20,  40,  45,  45,  40,  20,   0,
      0,  10,  20,  30,  30,  20,  10,   0,
      0,   0,   0,  10,  10,   0,   0,   0,
];

/// Game phase weight of each piece kind; 24 with all pieces on the board
const PHASE_WEIGHTS: [i32; 6] = [0, 1, 1, 2, 4, 0];
pub const PHASE_MAX: i32 = 24;

/// Remaining non-pawn material, from `PHASE_MAX` (opening) down to 0 (bare
/// kings and pawns). Promotions are clamped to `PHASE_MAX`.
pub fn phase(board: &Board) -> i32 {
    let phase: i32 = PieceType::ALL
        .iter()
        .map(|&kind| board.pieces(kind).count() as i32 * PHASE_WEIGHTS[kind.index()])
        .sum();
    phase.min(PHASE_MAX)
}

/// Middlegame and endgame tables; pieces without an endgame table use the
/// same one for both
fn tables(kind: PieceType) -> Option<(&'static [i32; 64], &'static [i32; 64])> {
    match kind {
        PieceType::Pawn => Some((&PAWN_TABLE, &PAWN_ENDGAME_TABLE)),
        PieceType::Knight => Some((&KNIGHT_TABLE, &KNIGHT_TABLE)),
        PieceType::Bishop => Some((&BISHOP_TABLE, &BISHOP_TABLE)),
        PieceType::Rook => Some((&ROOK_TABLE, &ROOK_TABLE)),
        PieceType::Queen => None,
        PieceType::King => Some((&KING_TABLE, &KING_ENDGAME_TABLE)),
    }
}

#[inline]
fn table_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.flip().index(),
        Color::Black => sq.index(),
    }
}

/// Material balance from white's point of view
pub fn material(board: &Board) -> i32 {
    PieceType::ALL
        .iter()
        .map(|&kind| {
            let diff = board.pieces_of(kind, Color::White).count() as i32
                - board.pieces_of(kind, Color::Black).count() as i32;
            diff * kind.value()
        })
        .sum()
}

/// Piece-square balance from white's point of view.
///
/// Middlegame and endgame values are blended by `phase`, so a capture shifts
/// the pawn and king terms by far less than the material it removed.
pub fn position(board: &Board) -> i32 {
    let phase = phase(board);
    let mut middlegame = 0;
    let mut endgame = 0;
    for kind in PieceType::ALL {
        let Some((mg_table, eg_table)) = tables(kind) else {
            continue;
        };
        for color in Color::BOTH {
            let sign = if color == Color::White { 1 } else { -1 };
            for sq in board.pieces_of(kind, color).iter() {
                let idx = table_index(color, sq);
                middlegame += sign * mg_table[idx];
                endgame += sign * eg_table[idx];
            }
        }
    }
    (middlegame * phase + endgame * (PHASE_MAX - phase)) / PHASE_MAX
}

/// Evaluate `board` from the side to move's perspective
pub fn evaluate(board: &Board, mode: Evaluation) -> i32 {
    let white = match mode {
        Evaluation::Mixed => material(board) + position(board),
        Evaluation::Material => material(board),
        Evaluation::Position => position(board),
        Evaluation::None => 0,
    };
    match board.side_to_move() {
        Color::White => white,
        Color::Black => -white,
    }
}
