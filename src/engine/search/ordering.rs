//! Move ordering: killer moves, history heuristic, MVV-LVA.

use crate::core::board::Board;
use crate::core::moves::{Move, MoveList};
use crate::core::types::PieceType;

use super::types::MAX_PLY;

#[derive(Clone)]
pub(super) struct KillerMoves {
    moves: Vec<[Option<Move>; 2]>,
}

impl KillerMoves {
    pub(super) fn new() -> Self {
        KillerMoves { moves: vec![[None, None]; MAX_PLY] }
    }

    pub(super) fn add(&mut self, mv: Move, ply: usize) {
        if ply < MAX_PLY && self.moves[ply][0] != Some(mv) {
            self.moves[ply][1] = self.moves[ply][0];
            self.moves[ply][0] = Some(mv);
        }
    }

    /// 0 for the newest killer, 1 for the older one
    pub(super) fn slot(&self, mv: Move, ply: usize) -> Option<usize> {
        if ply >= MAX_PLY {
            return None;
        }
        self.moves[ply].iter().position(|k| *k == Some(mv))
    }

    pub(super) fn clear(&mut self) {
        self.moves.fill([None, None]);
    }
}

#[derive(Clone)]
pub(super) struct HistoryTable {
    table: Box<[[i32; 64]; 64]>,
}

const HISTORY_MAX: i32 = 80_000;

impl HistoryTable {
    pub(super) fn new() -> Self {
        HistoryTable { table: Box::new([[0; 64]; 64]) }
    }

    pub(super) fn add(&mut self, mv: Move, depth: i32) {
        let cell = &mut self.table[mv.from().index()][mv.to().index()];
        *cell = (*cell + depth * depth).min(HISTORY_MAX);
    }

    pub(super) fn get(&self, mv: Move) -> i32 {
        self.table[mv.from().index()][mv.to().index()]
    }

    /// Halve every counter so older searches weigh less
    pub(super) fn age(&mut self) {
        for row in self.table.iter_mut() {
            for cell in row.iter_mut() {
                *cell /= 2;
            }
        }
    }

    pub(super) fn clear(&mut self) {
        self.table = Box::new([[0; 64]; 64]);
    }
}

const TT_MOVE: i32 = 1_000_000;
const PROMOTION: i32 = 200_000;
const CAPTURE: i32 = 100_000;
const KILLER: [i32; 2] = [90_000, 85_000];

/// Sort `moves` best-first. The sort is stable, so equally scored moves keep
/// generation order.
pub(super) fn order_moves(
    board: &Board,
    moves: &MoveList,
    tt_move: Option<Move>,
    ply: usize,
    killers: &KillerMoves,
    history: &HistoryTable,
) -> Vec<Move> {
    let mut scored: Vec<(Move, i32)> = moves
        .iter()
        .map(|&mv| {
            let score = if tt_move == Some(mv) {
                TT_MOVE
            } else if let Some(piece) = mv.promotion_piece() {
                PROMOTION + piece.value() + mvv_lva(board, mv)
            } else if mv.is_capture() {
                CAPTURE + mvv_lva(board, mv)
            } else if let Some(slot) = killers.slot(mv, ply) {
                KILLER[slot]
            } else {
                history.get(mv)
            };
            (mv, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(mv, _)| mv).collect()
}

/// Captures ordered by victim value, then cheapest attacker
pub(super) fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        PieceType::Pawn.value()
    } else {
        match board.piece_at(mv.to()) {
            Some(p) => p.kind.value(),
            None => return 0,
        }
    };
    let attacker = board.piece_at(mv.from()).map_or(0, |p| attacker_value(p.kind));
    victim * 10 - attacker
}

fn attacker_value(kind: PieceType) -> i32 {
    match kind {
        PieceType::King => 20_000,
        other => other.value(),
    }
}
