//! Principal variation reconstruction and score formatting.

use crate::core::board::Board;
use crate::core::moves::Move;
use crate::engine::movegen::MoveGen;
use crate::engine::tt::TranspositionTable;

use super::types::{MATE_BOUND, MATE_SCORE};

/// Follow best moves stored in `tt` from `board`, checking each for legality.
/// The board is restored before returning.
pub(super) fn get_pv_from_tt(tt: &TranspositionTable, board: &mut Board, max_plies: usize) -> Vec<Move> {
    let mut pv = Vec::with_capacity(max_plies);
    for _ in 0..max_plies {
        let Some(mv) = tt.probe(board.hash()).and_then(|e| e.best_move) else {
            break;
        };
        if !MoveGen::is_legal(board, mv) {
            break;
        }
        board.apply(mv);
        pv.push(mv);
        if board.repetition_count() >= 2 {
            break;
        }
    }
    for _ in 0..pv.len() {
        board.unapply();
    }
    pv
}

pub(super) fn format_score(score: i32) -> String {
    if score.abs() >= MATE_BOUND {
        let mate_in = if score > 0 {
            (MATE_SCORE - score + 1) / 2
        } else {
            -(MATE_SCORE + score) / 2
        };
        format!("mate {}", mate_in)
    } else {
        format!("cp {}", score)
    }
}

/// Mate scores are stored relative to the node so they stay valid when the
/// same position is reached at another ply
pub(super) fn score_to_tt(score: i32, ply: usize) -> i16 {
    let ply = ply as i32;
    let adjusted = if score >= MATE_BOUND {
        score + ply
    } else if score <= -MATE_BOUND {
        score - ply
    } else {
        score
    };
    adjusted as i16
}

pub(super) fn score_from_tt(score: i16, ply: usize) -> i32 {
    let score = score as i32;
    let ply = ply as i32;
    if score >= MATE_BOUND {
        score - ply
    } else if score <= -MATE_BOUND {
        score + ply
    } else {
        score
    }
}
