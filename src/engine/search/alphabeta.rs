//! Alpha-beta search and quiescence.

use crate::core::board::Board;
use crate::engine::eval::evaluate;
use crate::engine::movegen::MoveGen;
use crate::engine::tt::TTFlag;

use super::ordering::{mvv_lva, order_moves};
use super::pv::{score_from_tt, score_to_tt};
use super::searcher::Worker;
use super::types::{DRAW_SCORE, INFINITY, MATE_SCORE, MAX_PLY};

impl Worker {
    /// Fail-soft negamax. Returns 0 once the worker has been aborted; callers
    /// must check `aborted` before trusting the value.
    pub(super) fn alpha_beta(
        &mut self,
        board: &mut Board,
        mut depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
    ) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.stats.nodes += 1;

        if ply > 0 {
            if board.repetition_count() >= 2 || board.is_insufficient_material() {
                return DRAW_SCORE;
            }

            // Mate distance pruning
            alpha = alpha.max(-MATE_SCORE + ply as i32);
            beta = beta.min(MATE_SCORE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }
        }

        if ply >= MAX_PLY {
            return evaluate(board, self.evaluation);
        }

        let in_check = board.in_check(board.side_to_move());
        if in_check {
            depth += 1;
        }
        if depth <= 0 {
            return self.quiescence(board, alpha, beta, ply);
        }

        let key = board.hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key) {
            self.stats.tt_hits += 1;
            tt_move = entry.best_move;
            if ply > 0 && entry.depth as i32 >= depth {
                let score = score_from_tt(entry.score, ply);
                let cutoff = match entry.flag {
                    TTFlag::Exact => true,
                    TTFlag::LowerBound => score >= beta,
                    TTFlag::UpperBound => score <= alpha,
                };
                if cutoff {
                    self.stats.tt_cutoffs += 1;
                    return score;
                }
            }
        }

        let moves = MoveGen::legal_moves(board);
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply as i32 } else { DRAW_SCORE };
        }
        if ply > 0 && board.is_fifty_move_draw() {
            return DRAW_SCORE;
        }

        let ordered = order_moves(board, &moves, tt_move, ply, &self.killers, &self.history);
        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;

        for mv in ordered {
            board.apply(mv);
            let score = -self.alpha_beta(board, depth - 1, -beta, -alpha, ply + 1);
            board.unapply();

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if !mv.is_tactical() {
                    self.killers.add(mv, ply);
                    self.history.add(mv, depth);
                }
                break;
            }
        }

        let flag = if best_score >= beta {
            TTFlag::LowerBound
        } else if best_score <= original_alpha {
            TTFlag::UpperBound
        } else {
            TTFlag::Exact
        };
        self.tt.store(key, best_move, depth.min(i8::MAX as i32) as i8, score_to_tt(best_score, ply), flag);

        best_score
    }

    /// Captures and promotions until the position is quiet
    pub(super) fn quiescence(&mut self, board: &mut Board, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.stats.nodes += 1;
        self.stats.qnodes += 1;

        let stand_pat = evaluate(board, self.evaluation);
        if stand_pat >= beta || ply >= MAX_PLY {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let tactical = MoveGen::tactical_moves(board);
        let mut captures: Vec<_> = tactical.iter().map(|&mv| (mv, mvv_lva(board, mv))).collect();
        captures.sort_by(|a, b| b.1.cmp(&a.1));

        let mut best_score = stand_pat;
        for (mv, _) in captures {
            board.apply(mv);
            let score = -self.quiescence(board, -beta, -alpha, ply + 1);
            board.unapply();

            if self.aborted {
                return 0;
            }
            if score > best_score {
                best_score = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        best_score
    }
}
