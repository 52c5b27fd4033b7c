//! Parallel root splitting.
//!
//! Root moves are dealt round-robin to the helper workers, each searching its
//! share with a full window on its own board copy. Merging keeps the earliest
//! root move among equal scores, so the result matches a sequential search of
//! the same depth.

use rayon::prelude::*;

use crate::core::board::Board;
use crate::core::moves::Move;

use super::searcher::{RootIteration, Searcher};
use super::types::INFINITY;

impl Searcher {
    pub(super) fn search_root_parallel(&mut self, board: &Board, depth: i32, moves: &[Move]) -> RootIteration {
        let Searcher { helpers, pool, .. } = self;
        let stride = helpers.len();

        let mut run = || {
            helpers
                .par_iter_mut()
                .enumerate()
                .map(|(w, worker)| {
                    let mut board = board.clone();
                    let mut scores = Vec::new();
                    let mut finished = true;
                    for index in (w..moves.len()).step_by(stride) {
                        board.apply(moves[index]);
                        let score = -worker.alpha_beta(&mut board, depth - 1, -INFINITY, INFINITY, 1);
                        board.unapply();
                        if worker.aborted {
                            finished = false;
                            break;
                        }
                        scores.push((index, score));
                    }
                    (scores, finished)
                })
                .collect::<Vec<_>>()
        };
        let per_worker = match pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let complete = per_worker.iter().all(|(_, finished)| *finished);
        let mut scores: Vec<(usize, i32)> = per_worker.into_iter().flat_map(|(s, _)| s).collect();
        scores.sort_by_key(|&(index, _)| index);

        let mut iteration = RootIteration { best: None, first: None, complete, worker: 0 };
        for (index, score) in scores {
            if index == 0 {
                iteration.first = Some(score);
            }
            if iteration.best.is_none_or(|(_, best)| score > best) {
                iteration.best = Some((index, score));
                iteration.worker = index % stride;
            }
        }
        iteration
    }
}
