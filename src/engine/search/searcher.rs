//! Searcher: iterative deepening driver, time limits, and search entry point.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::board::Board;
use crate::core::moves::Move;
use crate::core::types::Color;
use crate::engine::eval::Evaluation;
use crate::engine::movegen::MoveGen;
use crate::engine::tt::TranspositionTable;
use crate::error::{EngineError, EngineResult};

use super::ordering::{HistoryTable, KillerMoves, order_moves};
use super::pv::get_pv_from_tt;
use super::types::{INFINITY, MATE_BOUND, MAX_DEPTH, SearchLimits, SearchResult, SearchStats};

/// Nodes between two looks at the clock and the stop flag
const CHECK_INTERVAL: u64 = 1024;

/// Per-thread search state
pub(super) struct Worker {
    pub(super) tt: TranspositionTable,
    pub(super) killers: KillerMoves,
    pub(super) history: HistoryTable,
    pub(super) stats: SearchStats,
    pub(super) evaluation: Evaluation,
    stop: Arc<AtomicBool>,
    deadline: Option<Instant>,
    /// Off while searching depth 1, so there is always a move to play
    can_abort: bool,
    pub(super) aborted: bool,
}

impl Worker {
    fn new(hash_mb: usize, stop: Arc<AtomicBool>, evaluation: Evaluation) -> EngineResult<Self> {
        Ok(Worker {
            tt: TranspositionTable::new(hash_mb)?,
            killers: KillerMoves::new(),
            history: HistoryTable::new(),
            stats: SearchStats::default(),
            evaluation,
            stop,
            deadline: None,
            can_abort: false,
            aborted: false,
        })
    }

    fn prepare(&mut self, deadline: Option<Instant>, evaluation: Evaluation) {
        self.tt.new_search();
        self.killers.clear();
        self.history.age();
        self.stats = SearchStats::default();
        self.evaluation = evaluation;
        self.deadline = deadline;
        self.can_abort = false;
        self.aborted = false;
    }

    pub(super) fn set_abortable(&mut self, can_abort: bool) {
        self.can_abort = can_abort;
    }

    fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }

    pub(super) fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if !self.can_abort || self.stats.nodes % CHECK_INTERVAL != 0 {
            return false;
        }
        if self.stop.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.aborted = true;
        }
        self.aborted
    }

    pub(super) fn pv_after(&self, board: &Board, first: Move, max_plies: usize) -> Vec<Move> {
        let mut board = board.clone();
        board.apply(first);
        let mut pv = vec![first];
        pv.extend(get_pv_from_tt(&self.tt, &mut board, max_plies));
        pv
    }
}

/// Scores gathered for one iteration over the root moves
pub(super) struct RootIteration {
    /// Index and score of the best fully searched move; ties keep the earlier index
    pub(super) best: Option<(usize, i32)>,
    /// Score of the first root move, if it was fully searched
    pub(super) first: Option<i32>,
    pub(super) complete: bool,
    /// Worker whose table holds the best move's line
    pub(super) worker: usize,
}

pub struct Searcher {
    pub(super) main: Worker,
    /// One worker per thread when searching in parallel
    pub(super) helpers: Vec<Worker>,
    pub(super) pool: Option<rayon::ThreadPool>,
    stop: Arc<AtomicBool>,
    hash_mb: usize,
    threads: usize,
    evaluation: Evaluation,
    start_time: Instant,
}

impl Searcher {
    pub fn new(hash_mb: usize) -> EngineResult<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        Ok(Searcher {
            main: Worker::new(hash_mb, stop.clone(), Evaluation::default())?,
            helpers: Vec::new(),
            pool: None,
            stop,
            hash_mb,
            threads: 1,
            evaluation: Evaluation::default(),
            start_time: Instant::now(),
        })
    }

    /// Flag that aborts a running search once set
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn hash_size(&self) -> usize {
        self.hash_mb
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }

    pub fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = evaluation;
    }

    /// Resize the transposition tables. On failure the old tables are kept.
    pub fn set_hash_size(&mut self, size_mb: usize) -> EngineResult<()> {
        let main = Worker::new(size_mb, self.stop.clone(), self.evaluation)?;
        let helpers = self.build_helpers(size_mb, self.threads)?;
        self.main = main;
        self.helpers = helpers;
        self.hash_mb = size_mb;
        Ok(())
    }

    /// Set the number of search threads; more than one splits root moves
    /// across a rayon pool
    pub fn set_threads(&mut self, threads: usize) -> EngineResult<()> {
        let threads = threads.max(1);
        let helpers = self.build_helpers(self.hash_mb, threads)?;
        let pool = if threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("search-{}", i))
                .build()
                .map_err(|e| EngineError::AllocationFailure(format!("search threads: {}", e)))?;
            Some(pool)
        } else {
            None
        };
        self.helpers = helpers;
        self.pool = pool;
        self.threads = threads;
        Ok(())
    }

    fn build_helpers(&self, hash_mb: usize, threads: usize) -> EngineResult<Vec<Worker>> {
        if threads <= 1 {
            return Ok(Vec::new());
        }
        let share = (hash_mb / threads).max(1);
        (0..threads)
            .map(|_| Worker::new(share, self.stop.clone(), self.evaluation))
            .collect()
    }

    pub fn clear(&mut self) {
        self.main.clear();
        for helper in &mut self.helpers {
            helper.clear();
        }
    }

    /// Milliseconds to spend on a `go` with clock information
    pub fn calculate_time(limits: &SearchLimits, side: Color) -> Option<u64> {
        if let Some(mt) = limits.movetime {
            return Some(mt);
        }
        let (time, inc) = match side {
            Color::White => (limits.wtime?, limits.winc.unwrap_or(0)),
            Color::Black => (limits.btime?, limits.binc.unwrap_or(0)),
        };
        let moves_to_go = limits.movestogo.unwrap_or(30).max(1) as u64;
        let time_for_move = time / moves_to_go + inc / 2;
        Some(time_for_move.min(time / 2).max(1))
    }

    /// Search `board` to at most `max_depth` plies or `time_limit_ms`
    /// milliseconds, whichever comes first.
    ///
    /// The board is not modified. Depth 1 always completes, so a legal move
    /// is returned whenever one exists.
    pub fn search(&mut self, board: &Board, max_depth: i64, time_limit_ms: i64) -> EngineResult<SearchResult> {
        if max_depth <= 0 || time_limit_ms <= 0 {
            return Err(EngineError::InvalidSearchBounds { depth: max_depth, time_limit_ms });
        }
        let legal = MoveGen::legal_moves(board);
        if legal.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        self.stop.store(false, Ordering::Relaxed);
        self.start_time = Instant::now();
        let deadline = self.start_time.checked_add(Duration::from_millis(time_limit_ms as u64));
        let evaluation = self.evaluation;
        self.main.prepare(deadline, evaluation);
        for helper in &mut self.helpers {
            helper.prepare(deadline, evaluation);
        }

        let max_depth = max_depth.min(MAX_DEPTH as i64) as i32;
        let mut root_moves = order_moves(board, &legal, None, 0, &self.main.killers, &self.main.history);
        let mut work = board.clone();

        let mut best_move = root_moves[0];
        let mut best_score = -INFINITY;
        let mut depth_reached = 0u32;
        let mut pv = vec![best_move];

        for depth in 1..=max_depth {
            let abortable = depth > 1;
            self.main.set_abortable(abortable);
            for helper in &mut self.helpers {
                helper.set_abortable(abortable);
            }

            let iteration = if self.helpers.is_empty() {
                self.search_root(&mut work, depth, &root_moves)
            } else {
                self.search_root_parallel(&work, depth, &root_moves)
            };

            if iteration.complete {
                let Some((index, score)) = iteration.best else {
                    break;
                };
                best_move = root_moves[index];
                best_score = score;
                depth_reached = depth as u32;
                pv = self.worker(iteration.worker).pv_after(board, best_move, depth as usize);
                debug!(
                    "depth {} score {} nodes {} time {}ms best {}",
                    depth,
                    best_score,
                    self.nodes(),
                    self.start_time.elapsed().as_millis(),
                    best_move
                );
            } else {
                // Only a fully searched move that beat the previous best counts
                if let (Some((index, score)), Some(first)) = (iteration.best, iteration.first) {
                    if index != 0 && score > first {
                        best_move = root_moves[index];
                        best_score = score;
                        pv = self.worker(iteration.worker).pv_after(board, best_move, depth as usize - 1);
                    }
                }
                debug!("depth {} aborted after {}ms, keeping {}", depth, self.start_time.elapsed().as_millis(), best_move);
                break;
            }

            if best_score.abs() >= MATE_BOUND || root_moves.len() == 1 {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) || self.stop.load(Ordering::Relaxed) {
                break;
            }

            // Next iteration starts with the current best
            if let Some(pos) = root_moves.iter().position(|&m| m == best_move) {
                root_moves[..=pos].rotate_right(1);
            }
        }

        Ok(SearchResult {
            best_move,
            depth: depth_reached,
            score: best_score,
            pv,
            nodes: self.nodes(),
            elapsed: self.start_time.elapsed(),
            hashfull: self.hashfull(),
        })
    }

    fn worker(&self, index: usize) -> &Worker {
        self.helpers.get(index).unwrap_or(&self.main)
    }

    /// Fullest table among the workers, in permille
    fn hashfull(&self) -> usize {
        self.helpers.iter().map(|h| h.tt.hashfull()).fold(self.main.tt.hashfull(), usize::max)
    }

    fn nodes(&self) -> u64 {
        let mut stats = self.main.stats.clone();
        for helper in &self.helpers {
            stats.absorb(&helper.stats);
        }
        stats.nodes
    }

    /// Sequential root: each move gets the window above the best score so far
    fn search_root(&mut self, board: &mut Board, depth: i32, moves: &[Move]) -> RootIteration {
        let worker = &mut self.main;
        let mut iteration = RootIteration { best: None, first: None, complete: false, worker: 0 };
        let mut alpha = -INFINITY;

        for (index, &mv) in moves.iter().enumerate() {
            board.apply(mv);
            let score = -worker.alpha_beta(board, depth - 1, -INFINITY, -alpha, 1);
            board.unapply();
            if worker.aborted {
                return iteration;
            }

            if index == 0 {
                iteration.first = Some(score);
            }
            if iteration.best.is_none_or(|(_, best)| score > best) {
                iteration.best = Some((index, score));
                alpha = alpha.max(score);
            }
        }

        iteration.complete = true;
        iteration
    }
}
