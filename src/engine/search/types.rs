//! Search limits, stats, results and constants.

use std::time::Duration;

use crate::core::moves::Move;

use super::pv;

/// Limits as given by a `go` command, before they are turned into a depth
/// and a time budget
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub depth: Option<i64>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    pub infinite: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
}

impl SearchStats {
    pub(super) fn absorb(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.qnodes += other.qnodes;
        self.tt_hits += other.tt_hits;
        self.tt_cutoffs += other.tt_cutoffs;
    }
}

/// Outcome of one `search` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Deepest fully completed iteration (0 for a move not found by search)
    pub depth: u32,
    /// Centipawns from the side to move's perspective, or a mate score
    pub score: i32,
    pub pv: Vec<Move>,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Permille of the transposition table in use
    pub hashfull: usize,
}

impl SearchResult {
    /// `cp N` or `mate N`
    pub fn score_text(&self) -> String {
        pv::format_score(self.score)
    }

    /// UCI `info` line describing the result
    pub fn info_line(&self) -> String {
        let millis = self.elapsed.as_millis();
        let nps = if millis > 0 { self.nodes as u128 * 1000 / millis } else { 0 };
        let pv: Vec<String> = self.pv.iter().map(|m| m.to_uci()).collect();
        format!(
            "info depth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
            self.depth,
            self.score_text(),
            self.nodes,
            nps,
            self.hashfull,
            millis,
            pv.join(" ")
        )
    }
}

pub const INFINITY: i32 = 30000;
pub const MATE_SCORE: i32 = 29000;
pub const DRAW_SCORE: i32 = 0;
pub const MAX_DEPTH: i32 = 64;
/// Hard limit on recursion including check extensions and quiescence
pub const MAX_PLY: usize = 128;
/// Scores at or beyond this magnitude are mates
pub const MATE_BOUND: i32 = MATE_SCORE - MAX_PLY as i32;
