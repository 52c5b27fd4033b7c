//! Search: iterative deepening, alpha-beta, quiescence, parallel root split.

mod alphabeta;
mod ordering;
mod parallel;
mod pv;
mod searcher;
mod types;

pub use searcher::Searcher;
pub use types::{
    DRAW_SCORE, INFINITY, MATE_BOUND, MATE_SCORE, MAX_DEPTH, MAX_PLY, SearchLimits, SearchResult,
    SearchStats,
};
