//! Chess engine components
//!
//! This module contains the core engine functionality:
//! - Attack tables and legal move generation
//! - Perft
//! - Material and piece-square evaluation
//! - Alpha-beta search with a transposition table
//! - Move strategies

pub mod attacks;
pub mod eval;
pub mod movegen;
pub mod perft;
pub mod search;
pub mod strategy;
pub mod tt;

pub use eval::{Evaluation, evaluate};
pub use movegen::MoveGen;
pub use perft::{divide, perft};
pub use search::{INFINITY, MATE_SCORE, SearchLimits, SearchResult, SearchStats, Searcher};
pub use strategy::MoveStrategy;
pub use tt::{TTEntry, TTFlag, TranspositionTable};
