//! How the engine picks its move

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::core::board::Board;
use crate::error::{EngineError, EngineResult};

use super::movegen::MoveGen;
use super::search::{SearchResult, Searcher};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MoveStrategy {
    /// Alpha-beta search under the given limits
    #[default]
    Best,
    /// Any legal move, uniformly at random
    Random,
}

impl MoveStrategy {
    pub const fn name(self) -> &'static str {
        match self {
            MoveStrategy::Best => "best",
            MoveStrategy::Random => "random",
        }
    }

    /// Choose a move for the side to move
    pub fn choose(
        self,
        searcher: &mut Searcher,
        board: &Board,
        depth: i64,
        time_limit_ms: i64,
    ) -> EngineResult<SearchResult> {
        match self {
            MoveStrategy::Best => searcher.search(board, depth, time_limit_ms),
            MoveStrategy::Random => {
                if depth <= 0 || time_limit_ms <= 0 {
                    return Err(EngineError::InvalidSearchBounds { depth, time_limit_ms });
                }
                let start = Instant::now();
                let moves = MoveGen::legal_moves(board);
                if moves.is_empty() {
                    return Err(EngineError::NoLegalMoves);
                }
                let mv = moves[rand::random_range(0..moves.len())];
                Ok(SearchResult {
                    best_move: mv,
                    depth: 0,
                    score: 0,
                    pv: vec![mv],
                    nodes: 0,
                    elapsed: start.elapsed(),
                    hashfull: 0,
                })
            }
        }
    }
}

impl fmt::Display for MoveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MoveStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" | "bestevaluation" | "best_eval" => Ok(MoveStrategy::Best),
            "random" => Ok(MoveStrategy::Random),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}
