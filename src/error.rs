//! Engine error types
//!
//! Every failure the engine can report to a caller. None of them are fatal:
//! the command and handle layers turn them into diagnostics or status codes.

use thiserror::Error;

/// Errors that can occur in engine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed or impossible FEN
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Move text that does not name a legal move in the current position
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// Search requested in a position without legal moves
    #[error("No legal moves available")]
    NoLegalMoves,

    /// Non-positive depth or time limit
    #[error("Invalid search bounds: depth {depth}, time limit {time_limit_ms} ms")]
    InvalidSearchBounds { depth: i64, time_limit_ms: i64 },

    /// Move or search requested after the game ended
    #[error("Game is already over")]
    GameAlreadyOver,

    /// Unknown option name or a value it cannot take
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Failed to allocate engine memory
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
