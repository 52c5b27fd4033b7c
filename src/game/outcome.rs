//! Game outcome classification

use std::fmt;

use crate::core::board::Board;
use crate::core::types::Color;
use crate::engine::movegen::MoveGen;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DrawReason {
    Stalemate,
    FiftyMoves,
    Repetition,
    InsufficientMaterial,
}

/// State of the game from the side to move's point of view
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameOutcome {
    Normal,
    Check,
    Checkmate { winner: Color },
    Draw(DrawReason),
}

impl GameOutcome {
    /// Classify `board`. Mate and stalemate take precedence over draw rules.
    pub fn of(board: &Board) -> GameOutcome {
        let us = board.side_to_move();
        let in_check = board.in_check(us);

        if !MoveGen::has_legal_move(board) {
            return if in_check {
                GameOutcome::Checkmate { winner: !us }
            } else {
                GameOutcome::Draw(DrawReason::Stalemate)
            };
        }
        if board.is_insufficient_material() {
            return GameOutcome::Draw(DrawReason::InsufficientMaterial);
        }
        if board.is_fifty_move_draw() {
            return GameOutcome::Draw(DrawReason::FiftyMoves);
        }
        if board.is_threefold_repetition() {
            return GameOutcome::Draw(DrawReason::Repetition);
        }
        if in_check { GameOutcome::Check } else { GameOutcome::Normal }
    }

    /// Stable numeric code: 0 normal, 1 check, 2 white wins, 3 black wins, 4 draw
    pub const fn code(self) -> u8 {
        match self {
            GameOutcome::Normal => 0,
            GameOutcome::Check => 1,
            GameOutcome::Checkmate { winner: Color::White } => 2,
            GameOutcome::Checkmate { winner: Color::Black } => 3,
            GameOutcome::Draw(_) => 4,
        }
    }

    pub const fn is_game_over(self) -> bool {
        matches!(self, GameOutcome::Checkmate { .. } | GameOutcome::Draw(_))
    }

    /// PGN result token
    pub const fn result_string(self) -> &'static str {
        match self {
            GameOutcome::Checkmate { winner: Color::White } => "1-0",
            GameOutcome::Checkmate { winner: Color::Black } => "0-1",
            GameOutcome::Draw(_) => "1/2-1/2",
            GameOutcome::Normal | GameOutcome::Check => "*",
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Normal => write!(f, "normal"),
            GameOutcome::Check => write!(f, "check"),
            GameOutcome::Checkmate { winner } => write!(f, "checkmate, {} wins", winner.name()),
            GameOutcome::Draw(DrawReason::Stalemate) => write!(f, "stalemate"),
            GameOutcome::Draw(DrawReason::FiftyMoves) => write!(f, "draw by fifty-move rule"),
            GameOutcome::Draw(DrawReason::Repetition) => write!(f, "draw by threefold repetition"),
            GameOutcome::Draw(DrawReason::InsufficientMaterial) => {
                write!(f, "draw by insufficient material")
            }
        }
    }
}
