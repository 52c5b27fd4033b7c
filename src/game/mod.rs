//! One game: position, history, outcome and options

pub mod controller;
pub mod options;
pub mod outcome;

pub use controller::{GameController, GameState, HISTORY_LIMIT};
pub use options::{EngineOption, EngineOptions};
pub use outcome::{DrawReason, GameOutcome};
