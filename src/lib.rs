pub mod api;
pub mod core;
pub mod engine;
pub mod error;
pub mod game;
pub mod uci;

pub use api::Engine;
pub use core::{Board, Move};
pub use engine::search::{SearchResult, Searcher};
pub use error::{EngineError, EngineResult};
pub use game::{GameController, GameOutcome};
pub use uci::Uci;
