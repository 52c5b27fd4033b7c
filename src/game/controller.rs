//! Game controller
//!
//! Owns the live position, the move history and the searcher for one game.
//! Every operation is all-or-nothing: on error the position and history are
//! exactly as before the call.

use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::core::board::Board;
use crate::core::moves::Move;
use crate::core::notation;
use crate::engine::eval::evaluate;
use crate::engine::movegen::MoveGen;
use crate::engine::search::{SearchResult, Searcher};
use crate::error::{EngineError, EngineResult};

use super::options::{EngineOption, EngineOptions};
use super::outcome::GameOutcome;

/// Most recent plies reported by `move_history`
pub const HISTORY_LIMIT: usize = 512;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    /// No position set yet; the start position is in place
    Uninitialized,
    Positioned,
    GameOver(GameOutcome),
}

pub struct GameController {
    board: Board,
    history: Vec<Move>,
    state: GameState,
    searcher: Searcher,
    options: EngineOptions,
}

impl GameController {
    pub fn new() -> EngineResult<Self> {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> EngineResult<Self> {
        let mut searcher = Searcher::new(options.hash_mb)?;
        searcher.set_threads(options.threads)?;
        searcher.set_evaluation(options.evaluation);
        Ok(GameController {
            board: Board::startpos(),
            history: Vec::new(),
            state: GameState::Uninitialized,
            searcher,
            options,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Flag that aborts a running search
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.searcher.stop_flag()
    }

    fn refresh_state(&mut self) {
        let outcome = GameOutcome::of(&self.board);
        self.state = if outcome.is_game_over() {
            info!("game over: {}", outcome);
            GameState::GameOver(outcome)
        } else {
            GameState::Positioned
        };
    }

    fn ensure_playable(&self) -> EngineResult<()> {
        match self.state {
            GameState::GameOver(_) if self.options.strict_game_over => Err(EngineError::GameAlreadyOver),
            _ => Ok(()),
        }
    }

    /// Load a position from FEN and start a new history
    pub fn set_position(&mut self, fen: &str) -> EngineResult<()> {
        let board = Board::from_fen(fen).inspect_err(|e| warn!("rejected FEN '{}': {}", fen.trim(), e))?;
        debug!("position set: {}", board.to_fen());
        self.board = board;
        self.history.clear();
        self.refresh_state();
        Ok(())
    }

    /// Load a position and play `moves` from it. Nothing changes unless every
    /// move is legal.
    pub fn load_game(&mut self, fen: &str, moves: &[String]) -> EngineResult<()> {
        let mut board = Board::from_fen(fen).inspect_err(|e| warn!("rejected FEN '{}': {}", fen.trim(), e))?;
        let mut history = Vec::with_capacity(moves.len());
        for text in moves {
            let mv = notation::parse_move(&board, text).inspect_err(|e| warn!("{}", e))?;
            board.apply(mv);
            history.push(mv);
        }
        self.board = board;
        self.history = history;
        self.refresh_state();
        Ok(())
    }

    /// Back to the start position with empty history and cleared search tables
    pub fn new_game(&mut self) {
        self.board = Board::startpos();
        self.history.clear();
        self.searcher.clear();
        self.state = GameState::Positioned;
    }

    pub fn get_position(&self) -> String {
        self.board.to_fen()
    }

    /// Resolve move text (UCI or SAN) against the current position
    pub fn parse_move(&self, text: &str) -> EngineResult<Move> {
        notation::parse_move(&self.board, text)
    }

    pub fn validate(&self, text: &str) -> bool {
        self.parse_move(text).is_ok()
    }

    /// Validate and play a move, appending it to the history
    pub fn apply_move(&mut self, text: &str) -> EngineResult<Move> {
        self.ensure_playable()?;
        let mv = self.parse_move(text).inspect_err(|_| debug!("rejected move '{}'", text.trim()))?;
        self.board.apply(mv);
        self.history.push(mv);
        self.refresh_state();
        debug!("played {} -> {}", mv, self.board.to_fen());
        Ok(mv)
    }

    /// Choose a move with the configured strategy without playing it
    pub fn search(&mut self, depth: i64, time_limit_ms: i64) -> EngineResult<SearchResult> {
        self.ensure_playable()?;
        self.searcher.set_evaluation(self.options.evaluation);
        let result = self
            .options
            .strategy
            .choose(&mut self.searcher, &self.board, depth, time_limit_ms)?;
        info!(
            "{} chose {} (depth {}, score {}, {} nodes, {} ms)",
            self.options.strategy,
            result.best_move,
            result.depth,
            result.score_text(),
            result.nodes,
            result.elapsed.as_millis()
        );
        Ok(result)
    }

    /// Best move in UCI notation
    pub fn best_move(&mut self, depth: i64, time_limit_ms: i64) -> EngineResult<String> {
        self.search(depth, time_limit_ms).map(|r| r.best_move.to_uci())
    }

    pub fn outcome(&self) -> GameOutcome {
        GameOutcome::of(&self.board)
    }

    pub fn result_string(&self) -> &'static str {
        self.outcome().result_string()
    }

    /// Applied moves in order, at most the latest `HISTORY_LIMIT`
    pub fn move_history(&self) -> Vec<String> {
        let skip = self.history.len().saturating_sub(HISTORY_LIMIT);
        self.history[skip..].iter().map(|m| m.to_uci()).collect()
    }

    /// Legal moves of the current position in generation order
    pub fn legal_moves_text(&self) -> Vec<String> {
        MoveGen::legal_moves(&self.board).iter().map(|m| m.to_uci()).collect()
    }

    /// Static evaluation of the current position for the side to move
    pub fn evaluate(&self) -> i32 {
        evaluate(&self.board, self.options.evaluation)
    }

    /// Set an option by name. Unknown names and bad values leave everything unchanged.
    pub fn set_option(&mut self, name: &str, value: &str) -> EngineResult<()> {
        let option = EngineOption::parse(name, value).inspect_err(|e| warn!("{}", e))?;
        match option {
            EngineOption::Hash(mb) => self.searcher.set_hash_size(mb)?,
            EngineOption::Threads(n) => self.searcher.set_threads(n)?,
            EngineOption::Evaluation(e) => self.searcher.set_evaluation(e),
            _ => {}
        }
        self.options.apply(option);
        debug!("option {:?} set", option);
        Ok(())
    }
}
