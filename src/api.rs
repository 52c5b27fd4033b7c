//! Handle-style boundary for embedding the engine
//!
//! One `Engine` is one game instance. Dropping it releases everything it
//! owns. Operations mirror the command surface but take and return plain
//! values instead of protocol text.

use log::debug;

use crate::error::EngineResult;
use crate::game::GameController;
use crate::uci::Uci;

pub struct Engine {
    uci: Uci,
}

impl Engine {
    /// Fails with `AllocationFailure` if the search tables cannot be allocated
    pub fn create() -> EngineResult<Engine> {
        debug!("engine instance created");
        Ok(Engine { uci: Uci::new()? })
    }

    fn controller(&self) -> &GameController {
        self.uci.controller()
    }

    fn controller_mut(&mut self) -> &mut GameController {
        self.uci.controller_mut()
    }

    /// Run one text command; unknown commands answer with a diagnostic
    pub fn input_command(&mut self, text: &str) -> String {
        self.uci.handle(text)
    }

    pub fn input_fen(&mut self, fen: &str) -> EngineResult<()> {
        self.controller_mut().set_position(fen)
    }

    pub fn export_fen(&self) -> String {
        self.controller().get_position()
    }

    pub fn get_best_move(&mut self, depth: i64, time_limit_ms: i64) -> EngineResult<String> {
        self.controller_mut().best_move(depth, time_limit_ms)
    }

    pub fn validate_move(&self, text: &str) -> bool {
        self.controller().validate(text)
    }

    pub fn make_move(&mut self, text: &str) -> EngineResult<()> {
        self.controller_mut().apply_move(text).map(|_| ())
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> EngineResult<()> {
        self.controller_mut().set_option(name, value)
    }

    /// Applied moves in UCI notation, oldest first, capped at the latest 512
    pub fn get_move_history(&self) -> Vec<String> {
        self.controller().move_history()
    }

    /// 0 normal, 1 check, 2 white wins, 3 black wins, 4 draw
    pub fn get_game_result(&self) -> u8 {
        self.controller().outcome().code()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        debug!("engine instance destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_create_starts_at_initial_position() {
        let engine = Engine::create().unwrap();
        assert_eq!(engine.export_fen(), crate::core::START_FEN);
        assert_eq!(engine.get_game_result(), 0);
        assert!(engine.get_move_history().is_empty());
    }

    #[test]
    fn test_make_move_and_history() {
        let mut engine = Engine::create().unwrap();
        engine.make_move("e2e4").unwrap();
        engine.make_move("c5").unwrap();
        engine.make_move("Nf3").unwrap();
        assert_eq!(engine.get_move_history(), vec!["e2e4", "c7c5", "g1f3"]);
        assert_eq!(
            engine.export_fen(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_illegal_move_changes_nothing() {
        let mut engine = Engine::create().unwrap();
        assert!(!engine.validate_move("e2e5"));
        assert!(matches!(engine.make_move("e2e5"), Err(EngineError::IllegalMove(_))));
        assert_eq!(engine.export_fen(), crate::core::START_FEN);
        assert!(engine.get_move_history().is_empty());
    }

    #[test]
    fn test_input_fen_rejects_garbage() {
        let mut engine = Engine::create().unwrap();
        assert!(engine.input_fen("not a fen").is_err());
        assert_eq!(engine.export_fen(), crate::core::START_FEN);
    }

    #[test]
    fn test_best_move_is_legal() {
        let mut engine = Engine::create().unwrap();
        let mv = engine.get_best_move(3, 10_000).unwrap();
        assert!(engine.validate_move(&mv));
    }

    #[test]
    fn test_game_result_codes() {
        let mut engine = Engine::create().unwrap();
        for mv in ["f3", "e5", "g4", "Qh4#"] {
            engine.make_move(mv).unwrap();
        }
        assert_eq!(engine.get_game_result(), 3);
        assert_eq!(engine.make_move("a3"), Err(EngineError::GameAlreadyOver));
    }

    #[test]
    fn test_input_command_unknown() {
        let mut engine = Engine::create().unwrap();
        assert_eq!(engine.input_command("isready"), "readyok");
        assert!(engine.input_command("frobnicate").starts_with("Unknown command"));
    }

    #[test]
    fn test_set_option() {
        let mut engine = Engine::create().unwrap();
        assert!(engine.set_option("Strategy", "random").is_ok());
        assert!(matches!(engine.set_option("Nonsense", "1"), Err(EngineError::InvalidOption(_))));
    }
}
