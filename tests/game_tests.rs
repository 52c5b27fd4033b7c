//! Game controller tests: outcomes, game-over handling, history and options

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use gd_chess::core::START_FEN;
use gd_chess::core::Color;
use gd_chess::error::EngineError;
use gd_chess::game::{DrawReason, GameController, GameOutcome, GameState, HISTORY_LIMIT};

fn play(game: &mut GameController, moves: &[&str]) {
    for text in moves {
        game.apply_move(text).unwrap_or_else(|e| panic!("{}: {}", text, e));
    }
}

// ============================================================================
// Outcomes
// ============================================================================

#[test]
fn test_white_checkmates() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]);
    assert_eq!(game.outcome(), GameOutcome::Checkmate { winner: Color::White });
    assert_eq!(game.outcome().code(), 2);
    assert_eq!(game.result_string(), "1-0");
    assert!(matches!(game.state(), GameState::GameOver(_)));
}

#[test]
fn test_black_checkmates() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(game.outcome().code(), 3);
    assert_eq!(game.result_string(), "0-1");
}

#[test]
fn test_check_is_code_one() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["e4", "f5", "Qh5+"]);
    assert_eq!(game.outcome(), GameOutcome::Check);
    assert_eq!(game.outcome().code(), 1);
    assert_eq!(game.state(), GameState::Positioned);
    assert_eq!(game.legal_moves_text(), vec!["g7g6"]);
}

#[test]
fn test_stalemate() {
    let mut game = GameController::new().unwrap();
    game.set_position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game.outcome(), GameOutcome::Draw(DrawReason::Stalemate));
    assert_eq!(game.outcome().code(), 4);
    assert_eq!(game.result_string(), "1/2-1/2");
}

#[test]
fn test_fifty_move_draw() {
    let mut game = GameController::new().unwrap();
    game.set_position("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
    assert_eq!(game.outcome().code(), 0);
    play(&mut game, &["a1a2"]);
    assert_eq!(game.outcome(), GameOutcome::Draw(DrawReason::FiftyMoves));
}

#[test]
fn test_mate_beats_fifty_move_rule() {
    let mut game = GameController::new().unwrap();
    game.set_position("6k1/5ppp/8/8/8/8/8/4Q2K w - - 99 80").unwrap();
    play(&mut game, &["e1e8"]);
    assert_eq!(game.outcome().code(), 2);
}

#[test]
fn test_insufficient_material_draw() {
    let mut game = GameController::new().unwrap();
    game.set_position("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").unwrap();
    play(&mut game, &["Kxd2"]);
    assert_eq!(game.outcome(), GameOutcome::Draw(DrawReason::InsufficientMaterial));
}

#[test]
fn test_threefold_repetition_draw() {
    let mut game = GameController::new().unwrap();
    let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8"];
    play(&mut game, &shuffle);
    assert_eq!(game.outcome().code(), 0);
    play(&mut game, &shuffle);
    assert_eq!(game.outcome(), GameOutcome::Draw(DrawReason::Repetition));
    assert_eq!(game.state(), GameState::GameOver(GameOutcome::Draw(DrawReason::Repetition)));
}

// ============================================================================
// Game over handling
// ============================================================================

#[test]
fn test_strict_game_over_refuses_moves() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["f3", "e5", "g4", "Qh4#"]);
    let fen = game.get_position();
    assert_eq!(game.apply_move("a2a3"), Err(EngineError::GameAlreadyOver));
    assert_eq!(game.best_move(3, 1000), Err(EngineError::GameAlreadyOver));
    assert_eq!(game.get_position(), fen);
}

#[test]
fn test_lenient_game_over() {
    let mut game = GameController::new().unwrap();
    game.set_option("StrictGameOver", "false").unwrap();
    game.set_position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(matches!(game.apply_move("h8g8"), Err(EngineError::IllegalMove(_))));
    assert_eq!(game.best_move(3, 1000), Err(EngineError::NoLegalMoves));
}

#[test]
fn test_lenient_play_after_draw() {
    let mut game = GameController::new().unwrap();
    game.set_option("StrictGameOver", "false").unwrap();
    let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8"];
    play(&mut game, &shuffle);
    play(&mut game, &shuffle);
    assert!(game.outcome().is_game_over());
    play(&mut game, &["e4"]);
    assert_eq!(game.outcome().code(), 0);
}

// ============================================================================
// Positions and history
// ============================================================================

#[test]
fn test_fresh_controller() {
    let mut game = GameController::new().unwrap();
    assert_eq!(game.state(), GameState::Uninitialized);
    assert_eq!(game.get_position(), START_FEN);
    play(&mut game, &["d4"]);
    assert_eq!(game.state(), GameState::Positioned);
}

#[test]
fn test_history_in_uci() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["e4", "c5", "Nf3"]);
    assert_eq!(game.move_history(), vec!["e2e4", "c7c5", "g1f3"]);
    assert_eq!(game.get_position(), "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2");
}

#[test]
fn test_history_capped() {
    let mut game = GameController::new().unwrap();
    game.set_option("StrictGameOver", "false").unwrap();
    for _ in 0..150 {
        play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    }
    let history = game.move_history();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history.first().map(String::as_str), Some("g1f3"));
    assert_eq!(history.last().map(String::as_str), Some("f6g8"));
}

#[test]
fn test_set_position_resets_history() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["e4"]);
    game.set_position("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    assert!(game.move_history().is_empty());
    assert_eq!(game.state(), GameState::Positioned);
}

#[test]
fn test_bad_input_changes_nothing() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["e4"]);
    let fen = game.get_position();

    assert!(matches!(game.set_position("8/8/8 w - - 0 1"), Err(EngineError::InvalidPosition(_))));
    assert!(matches!(game.apply_move("e7e4"), Err(EngineError::IllegalMove(_))));
    let moves: Vec<String> = ["e2e4", "e7e5", "e1e3"].iter().map(|s| s.to_string()).collect();
    assert!(game.load_game(START_FEN, &moves).is_err());

    assert_eq!(game.get_position(), fen);
    assert_eq!(game.move_history(), vec!["e2e4"]);
}

#[test]
fn test_load_game() {
    let mut game = GameController::new().unwrap();
    let moves: Vec<String> = ["e2e4", "e7e5", "Nf3"].iter().map(|s| s.to_string()).collect();
    game.load_game(START_FEN, &moves).unwrap();
    assert_eq!(game.move_history(), vec!["e2e4", "e7e5", "g1f3"]);
    assert_eq!(game.board().side_to_move(), Color::Black);
}

#[test]
fn test_new_game() {
    let mut game = GameController::new().unwrap();
    play(&mut game, &["e4", "e5"]);
    game.new_game();
    assert_eq!(game.get_position(), START_FEN);
    assert!(game.move_history().is_empty());
    assert_eq!(game.state(), GameState::Positioned);
}

#[test]
fn test_validate() {
    let game = GameController::new().unwrap();
    assert!(game.validate("e2e4"));
    assert!(game.validate("Nc3"));
    assert!(!game.validate("e2e5"));
    assert!(!game.validate(""));
}

// ============================================================================
// Search through the controller
// ============================================================================

#[test]
fn test_best_move_does_not_play() {
    let mut game = GameController::new().unwrap();
    let mv = game.best_move(2, 10_000).unwrap();
    assert!(game.validate(&mv));
    assert_eq!(game.get_position(), START_FEN);
    assert!(game.move_history().is_empty());
}

#[test]
fn test_best_move_bounds() {
    let mut game = GameController::new().unwrap();
    assert!(matches!(game.best_move(0, 1000), Err(EngineError::InvalidSearchBounds { .. })));
    assert!(matches!(game.best_move(2, 0), Err(EngineError::InvalidSearchBounds { .. })));
}

#[test]
fn test_stop_flag_ends_best_move() {
    let mut game = GameController::new().unwrap();
    let stop = game.stop_flag();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        stop.store(true, Ordering::Relaxed);
    });
    let start = Instant::now();
    let mv = game.best_move(64, 600_000).unwrap();
    stopper.join().unwrap();
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(game.validate(&mv));
    assert_eq!(game.get_position(), START_FEN);
}

#[test]
fn test_random_strategy() {
    let mut game = GameController::new().unwrap();
    game.set_option("Strategy", "random").unwrap();
    for _ in 0..10 {
        let mv = game.best_move(1, 1000).unwrap();
        assert!(game.validate(&mv));
    }
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_options() {
    let mut game = GameController::new().unwrap();
    game.set_option("Hash", "32").unwrap();
    game.set_option("Threads", "2").unwrap();
    game.set_option("Evaluation", "material").unwrap();
    assert_eq!(game.options().hash_mb, 32);
    assert_eq!(game.options().threads, 2);
    assert_eq!(game.evaluate(), 0);

    assert!(matches!(game.set_option("Hash", "0"), Err(EngineError::InvalidOption(_))));
    assert!(matches!(game.set_option("Ponder", "true"), Err(EngineError::InvalidOption(_))));
    assert_eq!(game.options().hash_mb, 32);

    let mv = game.best_move(2, 10_000).unwrap();
    assert!(game.validate(&mv));
}
