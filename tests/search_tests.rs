//! Search tests: tactics, limits, errors and thread-count independence

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use gd_chess::core::{Board, Color};
use gd_chess::engine::search::MATE_BOUND;
use gd_chess::engine::{Evaluation, MoveGen, MoveStrategy, SearchLimits, Searcher};
use gd_chess::error::EngineError;
use gd_chess::game::GameOutcome;

const LONG: i64 = 60_000;

fn searcher() -> Searcher {
    Searcher::new(16).unwrap()
}

// ============================================================================
// Tactics
// ============================================================================

#[test]
fn test_mate_in_one_white() {
    let board = Board::from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1").unwrap();
    let result = searcher().search(&board, 3, LONG).unwrap();
    assert_eq!(result.best_move.to_uci(), "e1e8");
    assert!(result.score >= MATE_BOUND);
    assert_eq!(result.score_text(), "mate 1");
}

#[test]
fn test_mate_in_one_black() {
    let board = Board::from_fen("4r1k1/8/8/8/8/8/5PPP/6K1 b - - 0 1").unwrap();
    let result = searcher().search(&board, 3, LONG).unwrap();
    assert_eq!(result.best_move.to_uci(), "e8e1");
    assert!(result.score >= MATE_BOUND);
}

#[test]
fn test_takes_hanging_queen() {
    let board = Board::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
    let result = searcher().search(&board, 3, LONG).unwrap();
    assert_eq!(result.best_move.to_uci(), "d2d5");
    assert!(result.score > 300);
}

#[test]
fn test_finds_mate_instead_of_stalemate() {
    let board = Board::from_fen("7k/8/6K1/8/8/8/8/6Q1 w - - 0 1").unwrap();
    let result = searcher().search(&board, 4, LONG).unwrap();
    assert!(result.score >= MATE_BOUND);
    let mut after = board.clone();
    after.apply(result.best_move);
    assert_ne!(GameOutcome::of(&after), GameOutcome::Draw(gd_chess::game::DrawReason::Stalemate));
}

// ============================================================================
// Contract
// ============================================================================

#[test]
fn test_result_is_legal_and_board_untouched() {
    let board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    let before = board.clone();
    let result = searcher().search(&board, 3, LONG).unwrap();
    assert!(MoveGen::legal_moves(&board).contains(&result.best_move));
    assert_eq!(result.pv.first(), Some(&result.best_move));
    assert_eq!(result.depth, 3);
    assert!(result.nodes > 0);
    assert_eq!(board, before);
}

#[test]
fn test_invalid_bounds() {
    let board = Board::startpos();
    let mut s = searcher();
    assert_eq!(
        s.search(&board, 0, 1000),
        Err(EngineError::InvalidSearchBounds { depth: 0, time_limit_ms: 1000 })
    );
    assert_eq!(
        s.search(&board, 3, -5),
        Err(EngineError::InvalidSearchBounds { depth: 3, time_limit_ms: -5 })
    );
}

#[test]
fn test_no_legal_moves() {
    let mated = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    let stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let mut s = searcher();
    assert_eq!(s.search(&mated, 3, 1000), Err(EngineError::NoLegalMoves));
    assert_eq!(s.search(&stalemate, 3, 1000), Err(EngineError::NoLegalMoves));
    // Bounds are checked first
    assert!(matches!(s.search(&mated, 0, 1000), Err(EngineError::InvalidSearchBounds { .. })));
}

#[test]
fn test_time_limit_respected() {
    let board = Board::startpos();
    let result = searcher().search(&board, 64, 200).unwrap();
    assert!(result.depth >= 1);
    assert!(result.elapsed < Duration::from_secs(5));
    assert!(MoveGen::legal_moves(&board).contains(&result.best_move));
    assert!(result.hashfull <= 1000);
    assert!(result.info_line().contains(&format!("hashfull {}", result.hashfull)));
}

/// Raise `searcher`'s stop flag from another thread after `delay`, while it
/// searches the start position with no practical depth or time limit
fn search_until_stopped(searcher: &mut Searcher, delay: Duration) -> (gd_chess::engine::SearchResult, Duration) {
    let board = Board::startpos();
    let stop = searcher.stop_flag();
    let stopper = thread::spawn(move || {
        thread::sleep(delay);
        stop.store(true, Ordering::Relaxed);
    });
    let start = Instant::now();
    let result = searcher.search(&board, 64, 600_000).unwrap();
    let elapsed = start.elapsed();
    stopper.join().unwrap();
    assert_eq!(board, Board::startpos());
    (result, elapsed)
}

#[test]
fn test_stop_flag_cancels_search() {
    let mut s = searcher();
    let (result, elapsed) = search_until_stopped(&mut s, Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(10), "stop took {:?}", elapsed);
    assert!(result.depth >= 1);
    assert!(MoveGen::legal_moves(&Board::startpos()).contains(&result.best_move));

    // The next search starts with the flag cleared
    let again = s.search(&Board::startpos(), 2, LONG).unwrap();
    assert_eq!(again.depth, 2);
}

#[test]
fn test_stop_flag_cancels_parallel_search() {
    let mut s = searcher();
    s.set_threads(3).unwrap();
    let (result, elapsed) = search_until_stopped(&mut s, Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(10), "stop took {:?}", elapsed);
    assert!(result.depth >= 1);
    assert!(MoveGen::legal_moves(&Board::startpos()).contains(&result.best_move));
}

#[test]
fn test_parallel_matches_sequential_score() {
    let positions = [
        gd_chess::core::START_FEN,
        "4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1",
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    ];
    for fen in positions {
        let board = Board::from_fen(fen).unwrap();
        let sequential = searcher().search(&board, 3, LONG).unwrap();

        let mut parallel = searcher();
        parallel.set_threads(4).unwrap();
        assert_eq!(parallel.threads(), 4);
        let result = parallel.search(&board, 3, LONG).unwrap();

        assert_eq!(result.score, sequential.score, "score differs in {}", fen);
        assert!(MoveGen::legal_moves(&board).contains(&result.best_move));
    }
}

#[test]
fn test_no_evaluation_scores_zero() {
    let mut s = searcher();
    s.set_evaluation(Evaluation::None);
    let result = s.search(&Board::startpos(), 2, LONG).unwrap();
    assert_eq!(result.score, 0);
}

#[test]
fn test_resize_and_clear() {
    let mut s = searcher();
    s.set_hash_size(4).unwrap();
    assert_eq!(s.hash_size(), 4);
    s.set_threads(0).unwrap();
    assert_eq!(s.threads(), 1);
    s.clear();
    assert!(s.search(&Board::startpos(), 2, LONG).is_ok());
}

// ============================================================================
// Strategies and time management
// ============================================================================

#[test]
fn test_random_strategy_returns_legal_move() {
    let board = Board::startpos();
    let mut s = searcher();
    for _ in 0..20 {
        let result = MoveStrategy::Random.choose(&mut s, &board, 1, 1000).unwrap();
        assert!(MoveGen::legal_moves(&board).contains(&result.best_move));
        assert_eq!(result.depth, 0);
    }
    assert!(MoveStrategy::Random.choose(&mut s, &board, 0, 1000).is_err());
}

#[test]
fn test_random_strategy_spreads_over_moves() {
    let board = Board::startpos();
    let mut s = searcher();
    let seen: HashSet<String> = (0..400)
        .map(|_| MoveStrategy::Random.choose(&mut s, &board, 1, 1000).unwrap().best_move.to_uci())
        .collect();
    assert!(seen.len() >= 15, "only {} distinct moves", seen.len());
}

#[test]
fn test_calculate_time() {
    let clock = SearchLimits { wtime: Some(60_000), btime: Some(30_000), ..Default::default() };
    assert_eq!(Searcher::calculate_time(&clock, Color::White), Some(2000));
    assert_eq!(Searcher::calculate_time(&clock, Color::Black), Some(1000));

    let fixed = SearchLimits { movetime: Some(500), ..Default::default() };
    assert_eq!(Searcher::calculate_time(&fixed, Color::Black), Some(500));

    let white_only = SearchLimits { wtime: Some(10_000), ..Default::default() };
    assert_eq!(Searcher::calculate_time(&white_only, Color::Black), None);
    assert_eq!(Searcher::calculate_time(&SearchLimits::default(), Color::White), None);
}
