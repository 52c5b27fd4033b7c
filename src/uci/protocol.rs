use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::sync::atomic::Ordering;
use std::time::Instant;
use vampirc_uci::uci::{UciSearchControl, UciTimeControl};
use vampirc_uci::{UciMessage, parser};

use crate::core::board::START_FEN;
use crate::engine::perft::divide;
use crate::engine::search::{SearchLimits, Searcher};
use crate::error::{EngineError, EngineResult};
use crate::game::{EngineOptions, GameController};

/// Time budget for `go depth N` with no clock: effectively unbounded
const UNBOUNDED_MS: i64 = u32::MAX as i64;

/// Text command front end of one game.
///
/// Every command produces its reply as a string (possibly empty), so the
/// same surface serves stdin/stdout and the handle API.
///
/// Commands run one at a time: `go` returns only once its search is done, so
/// a `stop` read afterwards has nothing left to interrupt and every search
/// starts with the flag cleared. To cut a running search short, store `true`
/// into `controller().stop_flag()` from another thread.
pub struct Uci {
    controller: GameController,
    quit: bool,
}

impl Uci {
    pub fn new() -> EngineResult<Self> {
        Ok(Uci { controller: GameController::new()?, quit: false })
    }

    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GameController {
        &mut self.controller
    }

    /// True once `quit` was received
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let reply = self.handle(line);
            if !reply.is_empty() {
                writeln!(stdout, "{}", reply)?;
            }
            stdout.flush()?;
            if self.quit {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command line and return the reply text
    pub fn handle(&mut self, line: &str) -> String {
        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }
        debug!("command: {}", line);

        match parser::parse_one(line) {
            UciMessage::Uci => self.cmd_uci(),
            UciMessage::IsReady => "readyok".to_string(),
            UciMessage::SetOption { name, value } => {
                let result = self.controller.set_option(name.trim(), value.as_deref().unwrap_or(""));
                reply_or_error(result.map(|_| String::new()))
            }
            UciMessage::UciNewGame => {
                self.controller.new_game();
                String::new()
            }
            UciMessage::Position { startpos, fen, moves } => {
                let fen_str = match (&fen, startpos) {
                    (Some(f), false) => f.as_str().to_string(),
                    _ => START_FEN.to_string(),
                };
                let move_strs: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
                reply_or_error(self.controller.load_game(&fen_str, &move_strs).map(|_| String::new()))
            }
            UciMessage::Go { time_control, search_control } => {
                let limits = go_to_limits(time_control.as_ref(), search_control.as_ref());
                self.do_go(limits)
            }
            UciMessage::Stop => {
                self.controller.stop_flag().store(true, Ordering::Relaxed);
                String::new()
            }
            UciMessage::Quit => {
                info!("quit received");
                self.quit = true;
                String::new()
            }
            UciMessage::Unknown(ref s, _) => {
                let text = if s.trim().is_empty() { line } else { s.as_str() };
                let parts: Vec<&str> = text.split_whitespace().collect();
                match parts.first().copied() {
                    Some("d") | Some("display") => self.cmd_display(),
                    Some("eval") => self.cmd_eval(),
                    Some("perft") => self.cmd_perft(&parts),
                    Some("fen") => self.controller.get_position(),
                    Some("moves") => self.controller.legal_moves_text().join(" "),
                    Some("result") => self.cmd_result(),
                    Some("history") => self.controller.move_history().join(" "),
                    Some("position") => self.cmd_position(&parts),
                    _ => format!("Unknown command: {}", line),
                }
            }
            _ => String::new(),
        }
    }

    /// Fallback for `position` lines the grammar rejects, so the caller
    /// gets the real reason (bad FEN, illegal move)
    fn cmd_position(&mut self, parts: &[&str]) -> String {
        let mut idx = 1;
        let mut fen = START_FEN.to_string();
        match parts.get(idx).copied() {
            Some("startpos") => idx += 1,
            Some("fen") => {
                idx += 1;
                let mut fen_parts = Vec::new();
                while idx < parts.len() && parts[idx] != "moves" {
                    fen_parts.push(parts[idx]);
                    idx += 1;
                }
                fen = fen_parts.join(" ");
            }
            _ => return format!("info string error: expected 'startpos' or 'fen' in '{}'", parts.join(" ")),
        }

        let mut moves = Vec::new();
        if parts.get(idx) == Some(&"moves") {
            moves = parts[idx + 1..].iter().map(|s| s.to_string()).collect();
        }
        reply_or_error(self.controller.load_game(&fen, &moves).map(|_| String::new()))
    }

    fn cmd_uci(&self) -> String {
        let mut lines = vec![
            format!("id name gd_chess {}", env!("CARGO_PKG_VERSION")),
            "id author gd_chess developers".to_string(),
            String::new(),
        ];
        lines.extend(EngineOptions::uci_declarations());
        lines.push("uciok".to_string());
        lines.join("\n")
    }

    /// Turn `go` limits into a depth and a time budget, search, and report
    fn do_go(&mut self, limits: SearchLimits) -> String {
        let options = self.controller.options();
        let side = self.controller.board().side_to_move();
        let depth = limits.depth.unwrap_or(options.depth);
        let time = match Searcher::calculate_time(&limits, side) {
            Some(ms) => ms.min(UNBOUNDED_MS as u64) as i64,
            // Nothing can stop a synchronous search, so `infinite` is capped
            None if limits.infinite => {
                debug!("go infinite capped at {} ms", options.move_time_ms);
                options.move_time_ms
            }
            None if limits.depth.is_some() => UNBOUNDED_MS,
            None => options.move_time_ms,
        };

        match self.controller.search(depth, time) {
            Ok(result) => format!("{}\nbestmove {}", result.info_line(), result.best_move),
            Err(EngineError::NoLegalMoves) => "bestmove 0000".to_string(),
            Err(e) => format!("info string error: {}\nbestmove 0000", e),
        }
    }

    fn cmd_display(&self) -> String {
        format!("{}", self.controller.board())
    }

    fn cmd_eval(&self) -> String {
        let board = self.controller.board();
        format!(
            "Evaluation: {} cp ({}, {} to move)",
            self.controller.evaluate(),
            self.controller.options().evaluation,
            board.side_to_move().name()
        )
    }

    fn cmd_perft(&self, parts: &[&str]) -> String {
        let depth: u32 = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
        let mut board = self.controller.board().clone();
        let start = Instant::now();
        let split = divide(&mut board, depth);
        let elapsed = start.elapsed().as_millis();
        let nodes: u64 = split.iter().map(|(_, n)| n).sum();
        let nps = if elapsed > 0 { nodes as u128 * 1000 / elapsed } else { 0 };

        let mut lines: Vec<String> = split.iter().map(|(mv, n)| format!("{}: {}", mv, n)).collect();
        lines.push(String::new());
        lines.push(format!("Nodes: {} ({} ms, {} nps)", nodes, elapsed, nps));
        lines.join("\n")
    }

    fn cmd_result(&self) -> String {
        let outcome = self.controller.outcome();
        format!("result {} {} ({})", outcome.code(), outcome.result_string(), outcome)
    }
}

fn reply_or_error(result: EngineResult<String>) -> String {
    match result {
        Ok(reply) => reply,
        Err(e) => format!("info string error: {}", e),
    }
}

/// Build SearchLimits from a vampirc-parsed go command
fn go_to_limits(
    time_control: Option<&UciTimeControl>,
    search_control: Option<&UciSearchControl>,
) -> SearchLimits {
    let mut limits = SearchLimits::default();

    if let Some(sc) = search_control {
        limits.depth = sc.depth.map(i64::from);
    }

    if let Some(tc) = time_control {
        match tc {
            UciTimeControl::Infinite => limits.infinite = true,
            UciTimeControl::MoveTime(d) => {
                limits.movetime = Some(duration_to_millis(d));
            }
            UciTimeControl::TimeLeft {
                white_time,
                black_time,
                white_increment,
                black_increment,
                moves_to_go,
            } => {
                limits.wtime = white_time.as_ref().map(duration_to_millis);
                limits.btime = black_time.as_ref().map(duration_to_millis);
                limits.winc = white_increment.as_ref().map(duration_to_millis);
                limits.binc = black_increment.as_ref().map(duration_to_millis);
                limits.movestogo = moves_to_go.map(u32::from);
            }
            _ => {}
        }
    }

    limits
}

fn duration_to_millis(d: &chrono::Duration) -> u64 {
    d.num_milliseconds().max(0) as u64
}
