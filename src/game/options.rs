//! Engine options settable by name

use crate::engine::eval::Evaluation;
use crate::engine::strategy::MoveStrategy;
use crate::error::{EngineError, EngineResult};

pub const HASH_DEFAULT: usize = 16;
pub const HASH_MAX: usize = 1024;
pub const THREADS_MAX: usize = 64;
pub const DEPTH_DEFAULT: i64 = 64;
pub const MOVE_TIME_DEFAULT: i64 = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Transposition table size in MB
    pub hash_mb: usize,
    pub threads: usize,
    pub strategy: MoveStrategy,
    pub evaluation: Evaluation,
    /// Refuse moves and searches once the game is over
    pub strict_game_over: bool,
    /// Depth used by `go` without limits
    pub depth: i64,
    /// Milliseconds used by `go` without limits
    pub move_time_ms: i64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            hash_mb: HASH_DEFAULT,
            threads: 1,
            strategy: MoveStrategy::Best,
            evaluation: Evaluation::Mixed,
            strict_game_over: true,
            depth: DEPTH_DEFAULT,
            move_time_ms: MOVE_TIME_DEFAULT,
        }
    }
}

/// One option assignment, validated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineOption {
    Hash(usize),
    Threads(usize),
    Strategy(MoveStrategy),
    Evaluation(Evaluation),
    StrictGameOver(bool),
    Depth(i64),
    MoveTime(i64),
}

/// Option names compare case-insensitively with spaces and underscores ignored
fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '_', '-'], "")
}

fn parse_range<T>(name: &str, value: &str, min: T, max: T) -> EngineResult<T>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let bad = || EngineError::InvalidOption(format!("{} must be between {} and {}, got '{}'", name, min, max, value));
    let parsed: T = value.trim().parse().map_err(|_| bad())?;
    if parsed < min || parsed > max {
        return Err(bad());
    }
    Ok(parsed)
}

fn parse_bool(name: &str, value: &str) -> EngineResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(EngineError::InvalidOption(format!("{} must be true or false, got '{}'", name, value))),
    }
}

impl EngineOption {
    pub fn parse(name: &str, value: &str) -> EngineResult<Self> {
        Ok(match normalize(name).as_str() {
            "hash" => EngineOption::Hash(parse_range("Hash", value, 1, HASH_MAX)?),
            "threads" => EngineOption::Threads(parse_range("Threads", value, 1, THREADS_MAX)?),
            "strategy" => EngineOption::Strategy(value.parse().map_err(EngineError::InvalidOption)?),
            "evaluation" => EngineOption::Evaluation(value.parse().map_err(EngineError::InvalidOption)?),
            "strictgameover" => EngineOption::StrictGameOver(parse_bool("StrictGameOver", value)?),
            "depth" => EngineOption::Depth(parse_range("Depth", value, 1, DEPTH_DEFAULT)?),
            "movetime" => EngineOption::MoveTime(parse_range("MoveTime", value, 1, i64::from(u32::MAX))?),
            _ => return Err(EngineError::InvalidOption(format!("unknown option '{}'", name.trim()))),
        })
    }
}

impl EngineOptions {
    pub fn apply(&mut self, option: EngineOption) {
        match option {
            EngineOption::Hash(mb) => self.hash_mb = mb,
            EngineOption::Threads(n) => self.threads = n,
            EngineOption::Strategy(s) => self.strategy = s,
            EngineOption::Evaluation(e) => self.evaluation = e,
            EngineOption::StrictGameOver(b) => self.strict_game_over = b,
            EngineOption::Depth(d) => self.depth = d,
            EngineOption::MoveTime(ms) => self.move_time_ms = ms,
        }
    }

    /// `option name …` lines for the `uci` reply
    pub fn uci_declarations() -> Vec<String> {
        let defaults = EngineOptions::default();
        vec![
            format!("option name Hash type spin default {} min 1 max {}", defaults.hash_mb, HASH_MAX),
            format!("option name Threads type spin default {} min 1 max {}", defaults.threads, THREADS_MAX),
            format!("option name Strategy type combo default {} var best var random", defaults.strategy),
            format!(
                "option name Evaluation type combo default {} var mixed var material var position var none",
                defaults.evaluation
            ),
            format!("option name StrictGameOver type check default {}", defaults.strict_game_over),
            format!("option name Depth type spin default {} min 1 max {}", defaults.depth, DEPTH_DEFAULT),
            format!(
                "option name MoveTime type spin default {} min 1 max {}",
                defaults.move_time_ms,
                u32::MAX
            ),
        ]
    }
}
