//! gd_chess command-line engine: reads commands on stdin, replies on stdout

use std::io::Write;
use std::process::ExitCode;

use gd_chess::uci::Uci;

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries protocol replies only
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );
    builder
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();

    let mut uci = match Uci::new() {
        Ok(uci) => uci,
        Err(e) => {
            log::error!("failed to start engine: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("gd_chess {} ready", env!("CARGO_PKG_VERSION"));

    match uci.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("i/o error: {}", e);
            ExitCode::FAILURE
        }
    }
}
