//! UCI-style text command surface
//!
//! Standard commands are parsed with vampirc-uci; engine extensions
//! (`d`, `eval`, `perft`, `fen`, `moves`, `result`, `history`) are handled
//! on top of it.

pub mod protocol;

pub use protocol::Uci;
