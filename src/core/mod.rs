//! Core chess types and representations
//!
//! This module contains the fundamental building blocks of the engine:
//! - Bitboard representation
//! - Board state, FEN import/export and apply/unapply
//! - Move encoding and notation
//! - Zobrist hashing

pub mod bitboard;
pub mod board;
pub mod fen;
pub mod moves;
pub mod notation;
pub mod types;
pub mod zobrist;

pub use bitboard::{Bitboard, Squares};
pub use board::{Board, FIFTY_MOVE_LIMIT, START_FEN};
pub use moves::{Move, MoveFlags, MoveList};
pub use types::{CastlingRights, Color, Piece, PieceType, Square};
pub use zobrist::ZobristKeys;
