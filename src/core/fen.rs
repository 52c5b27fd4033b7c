//! FEN import and export
//!
//! Import is strict: a position is rejected unless it could plausibly occur
//! in a game (one king each, promotions explain extra pieces, castling and
//! en passant fields agree with the placement, the side not to move is not
//! in check). Export is canonical, so loading and exporting round-trips.

use std::str::FromStr;

use super::bitboard::Bitboard;
use super::board::Board;
use super::types::{CastlingRights, Color, Piece, PieceType, Square};
use crate::error::{EngineError, EngineResult};

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidPosition(msg.into())
}

impl Board {
    /// Parse a position from FEN. The two clock fields are optional.
    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(invalid(format!("expected 4 to 6 fields, found {}", fields.len())));
        }

        let mut board = Board::empty();
        parse_placement(&mut board, fields[0])?;

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(invalid(format!("bad side to move '{}'", other))),
        };
        board.castling = parse_castling(fields[2])?;
        board.en_passant = match fields[3] {
            "-" => None,
            s => Some(Square::parse(s).ok_or_else(|| invalid(format!("bad en passant square '{}'", s)))?),
        };
        board.halfmove_clock = match fields.get(4) {
            Some(s) => s.parse().map_err(|_| invalid(format!("bad halfmove clock '{}'", s)))?,
            None => 0,
        };
        board.fullmove_number = match fields.get(5) {
            Some(s) => s.parse().map_err(|_| invalid(format!("bad fullmove number '{}'", s)))?,
            None => 1,
        };
        if board.fullmove_number == 0 {
            return Err(invalid("fullmove number must be at least 1"));
        }

        board.validate()?;
        board.hash = board.compute_hash();
        Ok(board)
    }

    /// Serialize the position to FEN
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self.en_passant.map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {} {} {}",
            fen, side, self.castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }

    fn validate(&self) -> EngineResult<()> {
        for color in Color::BOTH {
            let kings = self.pieces_of(PieceType::King, color).count();
            if kings != 1 {
                return Err(invalid(format!("{} has {} kings", color.name(), kings)));
            }

            let count = |kind| self.pieces_of(kind, color).count() as i32;
            let pawns = count(PieceType::Pawn);
            if self.color(color).count() > 16 || pawns > 8 {
                return Err(invalid(format!("too many {} pieces", color.name())));
            }
            let promoted = (count(PieceType::Queen) - 1).max(0)
                + (count(PieceType::Rook) - 2).max(0)
                + (count(PieceType::Bishop) - 2).max(0)
                + (count(PieceType::Knight) - 2).max(0);
            if promoted > 8 - pawns {
                return Err(invalid(format!(
                    "{} piece counts cannot come from promotions",
                    color.name()
                )));
            }
        }

        if (self.pieces(PieceType::Pawn) & Bitboard::BACK_RANKS).any() {
            return Err(invalid("pawn on first or last rank"));
        }

        for color in Color::BOTH {
            let rank = color.back_rank();
            let king_home = Square::from_file_rank(4, rank);
            let rook = Piece::new(PieceType::Rook, color);
            for (right, rook_file) in [
                (CastlingRights::kingside(color), 7),
                (CastlingRights::queenside(color), 0),
            ] {
                if !self.castling.has(right) {
                    continue;
                }
                let king_ok = self.piece_at(king_home) == Some(Piece::new(PieceType::King, color));
                let rook_ok = self.piece_at(Square::from_file_rank(rook_file, rank)) == Some(rook);
                if !king_ok || !rook_ok {
                    return Err(invalid(format!(
                        "castling right without king and rook on their home squares ({})",
                        self.castling
                    )));
                }
            }
        }

        if let Some(ep) = self.en_passant {
            let pusher = !self.side_to_move;
            let expected_rank = match pusher {
                Color::White => 2,
                Color::Black => 5,
            };
            let pawn_sq = ep.offset(0, pusher.forward());
            let origin = ep.offset(0, -pusher.forward());
            let explained = ep.rank() == expected_rank
                && self.piece_at(ep).is_none()
                && origin.is_some_and(|sq| self.piece_at(sq).is_none())
                && pawn_sq.is_some_and(|sq| {
                    self.piece_at(sq) == Some(Piece::new(PieceType::Pawn, pusher))
                });
            if !explained {
                return Err(invalid(format!("en passant square {} is impossible", ep)));
            }
        }

        if self.in_check(!self.side_to_move) {
            return Err(invalid("side not to move is in check"));
        }
        Ok(())
    }
}

fn parse_placement(board: &mut Board, placement: &str) -> EngineResult<()> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, found {}", ranks.len())));
    }
    for (i, row) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(invalid(format!("bad empty-square count '{}'", c)));
                }
                file += skip as u8;
            } else {
                let piece = Piece::from_char(c)
                    .ok_or_else(|| invalid(format!("unknown piece '{}'", c)))?;
                if file >= 8 {
                    return Err(invalid(format!("rank {} is too long", rank + 1)));
                }
                board.put(piece, Square::from_file_rank(file, rank));
                file += 1;
            }
            if file > 8 {
                return Err(invalid(format!("rank {} is too long", rank + 1)));
            }
        }
        if file != 8 {
            return Err(invalid(format!("rank {} has {} files", rank + 1, file)));
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> EngineResult<CastlingRights> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut bits = 0u8;
    for c in field.chars() {
        let right = match c {
            'K' => CastlingRights::WHITE_KING,
            'Q' => CastlingRights::WHITE_QUEEN,
            'k' => CastlingRights::BLACK_KING,
            'q' => CastlingRights::BLACK_QUEEN,
            _ => return Err(invalid(format!("unknown castling right '{}'", c))),
        };
        if bits & right != 0 {
            return Err(invalid(format!("duplicate castling right '{}'", c)));
        }
        bits |= right;
    }
    Ok(CastlingRights::new(bits))
}

impl FromStr for Board {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        Board::from_fen(s)
    }
}
