//! Move notation
//!
//! Moves can be read as long algebraic (`e2e4`, `e7e8q`, any case) or as
//! standard algebraic notation (`Nf3`, `exd5`, `O-O`, `e8=Q+`). Either form is
//! resolved against the legal moves of the position, so a parsed move always
//! carries the correct flags.

use super::board::Board;
use super::moves::Move;
use super::types::{PieceType, Square};
use crate::engine::movegen::MoveGen;
use crate::error::{EngineError, EngineResult};

/// Resolve move text against the legal moves of `board`
pub fn parse_move(board: &Board, text: &str) -> EngineResult<Move> {
    let text = text.trim();
    let illegal = || EngineError::IllegalMove(text.to_string());
    if text.is_empty() {
        return Err(illegal());
    }

    let legal = MoveGen::legal_moves(board);

    if let Some((from, to, promotion)) = split_uci(text) {
        return legal
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promotion)
            .ok_or_else(illegal);
    }

    let san = text.trim_end_matches(['+', '#', '!', '?']);
    let castle = match san {
        "O-O" | "0-0" => Some(6),
        "O-O-O" | "0-0-0" => Some(2),
        _ => None,
    };
    if let Some(file) = castle {
        return legal
            .iter()
            .copied()
            .find(|m| m.is_castle() && m.to().file() == file)
            .ok_or_else(illegal);
    }

    let pattern = SanPattern::parse(san).ok_or_else(illegal)?;
    let mut matches = legal.iter().copied().filter(|m| pattern.matches(board, *m));
    match (matches.next(), matches.next()) {
        (Some(mv), None) => Ok(mv),
        _ => Err(illegal()),
    }
}

/// Coordinates of a long-algebraic move, if `text` has that shape
fn split_uci(text: &str) -> Option<(Square, Square, Option<PieceType>)> {
    let lower = text.to_ascii_lowercase();
    if !(4..=5).contains(&lower.len()) || !lower.is_ascii() {
        return None;
    }
    let from = Square::parse(&lower[0..2])?;
    let to = Square::parse(&lower[2..4])?;
    let promotion = match lower[4..].chars().next() {
        None => None,
        Some(c) => match PieceType::from_char(c)? {
            PieceType::Pawn | PieceType::King => return None,
            kind => Some(kind),
        },
    };
    Some((from, to, promotion))
}

struct SanPattern {
    kind: PieceType,
    to: Square,
    from_file: Option<u8>,
    from_rank: Option<u8>,
    promotion: Option<PieceType>,
}

impl SanPattern {
    fn parse(san: &str) -> Option<Self> {
        if !san.is_ascii() || san.len() < 2 {
            return None;
        }
        let mut body = san;

        let mut promotion = None;
        if let Some(last) = body.chars().last() {
            if matches!(last, 'Q' | 'R' | 'B' | 'N') {
                promotion = PieceType::from_char(last);
                body = body[..body.len() - 1].trim_end_matches('=');
            }
        }

        let kind = match body.chars().next()? {
            c @ ('N' | 'B' | 'R' | 'Q' | 'K') => {
                body = &body[1..];
                PieceType::from_char(c)?
            }
            _ => PieceType::Pawn,
        };

        if body.len() < 2 {
            return None;
        }
        let to = Square::parse(&body[body.len() - 2..])?;
        let mut from_file = None;
        let mut from_rank = None;
        for c in body[..body.len() - 2].chars() {
            match c {
                'a'..='h' => from_file = Some(c as u8 - b'a'),
                '1'..='8' => from_rank = Some(c as u8 - b'1'),
                'x' | ':' => {}
                _ => return None,
            }
        }

        Some(SanPattern { kind, to, from_file, from_rank, promotion })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        mv.to() == self.to
            && !mv.is_castle()
            && mv.promotion_piece() == self.promotion
            && board.piece_at(mv.from()).is_some_and(|p| p.kind == self.kind)
            && self.from_file.is_none_or(|f| mv.from().file() == f)
            && self.from_rank.is_none_or(|r| mv.from().rank() == r)
    }
}

/// Standard algebraic notation of a legal move, with check and mate suffixes
pub fn to_san(board: &Board, mv: Move) -> String {
    let mut san = String::with_capacity(8);

    if mv.is_castle() {
        san.push_str(if mv.to().file() == 6 { "O-O" } else { "O-O-O" });
    } else {
        let kind = board
            .piece_at(mv.from())
            .map_or(PieceType::Pawn, |p| p.kind);

        if kind == PieceType::Pawn {
            if mv.is_capture() {
                san.push(mv.from().file_char());
            }
        } else {
            san.push(kind.to_char().to_ascii_uppercase());
            let rivals: Vec<Square> = MoveGen::legal_moves(board)
                .iter()
                .filter(|m| {
                    m.to() == mv.to()
                        && m.from() != mv.from()
                        && board.piece_at(m.from()).is_some_and(|p| p.kind == kind)
                })
                .map(|m| m.from())
                .collect();
            if !rivals.is_empty() {
                let same_file = rivals.iter().any(|sq| sq.file() == mv.from().file());
                let same_rank = rivals.iter().any(|sq| sq.rank() == mv.from().rank());
                if !same_file {
                    san.push(mv.from().file_char());
                } else if !same_rank {
                    san.push(mv.from().rank_char());
                } else {
                    san.push(mv.from().file_char());
                    san.push(mv.from().rank_char());
                }
            }
        }

        if mv.is_capture() {
            san.push('x');
        }
        san.push_str(&mv.to().to_string());
        if let Some(piece) = mv.promotion_piece() {
            san.push('=');
            san.push(piece.to_char().to_ascii_uppercase());
        }
    }

    let mut after = board.clone();
    after.apply(mv);
    if after.in_check(after.side_to_move()) {
        san.push(if MoveGen::has_legal_move(&after) { '+' } else { '#' });
    }
    san
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn test_parse_uci_any_case() {
        let b = Board::startpos();
        assert_eq!(parse_move(&b, "e2e4").unwrap().to_uci(), "e2e4");
        assert_eq!(parse_move(&b, "E2E4").unwrap().to_uci(), "e2e4");
        assert!(parse_move(&b, "e2e5").is_err());
    }

    #[test]
    fn test_parse_san() {
        let b = Board::startpos();
        assert_eq!(parse_move(&b, "Nf3").unwrap().to_uci(), "g1f3");
        assert_eq!(parse_move(&b, "e4").unwrap().to_uci(), "e2e4");
        assert!(parse_move(&b, "Nd2").is_err());
        assert!(parse_move(&b, "").is_err());
    }

    #[test]
    fn test_parse_promotion_case_insensitive() {
        let b = board("8/P7/8/8/8/8/8/4K2k w - - 0 1");
        assert_eq!(parse_move(&b, "a7a8N").unwrap().promotion_piece(), Some(PieceType::Knight));
        assert_eq!(parse_move(&b, "a8=Q").unwrap().to_uci(), "a7a8q");
        assert!(parse_move(&b, "a7a8").is_err());
    }

    #[test]
    fn test_parse_castling() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(parse_move(&b, "O-O").unwrap().to_uci(), "e1g1");
        assert_eq!(parse_move(&b, "O-O-O").unwrap().to_uci(), "e1c1");
        assert_eq!(parse_move(&b, "e1g1").unwrap().to_uci(), "e1g1");
    }

    #[test]
    fn test_parse_san_piece_moves() {
        let b = board("4k3/8/8/8/8/8/8/N3K2N w - - 0 1");
        assert_eq!(parse_move(&b, "Nb3").unwrap().to_uci(), "a1b3");
        assert_eq!(parse_move(&b, "Ng3+").unwrap().to_uci(), "h1g3");
        let r = board("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_eq!(parse_move(&r, "Rf1").unwrap().to_uci(), "h1f1");
    }

    #[test]
    fn test_to_san() {
        let b = Board::startpos();
        let mv = parse_move(&b, "g1f3").unwrap();
        assert_eq!(to_san(&b, mv), "Nf3");

        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(to_san(&b, parse_move(&b, "e1g1").unwrap()), "O-O");
        assert_eq!(to_san(&b, parse_move(&b, "a1a8").unwrap()), "Rxa8+");
    }

    #[test]
    fn test_to_san_disambiguates() {
        let b = board("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        // Only the a1 rook reaches d1 because the king blocks the h1 rook
        assert_eq!(to_san(&b, parse_move(&b, "a1d1").unwrap()), "Rd1");
        let b = board("4k3/8/8/8/8/8/8/R5KR w - - 0 1");
        assert_eq!(to_san(&b, parse_move(&b, "a1b1").unwrap()), "Rb1");
        let b = board("3k4/8/8/8/R7/8/8/R3K3 w - - 0 1");
        assert_eq!(to_san(&b, parse_move(&b, "a1a2").unwrap()), "R1a2");
        assert_eq!(parse_move(&b, "R4a2").unwrap().to_uci(), "a4a2");
        assert!(parse_move(&b, "Ra2").is_err());
    }

    #[test]
    fn test_to_san_mate() {
        let b = board("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(to_san(&b, parse_move(&b, "a1a8").unwrap()), "Ra8#");
    }
}
