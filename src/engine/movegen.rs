//! Legal move generation
//!
//! Moves are generated pseudo-legally piece by piece and then filtered by
//! replaying each move on the occupancy bitboards and asking whether the
//! mover's king would be attacked. Castling is checked in full while it is
//! generated (empty path, no check, no attacked transit square).
//!
//! Order is fixed: pawns, knights, bishops, rooks, queens, king, castling;
//! origin squares ascending, then destinations ascending, promotions as
//! Q, R, B, N. Search and tests rely on this order being stable.

use crate::core::bitboard::Bitboard;
use crate::core::board::Board;
use crate::core::moves::{Move, MoveFlags, MoveList};
use crate::core::types::{CastlingRights, Color, PieceType, Square};

use super::attacks;

pub struct MoveGen;

impl MoveGen {
    /// All legal moves for the side to move
    pub fn legal_moves(board: &Board) -> MoveList {
        let mut moves = MoveList::new();
        Self::pseudo_legal_moves(board, &mut moves);
        moves.retain(|mv| Self::leaves_king_safe(board, *mv));
        moves
    }

    /// Legal captures and promotions only
    pub fn tactical_moves(board: &Board) -> MoveList {
        let mut moves = Self::legal_moves(board);
        moves.retain(|mv| mv.is_tactical());
        moves
    }

    /// True iff `side`'s king is attacked by the opponent
    #[inline]
    pub fn is_in_check(board: &Board, side: Color) -> bool {
        board.in_check(side)
    }

    /// Whether the side to move has any legal move at all
    pub fn has_legal_move(board: &Board) -> bool {
        !Self::legal_moves(board).is_empty()
    }

    /// Moves that obey piece movement rules but may leave the own king in check.
    /// Castling moves are fully checked here.
    pub fn pseudo_legal_moves(board: &Board, moves: &mut MoveList) {
        let us = board.side_to_move();
        let ours = board.color(us);
        let theirs = board.color(!us);
        let occupied = board.occupied();

        Self::pawn_moves(board, moves);

        let knights = board.pieces_of(PieceType::Knight, us);
        for from in knights {
            Self::push_targets(moves, from, attacks::knight(from) & !ours, theirs);
        }
        for from in board.pieces_of(PieceType::Bishop, us) {
            Self::push_targets(moves, from, attacks::bishop(from, occupied) & !ours, theirs);
        }
        for from in board.pieces_of(PieceType::Rook, us) {
            Self::push_targets(moves, from, attacks::rook(from, occupied) & !ours, theirs);
        }
        for from in board.pieces_of(PieceType::Queen, us) {
            Self::push_targets(moves, from, attacks::queen(from, occupied) & !ours, theirs);
        }

        let king = board.king_square(us);
        Self::push_targets(moves, king, attacks::king(king) & !ours, theirs);
        Self::castling_moves(board, moves);
    }

    fn push_targets(moves: &mut MoveList, from: Square, targets: Bitboard, theirs: Bitboard) {
        for to in targets {
            let flags = if theirs.has(to) { MoveFlags::CAPTURE } else { MoveFlags::QUIET };
            moves.push(Move::new(from, to, flags));
        }
    }

    fn pawn_moves(board: &Board, moves: &mut MoveList) {
        let us = board.side_to_move();
        let theirs = board.color(!us);
        let occupied = board.occupied();
        let forward = us.forward();
        let start_rank = match us {
            Color::White => 1,
            Color::Black => 6,
        };
        let promotion_rank = (!us).back_rank();

        for from in board.pieces_of(PieceType::Pawn, us) {
            if let Some(to) = from.offset(0, forward) {
                if !occupied.has(to) {
                    if to.rank() == promotion_rank {
                        for piece in PieceType::PROMOTIONS {
                            moves.push(Move::promotion(from, to, piece, false));
                        }
                    } else {
                        moves.push(Move::new(from, to, MoveFlags::QUIET));
                        if from.rank() == start_rank {
                            if let Some(two) = to.offset(0, forward) {
                                if !occupied.has(two) {
                                    moves.push(Move::new(from, two, MoveFlags::DOUBLE_PUSH));
                                }
                            }
                        }
                    }
                }
            }

            let hits = attacks::pawn(us, from);
            for to in hits & theirs {
                if to.rank() == promotion_rank {
                    for piece in PieceType::PROMOTIONS {
                        moves.push(Move::promotion(from, to, piece, true));
                    }
                } else {
                    moves.push(Move::new(from, to, MoveFlags::CAPTURE));
                }
            }

            if let Some(ep) = board.en_passant() {
                if hits.has(ep) {
                    moves.push(Move::new(from, ep, MoveFlags::EN_PASSANT));
                }
            }
        }
    }

    fn castling_moves(board: &Board, moves: &mut MoveList) {
        let us = board.side_to_move();
        let them = !us;
        let rights = board.castling();
        let can_king = rights.has(CastlingRights::kingside(us));
        let can_queen = rights.has(CastlingRights::queenside(us));
        if !(can_king || can_queen) || board.in_check(us) {
            return;
        }

        let rank = us.back_rank();
        let at = |file| Square::from_file_rank(file, rank);
        let king = at(4);
        let occupied = board.occupied();
        let empty = |files: &[u8]| files.iter().all(|&f| !occupied.has(at(f)));
        let safe = |files: &[u8]| files.iter().all(|&f| !board.is_attacked(at(f), them));

        if can_king && empty(&[5, 6]) && safe(&[5, 6]) {
            moves.push(Move::new(king, at(6), MoveFlags::CASTLE));
        }
        if can_queen && empty(&[1, 2, 3]) && safe(&[3, 2]) {
            moves.push(Move::new(king, at(2), MoveFlags::CASTLE));
        }
    }

    /// Whether playing the pseudo-legal `mv` keeps the mover's king unattacked
    pub fn leaves_king_safe(board: &Board, mv: Move) -> bool {
        if mv.is_castle() {
            return true;
        }
        let us = board.side_to_move();
        let from = mv.from();
        let to = mv.to();

        let mut occupied = board.occupied().without(from).with(to);
        let mut removed = Bitboard::square(to);
        if mv.is_en_passant() {
            let victim = Square::from_file_rank(to.file(), from.rank());
            occupied = occupied.without(victim);
            removed = removed.with(victim);
        }

        let king = board.king_square(us);
        let king = if from == king { to } else { king };
        board.attackers_with(king, !us, occupied, removed).is_empty()
    }

    /// Whether `mv` is one of the legal moves of the position
    pub fn is_legal(board: &Board, mv: Move) -> bool {
        Self::legal_moves(board).contains(&mv)
    }
}
