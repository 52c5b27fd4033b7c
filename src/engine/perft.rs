//! Perft: count leaf nodes of the legal move tree

use crate::core::board::Board;
use crate::core::moves::Move;

use super::movegen::MoveGen;

/// Number of leaf nodes at `depth` plies below `board`
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = MoveGen::legal_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for &mv in &moves {
        board.apply(mv);
        nodes += perft(board, depth - 1);
        board.unapply();
    }
    nodes
}

/// Perft split by root move, in generation order
pub fn divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    MoveGen::legal_moves(board)
        .iter()
        .map(|&mv| {
            board.apply(mv);
            let nodes = perft(board, depth - 1);
            board.unapply();
            (mv, nodes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perft_startpos_shallow() {
        let mut board = Board::startpos();
        assert_eq!(perft(&mut board, 0), 1);
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8902);
        assert_eq!(board, Board::startpos());
    }

    #[test]
    fn test_divide_sums_to_perft() {
        let mut board = Board::startpos();
        let split = divide(&mut board, 3);
        assert_eq!(split.len(), 20);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 8902);
    }
}
