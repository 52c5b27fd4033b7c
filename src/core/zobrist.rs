//! Zobrist hashing keys
//!
//! Keys are generated at compile time from a fixed splitmix64 stream, so
//! hashes are identical across runs and threads.

use super::types::{CastlingRights, Color, Piece, Square};

pub struct ZobristKeys {
    pieces: [[u64; 64]; 12],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static KEYS: ZobristKeys = ZobristKeys::generate(0x9E37_79B9_7F4A_7C15);

const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (state, z ^ (z >> 31))
}

impl ZobristKeys {
    #[inline]
    pub fn get() -> &'static ZobristKeys {
        &KEYS
    }

    const fn generate(seed: u64) -> Self {
        let mut state = seed;
        let mut pieces = [[0u64; 64]; 12];
        let mut p = 0;
        while p < 12 {
            let mut sq = 0;
            while sq < 64 {
                let (next, key) = splitmix64(state);
                state = next;
                pieces[p][sq] = key;
                sq += 1;
            }
            p += 1;
        }

        let (next, black_to_move) = splitmix64(state);
        state = next;

        // Combined rights hash as the xor of their single-right keys, so
        // removing one right is a single xor pair.
        let mut singles = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            let (next, key) = splitmix64(state);
            state = next;
            singles[i] = key;
            i += 1;
        }
        let mut castling = [0u64; 16];
        let mut mask = 0;
        while mask < 16 {
            let mut bit = 0;
            while bit < 4 {
                if mask & (1 << bit) != 0 {
                    castling[mask] ^= singles[bit];
                }
                bit += 1;
            }
            mask += 1;
        }

        let mut en_passant_file = [0u64; 8];
        let mut f = 0;
        while f < 8 {
            let (next, key) = splitmix64(state);
            state = next;
            en_passant_file[f] = key;
            f += 1;
        }

        ZobristKeys { pieces, black_to_move, castling, en_passant_file }
    }

    #[inline]
    pub fn piece(&self, piece: Piece, sq: Square) -> u64 {
        self.pieces[piece.index()][sq.index()]
    }

    #[inline]
    pub fn side(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    #[inline]
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.bits() as usize]
    }

    #[inline]
    pub fn en_passant(&self, sq: Square) -> u64 {
        self.en_passant_file[sq.file() as usize]
    }
}
