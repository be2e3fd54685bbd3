//! Zobrist hashing for chess positions.
//!
//! The hash is the XOR of per-feature random keys: one per piece/square
//! combination, one for the side to move, one per castling right, and one per
//! en-passant file. XOR-ing is its own inverse, so `apply_move` maintains the
//! hash incrementally in O(1), and the same keys allow a from-scratch
//! recomputation for consistency checks.

use crate::types::{Color, PieceKind};

/// Pre-computed random values for Zobrist hashing.
/// Generated at compile time from a fixed seed for reproducibility.
pub struct ZobristKeys {
    /// Keys indexed by [color][piece_kind][square].
    pub pieces: [[[u64; 64]; 6]; 2],
    /// XOR-ed in when black is to move.
    pub side_to_move: u64,
    /// Keys for castling rights, indexed by the bit position in the
    /// castling-rights bitfield [wk, wq, bk, bq].
    pub castling: [u64; 4],
    /// Keys for the en-passant file (0-7).
    pub en_passant: [u64; 8],
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl ZobristKeys {
    pub const fn new() -> Self {
        // xorshift64: fast, const-evaluable, and good enough key spread
        // for 781 keys.
        const fn xorshift64(mut state: u64) -> u64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        }

        let mut state = 0x9E3779B97F4A7C15u64; // fixed seed

        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut sq = 0;
                while sq < 64 {
                    state = xorshift64(state);
                    pieces[color][piece][sq] = state;
                    sq += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        state = xorshift64(state);
        let side_to_move = state;

        let mut castling = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            state = xorshift64(state);
            castling[i] = state;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            state = xorshift64(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    /// Key for a piece of the given color and kind on a square.
    #[inline(always)]
    pub fn piece_key(&self, color: Color, kind: PieceKind, sq: u8) -> u64 {
        self.pieces[color.idx()][kind.idx()][sq as usize]
    }

    /// Key for castling-right bit `index` (0=wk, 1=wq, 2=bk, 3=bq).
    #[inline(always)]
    pub fn castling_key(&self, index: usize) -> u64 {
        self.castling[index]
    }

    /// Key for an en-passant target on `file` (0-7).
    #[inline(always)]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }
}

/// Global static Zobrist keys, computed at compile time.
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

#[cfg(test)]
#[path = "zobrist_tests.rs"]
mod zobrist_tests;
