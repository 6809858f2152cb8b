//! Zobrist hashing for positions.
//!
//! The position key is the XOR of one key per occupied square, one key for
//! the low state bits (side to move + castling rights), and one key for
//! the en-passant square (a dedicated key means "none").

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::types::PIECE_TYPE_COUNT;

pub struct Zobrist {
    /// One key per piece code per square (rows 0 and 1 are never indexed).
    pub piece: [[u64; 64]; PIECE_TYPE_COUNT],
    /// One key per value of `state & STATE_MASK`.
    pub state: [u64; 32],
    /// One key per en-passant square; index 64 is "no en passant".
    pub ep: [u64; 65],
}

impl Zobrist {
    fn new() -> Self {
        // Fixed seed keeps keys identical across runs so stored hashes and
        // test expectations stay valid.
        let mut rng = StdRng::seed_from_u64(0x5EED_0F00_7B17_F007);
        let mut piece = [[0u64; 64]; PIECE_TYPE_COUNT];
        let mut state = [0u64; 32];
        let mut ep = [0u64; 65];

        for row in &mut piece {
            for key in row.iter_mut() {
                *key = rng.gen();
            }
        }
        for key in &mut state {
            *key = rng.gen();
        }
        for key in &mut ep {
            *key = rng.gen();
        }

        Zobrist { piece, state, ep }
    }
}

pub static ZOBRIST: Lazy<Zobrist> = Lazy::new(Zobrist::new);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{sq, BLACK, KING, PAWN, WHITE};

    #[test]
    fn keys_are_distinct_and_stable() {
        let a = ZOBRIST.piece[WHITE | PAWN][sq::E2];
        let b = ZOBRIST.piece[BLACK | PAWN][sq::E2];
        let c = ZOBRIST.piece[WHITE | KING][sq::E1];
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        // Same lazily-built table on repeated access.
        assert_eq!(a, ZOBRIST.piece[WHITE | PAWN][sq::E2]);
    }

    #[test]
    fn xor_is_reversible() {
        let key = ZOBRIST.piece[WHITE | PAWN][sq::E2] ^ ZOBRIST.piece[WHITE | PAWN][sq::E4];
        let moved = key ^ ZOBRIST.piece[WHITE | PAWN][sq::E2];
        assert_eq!(moved, ZOBRIST.piece[WHITE | PAWN][sq::E4]);
    }
}
