//! Precomputed board masks: files, ranks, rays, attack sets, king zones,
//! castling-touch masks, piece-square tables, and evaluation weights.
//!
//! Everything here is computed at compile time with const builders; only
//! the Zobrist keys (which need an RNG) live elsewhere.

use crate::bits::bit;
use crate::geometry::{Dir, EAST, NORTH, NORTH_EAST, NORTH_WEST, SOUTH, SOUTH_EAST, SOUTH_WEST, WEST};
use crate::types::{
    sq, xc, yc, BLACK_CASTLE_MASK, BLACK_LONG, BLACK_SHORT, STATE_MASK, WHITE, WHITE_CASTLE_MASK,
    WHITE_LONG, WHITE_SHORT,
};

const fn file_mask(f: usize) -> u64 {
    0x0101_0101_0101_0101u64 << f
}

const fn rank_mask(r: usize) -> u64 {
    0xFFu64 << (8 * r)
}

pub const FILES: [u64; 8] = {
    let mut t = [0u64; 8];
    let mut f = 0;
    while f < 8 {
        t[f] = file_mask(f);
        f += 1;
    }
    t
};

pub const RANKS: [u64; 8] = {
    let mut t = [0u64; 8];
    let mut r = 0;
    while r < 8 {
        t[r] = rank_mask(r);
        r += 1;
    }
    t
};

const fn on_board(x: i32, y: i32) -> bool {
    x >= 0 && x < 8 && y >= 0 && y < 8
}

const fn build_ray(dx: i32, dy: i32) -> [u64; 64] {
    let mut t = [0u64; 64];
    let mut s = 0;
    while s < 64 {
        let mut x = xc(s) as i32 + dx;
        let mut y = yc(s) as i32 + dy;
        while on_board(x, y) {
            t[s] |= bit((x + 8 * y) as usize);
            x += dx;
            y += dy;
        }
        s += 1;
    }
    t
}

pub const NORTH_RAY: [u64; 64] = build_ray(0, 1);
pub const SOUTH_RAY: [u64; 64] = build_ray(0, -1);
pub const EAST_RAY: [u64; 64] = build_ray(1, 0);
pub const WEST_RAY: [u64; 64] = build_ray(-1, 0);
pub const NORTH_EAST_RAY: [u64; 64] = build_ray(1, 1);
pub const NORTH_WEST_RAY: [u64; 64] = build_ray(-1, 1);
pub const SOUTH_EAST_RAY: [u64; 64] = build_ray(1, -1);
pub const SOUTH_WEST_RAY: [u64; 64] = build_ray(-1, -1);

/// Full ray from `sqr` (exclusive) to the board edge along `dir`.
#[inline]
#[must_use]
pub fn ray(dir: Dir, sqr: usize) -> u64 {
    match dir {
        NORTH => NORTH_RAY[sqr],
        SOUTH => SOUTH_RAY[sqr],
        EAST => EAST_RAY[sqr],
        WEST => WEST_RAY[sqr],
        NORTH_EAST => NORTH_EAST_RAY[sqr],
        NORTH_WEST => NORTH_WEST_RAY[sqr],
        SOUTH_EAST => SOUTH_EAST_RAY[sqr],
        SOUTH_WEST => SOUTH_WEST_RAY[sqr],
        _ => 0,
    }
}

const fn build_wide(up: bool) -> [u64; 64] {
    let mut t = [0u64; 64];
    let mut s = 0;
    while s < 64 {
        let file = xc(s) as i32;
        let rank = yc(s) as i32;
        let mut f = file - 1;
        while f <= file + 1 {
            if f >= 0 && f < 8 {
                // Own file starts one rank ahead; adjacent files include
                // the current rank so phalanx neighbors count as support.
                let mut r = if f == file {
                    if up {
                        rank + 1
                    } else {
                        rank - 1
                    }
                } else {
                    rank
                };
                while on_board(f, r) {
                    t[s] |= bit((f + 8 * r) as usize);
                    r += if up { 1 } else { -1 };
                }
            }
            f += 1;
        }
        s += 1;
    }
    t
}

/// Own-file front span plus both adjacent files (current rank included).
pub const WIDE_NORTH: [u64; 64] = build_wide(true);
pub const WIDE_SOUTH: [u64; 64] = build_wide(false);

const fn build_pawn_atk(color: usize) -> [u64; 64] {
    let mut t = [0u64; 64];
    let mut s = 0;
    while s < 64 {
        let b = bit(s);
        t[s] = if color == WHITE {
            ((b & !file_mask(0)) << 7) | ((b & !file_mask(7)) << 9)
        } else {
            ((b & !file_mask(0)) >> 9) | ((b & !file_mask(7)) >> 7)
        };
        s += 1;
    }
    t
}

/// Squares attacked by a pawn of the given color standing on the square.
pub const PAWN_ATK: [[u64; 64]; 2] = [build_pawn_atk(0), build_pawn_atk(1)];

const fn build_leaper(deltas: &[(i32, i32)]) -> [u64; 64] {
    let mut t = [0u64; 64];
    let mut s = 0;
    while s < 64 {
        let mut i = 0;
        while i < deltas.len() {
            let x = xc(s) as i32 + deltas[i].0;
            let y = yc(s) as i32 + deltas[i].1;
            if on_board(x, y) {
                t[s] |= bit((x + 8 * y) as usize);
            }
            i += 1;
        }
        s += 1;
    }
    t
}

pub const KNIGHT_ATK: [u64; 64] = build_leaper(&[
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
]);

pub const KING_ATK: [u64; 64] = build_leaper(&[
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
]);

/// Left/right neighbors on the same rank.
pub const ADJACENT: [u64; 64] = build_leaper(&[(-1, 0), (1, 0)]);

const fn build_king_zone() -> [u64; 64] {
    let mut t = [0u64; 64];
    let mut s = 0;
    while s < 64 {
        let core = KING_ATK[s] | bit(s);
        t[s] = core | (core << 8) | (core >> 8);
        s += 1;
    }
    t
}

/// King square, its ring, and the ranks one step past the ring.
pub const KING_ZONE: [u64; 64] = build_king_zone();

pub const CENTER4: u64 = (file_mask(3) | file_mask(4)) & (rank_mask(3) | rank_mask(4));
pub const CENTER16: u64 = (file_mask(2) | file_mask(3) | file_mask(4) | file_mask(5))
    & (rank_mask(2) | rank_mask(3) | rank_mask(4) | rank_mask(5));

/// Three squares in each corner; minors trapped here lose extra mobility
/// value.
pub const CORNER12: u64 = {
    bit(sq::A1)
        | bit(sq::B1)
        | bit(sq::A2)
        | bit(sq::G1)
        | bit(sq::H1)
        | bit(sq::H2)
        | bit(sq::A7)
        | bit(sq::A8)
        | bit(sq::B8)
        | bit(sq::G8)
        | bit(sq::H8)
        | bit(sq::H7)
};

pub const LIGHT: u64 = 0x55AA_55AA_55AA_55AA;
pub const DARK: u64 = 0xAA55_AA55_AA55_AA55;

/// Candidate outpost squares per color: enemy-facing ranks, rim excluded.
pub const OUTPOST: [u64; 2] = [
    (rank_mask(3) | rank_mask(4) | rank_mask(5)) & !(file_mask(0) | file_mask(7)),
    (rank_mask(2) | rank_mask(3) | rank_mask(4)) & !(file_mask(0) | file_mask(7)),
];

const fn build_touch() -> [u32; 64] {
    let mut t = [STATE_MASK; 64];
    t[sq::A1] = STATE_MASK & !WHITE_LONG;
    t[sq::E1] = STATE_MASK & !WHITE_CASTLE_MASK;
    t[sq::H1] = STATE_MASK & !WHITE_SHORT;
    t[sq::A8] = STATE_MASK & !BLACK_LONG;
    t[sq::E8] = STATE_MASK & !BLACK_CASTLE_MASK;
    t[sq::H8] = STATE_MASK & !BLACK_SHORT;
    t
}

/// ANDed into the child state on every move; clears the castling right a
/// move from or onto the square would break, and always strips the derived
/// flags above the state mask.
pub const TOUCH: [u32; 64] = build_touch();

/// King-attack weight by number of attacking pieces, applied as a
/// percentage of the accumulated attack score. Saturates; the two-attacker
/// entry is halved by the evaluator itself.
pub const ATK_WEIGHT: [i32; 100] = {
    let head = [0, 0, 80, 120, 150, 170, 185, 195, 203, 209, 214, 218];
    let mut t = [220i32; 100];
    let mut i = 0;
    while i < head.len() {
        t[i] = head[i];
        i += 1;
    }
    t
};

/// Passed-pawn bonus by rank of progress (never indexed at 0 or 7 for an
/// actual pawn's own rank bonus of zero at both ends).
pub const PASSER_PROGRESS: [i32; 8] = [0, 12, 16, 24, 36, 56, 88, 0];

// ---------------------------------------------------------------------------
// Piece-square tables
// ---------------------------------------------------------------------------
//
// Source tables are written visually (rank 8 on the first line) from
// White's point of view; the builders flip them to square order and mirror
// them for Black so that the evaluation is exactly color-symmetric.

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,  0,   0,   0,  0,  0,  0,
    50, 50, 50,  50,  50, 50, 50, 50,
    10, 10, 20,  30,  30, 20, 10, 10,
     5,  5, 10,  25,  25, 10,  5,  5,
     0,  0,  0,  20,  20,  0,  0,  0,
     5, -5, -10,  0,   0,-10, -5,  5,
     5, 10, 10, -20, -20, 10, 10,  5,
     0,  0,  0,   0,   0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20,
    -10,   0,   0,  0,  0,   0,   0, -10,
    -10,   0,   5,  5,  5,   5,   0, -10,
     -5,   0,   5,  5,  5,   5,   0,  -5,
      0,   0,   5,  5,  5,   5,   0,  -5,
    -10,   5,   5,  5,  5,   5,   0, -10,
    -10,   0,   5,  0,  0,   0,   0, -10,
    -20, -10, -10, -5, -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_MID_TABLE: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

#[rustfmt::skip]
const KING_END_TABLE: [i32; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];

/// Visual (rank-8-first) table to white square order.
const fn to_white(t: &[i32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    let mut s = 0;
    while s < 64 {
        out[s] = t[s ^ 56];
        s += 1;
    }
    out
}

/// White square order to the mirrored black table.
const fn to_black(t: &[i32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    let mut s = 0;
    while s < 64 {
        out[s] = t[s ^ 56];
        s += 1;
    }
    out
}

const fn build_piece_sqr() -> [[i32; 64]; 12] {
    let mut t = [[0i32; 64]; 12];
    let pawn = to_white(&PAWN_TABLE);
    let knight = to_white(&KNIGHT_TABLE);
    let bishop = to_white(&BISHOP_TABLE);
    let rook = to_white(&ROOK_TABLE);
    let queen = to_white(&QUEEN_TABLE);
    t[2] = pawn;
    t[3] = to_black(&pawn);
    t[4] = knight;
    t[5] = to_black(&knight);
    t[6] = bishop;
    t[7] = to_black(&bishop);
    t[8] = rook;
    t[9] = to_black(&rook);
    t[10] = queen;
    t[11] = to_black(&queen);
    t
}

/// Piece-square values indexed by piece code (rows 0 and 1 unused; kings
/// are blended at evaluation time from the tables below).
pub const PIECE_SQR: [[i32; 64]; 12] = build_piece_sqr();

const fn build_king_sqr(visual: &[i32; 64]) -> [[i32; 64]; 2] {
    let white = to_white(visual);
    [white, to_black(&white)]
}

/// King midgame table per color.
pub const KING_SQR_MID: [[i32; 64]; 2] = build_king_sqr(&KING_MID_TABLE);
/// King endgame table per color.
pub const KING_SQR_END: [[i32; 64]; 2] = build_king_sqr(&KING_END_TABLE);

/// Piece-square value of a non-king piece on a square.
#[inline]
#[must_use]
pub fn square_value(piece: usize, sqr: usize) -> i32 {
    debug_assert!(piece >= 2 && piece < 12);
    PIECE_SQR[piece][sqr]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::count;
    use crate::types::sq::*;
    use crate::types::BLACK;

    #[test]
    fn ray_shapes() {
        assert_eq!(NORTH_RAY[A1], FILES[0] & !bit(A1));
        assert_eq!(count(NORTH_EAST_RAY[A1]), 7);
        assert_eq!(NORTH_RAY[H8], 0);
        assert_eq!(EAST_RAY[E4], bit(F4) | bit(G4) | bit(H4));
        assert_eq!(SOUTH_WEST_RAY[C3], bit(B2) | bit(A1));
    }

    #[test]
    fn attack_counts() {
        assert_eq!(count(KNIGHT_ATK[E4]), 8);
        assert_eq!(count(KNIGHT_ATK[A1]), 2);
        assert_eq!(count(KING_ATK[E4]), 8);
        assert_eq!(count(KING_ATK[A1]), 3);
        assert_eq!(PAWN_ATK[WHITE][E2], bit(D3) | bit(F3));
        assert_eq!(PAWN_ATK[BLACK][E7], bit(D6) | bit(F6));
        assert_eq!(PAWN_ATK[WHITE][A2], bit(B3));
        assert_eq!(PAWN_ATK[BLACK][H7], bit(G6));
    }

    #[test]
    fn wide_spans() {
        // e4's wide north span: e-file above e4, d/f files from rank 4 up.
        let w = WIDE_NORTH[E4];
        assert_ne!(w & bit(E5), 0);
        assert_ne!(w & bit(D4), 0);
        assert_ne!(w & bit(F7), 0);
        assert_eq!(w & bit(E4), 0);
        assert_eq!(w & bit(D3), 0);
        // Mirror symmetry between the two span tables.
        for s in 0..64 {
            let mirrored = WIDE_SOUTH[s ^ 56];
            let mut remapped = 0u64;
            let mut x = WIDE_NORTH[s];
            while x != 0 {
                let b = crate::bits::pop_low(&mut x);
                remapped |= bit(b ^ 56);
            }
            assert_eq!(remapped, mirrored, "wide span mismatch at {s}");
        }
    }

    #[test]
    fn center_and_corner_masks() {
        assert_eq!(CENTER4, bit(D4) | bit(E4) | bit(D5) | bit(E5));
        assert_eq!(count(CENTER16), 16);
        assert_eq!(count(CORNER12), 12);
        assert_eq!(LIGHT | DARK, !0);
        assert_eq!(LIGHT & DARK, 0);
        assert_ne!(DARK & bit(A1), 0);
    }

    #[test]
    fn touch_masks() {
        assert_eq!(TOUCH[E4], STATE_MASK);
        assert_eq!(TOUCH[E1] & WHITE_CASTLE_MASK, 0);
        assert_eq!(TOUCH[A8] & BLACK_LONG, 0);
        assert_ne!(TOUCH[A8] & BLACK_SHORT, 0);
    }

    #[test]
    fn pst_mirroring() {
        for s in 0..64 {
            assert_eq!(PIECE_SQR[2][s], PIECE_SQR[3][s ^ 56]);
            assert_eq!(PIECE_SQR[10][s], PIECE_SQR[11][s ^ 56]);
            assert_eq!(KING_SQR_MID[0][s], KING_SQR_MID[1][s ^ 56]);
            assert_eq!(KING_SQR_END[0][s], KING_SQR_END[1][s ^ 56]);
        }
        // Central pawn push is worth more than its home square.
        assert!(PIECE_SQR[2][E4] > PIECE_SQR[2][E2]);
    }
}
