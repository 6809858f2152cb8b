//! Packed move representation.
//!
//! A move is 32 bits — `type(4) | from(6) | to(6) | piece(4) | captured(4)
//! | promoted(4)` — carried next to a signed 32-bit ordering score. The
//! captured and promoted fields hold full piece codes.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{color_of, is_piece, mt, sqr_str, yc, BISHOP, KNIGHT, QUEEN, ROOK};

const FROM_SHIFT: u32 = 4;
const TO_SHIFT: u32 = 10;
const PC_SHIFT: u32 = 16;
const CAP_SHIFT: u32 = 20;
const PROMO_SHIFT: u32 = 24;

const FOUR_BITS: u32 = 0xF;
const SIX_BITS: u32 = 0x3F;

/// Packed move plus ordering score.
///
/// Two moves compare equal when they encode the same move regardless of
/// score; a cleared move compares equal to nothing, itself included.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    bits: u32,
    pub score: i32,
}

impl Move {
    pub const NONE: Move = Move { bits: 0, score: 0 };

    #[inline]
    #[must_use]
    pub fn new(
        kind: u32,
        from: usize,
        to: usize,
        piece: usize,
        cap: usize,
        promo: usize,
        score: i32,
    ) -> Self {
        debug_assert!(kind >= mt::NORMAL && kind <= mt::CASTLE_LONG);
        debug_assert!(from < 64 && to < 64 && from != to);
        debug_assert!(is_piece(piece));
        debug_assert!(cap == 0 || (cap >= 2 && cap < 12));
        debug_assert!(promo == 0 || (promo >= 4 && promo < 12));
        Move {
            bits: kind
                | (from as u32) << FROM_SHIFT
                | (to as u32) << TO_SHIFT
                | (piece as u32) << PC_SHIFT
                | (cap as u32) << CAP_SHIFT
                | (promo as u32) << PROMO_SHIFT,
            score,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32, score: i32) -> Self {
        Move { bits, score }
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> u32 {
        self.bits & FOUR_BITS
    }

    #[inline]
    #[must_use]
    pub const fn from(self) -> usize {
        ((self.bits >> FROM_SHIFT) & SIX_BITS) as usize
    }

    #[inline]
    #[must_use]
    pub const fn to(self) -> usize {
        ((self.bits >> TO_SHIFT) & SIX_BITS) as usize
    }

    /// Piece code of the mover.
    #[inline]
    #[must_use]
    pub const fn pc(self) -> usize {
        ((self.bits >> PC_SHIFT) & FOUR_BITS) as usize
    }

    /// Piece code of the captured piece, or 0.
    #[inline]
    #[must_use]
    pub const fn cap(self) -> usize {
        ((self.bits >> CAP_SHIFT) & FOUR_BITS) as usize
    }

    /// Piece code promoted to, or 0.
    #[inline]
    #[must_use]
    pub const fn promo(self) -> usize {
        ((self.bits >> PROMO_SHIFT) & FOUR_BITS) as usize
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.kind() != mt::NONE && self.from() != self.to()
    }

    /// True when the move captures or promotes (the noisy-move test used
    /// for quiescence, history, and killer bookkeeping).
    #[inline]
    #[must_use]
    pub const fn is_cap_or_promo(self) -> bool {
        self.bits & 0x0FF0_0000 != 0
    }

    /// 16-bit history index: from, to, and the low bits of the mover code.
    #[inline]
    #[must_use]
    pub const fn history_index(self) -> usize {
        ((self.bits >> FROM_SHIFT) & 0xFFFF) as usize
    }

    /// True for a pawn push onto the rank before promotion.
    #[inline]
    #[must_use]
    pub fn is_seventh_rank_push(self) -> bool {
        let promo_side = color_of(self.pc());
        self.pc() & !1 == crate::types::PAWN && yc(self.to()) == if promo_side == 0 { 6 } else { 1 }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bits = 0;
        self.score = 0;
    }

    pub fn swap_with(&mut self, other: &mut Move) {
        std::mem::swap(self, other);
    }
}

impl PartialEq for Move {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bits != 0 && self.bits == other.bits
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NONE
    }
}

impl fmt::Display for Move {
    /// Coordinate notation: `e2e4`, `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }
        write!(f, "{}{}", sqr_str(self.from()), sqr_str(self.to()))?;
        match self.promo() & !1 {
            KNIGHT => write!(f, "n"),
            BISHOP => write!(f, "b"),
            ROOK => write!(f, "r"),
            QUEEN => write!(f, "q"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sq::*;
    use crate::types::{mt, BLACK, PAWN, QUEEN, ROOK, WHITE};

    #[test]
    fn pack_unpack_round_trip() {
        for kind in mt::NORMAL..=mt::CASTLE_LONG {
            for &(from, to) in &[(A1, H8), (E2, E4), (H7, H8), (B8, A8)] {
                for &piece in &[WHITE | PAWN, BLACK | QUEEN, WHITE | ROOK] {
                    for &cap in &[0, BLACK | PAWN, WHITE | ROOK] {
                        for &promo in &[0, WHITE | QUEEN, BLACK | ROOK] {
                            for &score in &[0, -32_000, 31_999, 17] {
                                let m = Move::new(kind, from, to, piece, cap, promo, score);
                                assert_eq!(m.kind(), kind);
                                assert_eq!(m.from(), from);
                                assert_eq!(m.to(), to);
                                assert_eq!(m.pc(), piece);
                                assert_eq!(m.cap(), cap);
                                assert_eq!(m.promo(), promo);
                                assert_eq!(m.score, score);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn equality_ignores_score_and_null_matches_nothing() {
        let a = Move::new(mt::NORMAL, E2, E4, WHITE | PAWN, 0, 0, 10);
        let b = Move::new(mt::NORMAL, E2, E4, WHITE | PAWN, 0, 0, -500);
        assert_eq!(a, b);
        assert_ne!(a, Move::NONE);
        assert_ne!(Move::NONE, Move::NONE);
    }

    #[test]
    fn coordinate_form() {
        let m = Move::new(mt::PAWN_LUNG, E2, E4, WHITE | PAWN, 0, 0, 0);
        assert_eq!(m.to_string(), "e2e4");
        let p = Move::new(mt::PAWN_PUSH, E7, E8, WHITE | PAWN, 0, WHITE | QUEEN, 0);
        assert_eq!(p.to_string(), "e7e8q");
        assert_eq!(Move::NONE.to_string(), "");
    }

    #[test]
    fn cap_or_promo_flag() {
        let quiet = Move::new(mt::NORMAL, B1, C3, WHITE | 4, 0, 0, 0);
        assert!(!quiet.is_cap_or_promo());
        let cap = Move::new(mt::NORMAL, B1, C3, WHITE | 4, BLACK | PAWN, 0, 0);
        assert!(cap.is_cap_or_promo());
        let promo = Move::new(mt::PAWN_PUSH, E7, E8, WHITE | PAWN, 0, WHITE | QUEEN, 0);
        assert!(promo.is_cap_or_promo());
    }

    #[test]
    fn history_index_is_16_bits() {
        let m = Move::new(mt::NORMAL, H8, A1, BLACK | QUEEN, 0, 0, 0);
        assert!(m.history_index() < 0x10000);
    }
}
