//! Transposition table.
//!
//! Direct-mapped, always-replace: an entry lives at `key & mask` and any
//! store overwrites whatever was there. No depth or age preference.

use crate::moves::Move;
use crate::types::INFINITY;

/// Primary flags partition the entry kind; `EXTENDED` and `FROM_PV` are
/// independent bits describing the storing node.
pub mod flag {
    pub const CHECKMATE: u8 = 0x01;
    pub const STALEMATE: u8 = 0x02;
    pub const UPPER_BOUND: u8 = 0x03;
    pub const EXACT_SCORE: u8 = 0x04;
    pub const LOWER_BOUND: u8 = 0x05;
    pub const PRIMARY_MASK: u8 = 0x07;

    pub const EXTENDED: u8 = 0x08;
    pub const FROM_PV: u8 = 0x10;
    pub const OTHER_MASK: u8 = 0x18;
}

#[derive(Clone, Copy, Default)]
pub struct HashEntry {
    pub position_key: u64,
    pub move_bits: u32,
    pub score: i16,
    pub depth: u8,
    pub flags: u8,
}

impl HashEntry {
    #[inline]
    #[must_use]
    pub const fn primary_flag(&self) -> u8 {
        self.flags & flag::PRIMARY_MASK
    }

    #[inline]
    #[must_use]
    pub const fn extended(&self) -> bool {
        self.flags & flag::EXTENDED != 0
    }

    #[inline]
    #[must_use]
    pub const fn from_pv(&self) -> bool {
        self.flags & flag::FROM_PV != 0
    }
}

pub struct TranspositionTable {
    entries: Vec<HashEntry>,
    key_mask: usize,
    stores: u64,
    hits: u64,
    checkmates: u64,
    stalemates: u64,
}

impl TranspositionTable {
    #[must_use]
    pub fn new(mbytes: usize) -> Self {
        let mut tt = TranspositionTable {
            entries: Vec::new(),
            key_mask: 0,
            stores: 0,
            hits: 0,
            checkmates: 0,
            stalemates: 0,
        };
        // A failed initial resize just leaves an empty (inert) table.
        let _ = tt.resize(mbytes);
        tt
    }

    /// Size the table to at most `mbytes` megabytes, snapping the entry
    /// count down to a power of two. Returns false (leaving the table
    /// empty) when the request is zero or overflows.
    pub fn resize(&mut self, mbytes: usize) -> bool {
        self.entries = Vec::new();
        self.key_mask = 0;

        let bytes = match (mbytes as u64).checked_mul(1024 * 1024) {
            Some(b) if b > 0 => b,
            _ => return false,
        };
        let count = bytes / std::mem::size_of::<HashEntry>() as u64;
        let high_bit = crate::bits::high_bit(count + 1);
        if high_bit <= 1 {
            return false;
        }

        self.key_mask = (high_bit - 1) as usize;
        self.entries = vec![HashEntry::default(); self.key_mask + 1];
        self.clear();
        true
    }

    pub fn clear(&mut self) {
        self.reset_counters();
        for entry in &mut self.entries {
            *entry = HashEntry::default();
        }
    }

    pub fn reset_counters(&mut self) {
        self.stores = 0;
        self.hits = 0;
        self.checkmates = 0;
        self.stalemates = 0;
    }

    #[must_use]
    pub fn probe(&mut self, key: u64) -> Option<HashEntry> {
        if key != 0 && !self.entries.is_empty() {
            let entry = self.entries[key as usize & self.key_mask];
            if entry.position_key == key {
                self.hits += 1;
                return Some(entry);
            }
        }
        None
    }

    pub fn store(&mut self, key: u64, best: Move, depth: i32, primary: u8, other_flags: u8) {
        debug_assert!(best.is_valid());
        debug_assert!(best.score.abs() < INFINITY);
        debug_assert!((0..256).contains(&depth));
        debug_assert!(
            primary == flag::LOWER_BOUND
                || primary == flag::UPPER_BOUND
                || primary == flag::EXACT_SCORE
        );
        debug_assert!(other_flags & !flag::OTHER_MASK == 0);

        if key != 0 && !self.entries.is_empty() {
            self.stores += 1;
            let entry = &mut self.entries[key as usize & self.key_mask];
            entry.position_key = key;
            entry.move_bits = best.bits();
            entry.score = best.score as i16;
            entry.depth = depth as u8;
            entry.flags = primary | other_flags;
        }
    }

    pub fn store_checkmate(&mut self, key: u64) {
        if key != 0 && !self.entries.is_empty() {
            self.checkmates += 1;
            let entry = &mut self.entries[key as usize & self.key_mask];
            entry.position_key = key;
            entry.move_bits = 0;
            entry.score = INFINITY as i16;
            entry.depth = 0;
            entry.flags = flag::CHECKMATE;
        }
    }

    pub fn store_stalemate(&mut self, key: u64) {
        if key != 0 && !self.entries.is_empty() {
            self.stalemates += 1;
            let entry = &mut self.entries[key as usize & self.key_mask];
            entry.position_key = key;
            entry.move_bits = 0;
            entry.score = 0;
            entry.depth = 0;
            entry.flags = flag::STALEMATE;
        }
    }

    #[must_use]
    pub fn stores(&self) -> u64 {
        self.stores
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn checkmates(&self) -> u64 {
        self.checkmates
    }

    #[must_use]
    pub fn stalemates(&self) -> u64 {
        self.stalemates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sq::*;
    use crate::types::{mt, PAWN, WHITE};

    fn sample_move(score: i32) -> Move {
        Move::new(mt::PAWN_LUNG, E2, E4, WHITE | PAWN, 0, 0, score)
    }

    #[test]
    fn store_then_probe_round_trips() {
        let mut tt = TranspositionTable::new(1);
        let mv = sample_move(123);
        tt.store(0xDEAD_BEEF, mv, 7, flag::EXACT_SCORE, flag::FROM_PV);

        let entry = tt.probe(0xDEAD_BEEF).expect("entry just stored");
        assert_eq!(entry.move_bits, mv.bits());
        assert_eq!(entry.score, 123);
        assert_eq!(entry.depth, 7);
        assert_eq!(entry.primary_flag(), flag::EXACT_SCORE);
        assert!(entry.from_pv());
        assert!(!entry.extended());
    }

    #[test]
    fn probe_of_unknown_key_misses(){
        let mut tt = TranspositionTable::new(1);
        assert!(tt.probe(0x1234_5678).is_none());
        tt.store(0x1234_5678, sample_move(0), 1, flag::LOWER_BOUND, 0);
        assert!(tt.probe(0x8765_4321 << 20).is_none());
        assert!(tt.probe(0).is_none());
    }

    #[test]
    fn always_replace() {
        let mut tt = TranspositionTable::new(1);
        // Two keys that collide on the same slot.
        let key_a = 0x40;
        let key_b = key_a + ((tt.key_mask as u64) + 1);
        tt.store(key_a, sample_move(1), 9, flag::EXACT_SCORE, 0);
        tt.store(key_b, sample_move(2), 1, flag::LOWER_BOUND, 0);
        assert!(tt.probe(key_a).is_none());
        assert_eq!(tt.probe(key_b).map(|e| e.score), Some(2));
    }

    #[test]
    fn terminal_stores() {
        let mut tt = TranspositionTable::new(1);
        tt.store_checkmate(77);
        let mate = tt.probe(77).expect("mate entry");
        assert_eq!(mate.primary_flag(), flag::CHECKMATE);
        assert_eq!(mate.score, INFINITY as i16);

        tt.store_stalemate(78);
        let stale = tt.probe(78).expect("stalemate entry");
        assert_eq!(stale.primary_flag(), flag::STALEMATE);
        assert_eq!(stale.score, 0);
        assert_eq!(tt.checkmates(), 1);
        assert_eq!(tt.stalemates(), 1);
    }

    #[test]
    fn resize_zero_fails() {
        let mut tt = TranspositionTable::new(1);
        assert!(!tt.resize(0));
        assert!(tt.probe(42).is_none());
    }

    #[test]
    fn clear_wipes_entries() {
        let mut tt = TranspositionTable::new(1);
        tt.store(99, sample_move(5), 3, flag::UPPER_BOUND, 0);
        tt.clear();
        assert!(tt.probe(99).is_none());
        assert_eq!(tt.stores(), 0);
    }
}
