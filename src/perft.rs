//! Perft: exhaustive legal-move leaf counts, the reference test for the
//! move generator.

use std::sync::atomic::Ordering;

use crate::search::SearchCtx;

impl SearchCtx<'_> {
    /// Count leaf nodes `depth` plies below `ply`.
    pub fn perft(&mut self, ply: usize, depth: i32) -> u64 {
        self.generate_all(ply);
        if ply + 1 >= self.nodes.len() || depth <= 1 {
            return self.nodes[ply].move_count as u64;
        }

        let mut count = 0;
        for i in 0..self.nodes[ply].move_count {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let mv = self.nodes[ply].moves[i];
            self.exec_move(ply, mv);
            count += self.perft(ply + 1, depth - 1);
            self.undo_move(ply, mv);
        }
        count
    }

    /// Root perft with a per-move split, printed in coordinate order.
    pub fn perft_root(&mut self, depth: i32) -> u64 {
        self.generate_all(0);
        self.nodes[0].sort_moves_lexically();

        let mut count = 0;
        if depth > 1 && self.nodes.len() > 1 {
            for i in 0..self.nodes[0].move_count {
                if self.stop.load(Ordering::Relaxed) {
                    break;
                }
                let mv = self.nodes[0].moves[i];
                self.exec_move(0, mv);
                let sub = self.perft(1, depth - 1);
                self.undo_move(0, mv);
                if !self.silent {
                    println!("{mv} {sub}");
                }
                count += sub;
            }
        } else {
            for i in 0..self.nodes[0].move_count {
                let mv = self.nodes[0].moves[i];
                if !self.silent {
                    println!("{mv} 1");
                }
                count += 1;
            }
        }
        count
    }
}
