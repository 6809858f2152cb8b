//! Alpha-beta search with quiescence.
//!
//! Two mutually recursive routines walk the node stack: `search` (full
//! width with pruning, reductions, and extensions) and `qsearch`
//! (captures, promotions, evasions, and one ply of checks). The root runs
//! iterative deepening with aspiration windows and promotes each new best
//! move to the front of the move list.
//!
//! Cancellation is cooperative: a shared stop flag (or an expired
//! deadline) makes every in-flight call unwind by returning beta.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::bits::{low_square, multi_bit};
use crate::exec::{exec, exec_null, undo};
use crate::geometry::dir;
use crate::history::{History, SeenSet};
use crate::movegen::{MoveGen, ALL_MOVES, QUIESCENCE};
use crate::moves::Move;
use crate::node::Node;
use crate::params::Params;
use crate::stats::Stats;
use crate::tables::ray;
use crate::tt::{flag, TranspositionTable};
use crate::types::{
    threat_bit, PieceBoard, INFINITY, KING, MATE_SCORE, MAX_PLIES, VALUE_OF, WINNING_SCORE,
};

/// Live search state shared with the UCI front end.
#[derive(Clone, Default)]
pub struct Progress {
    pub depth: i32,
    pub seldepth: i32,
    pub nodes: u64,
    pub qnodes: u64,
    pub msecs: u64,
    pub movenum: usize,
    pub currmove: String,
}

/// Everything a single search needs, borrowed from the engine for its
/// duration. Single-threaded; the only cross-thread signals are the stop
/// and ponder flags.
pub struct SearchCtx<'a> {
    pub nodes: &'a mut [Node],
    pub board: &'a mut PieceBoard,
    pub seen: &'a mut SeenSet,
    pub hist: &'a mut History,
    pub tt: &'a mut TranspositionTable,
    pub stats: &'a mut Stats,
    pub params: Params,
    pub stop: &'a AtomicBool,
    pub pondering: Option<&'a AtomicBool>,
    pub deadline: Option<Instant>,
    pub start: Instant,
    pub depth: i32,
    pub seldepth: i32,
    pub movenum: usize,
    pub currmove: String,
    pub draw_score: [i32; 2],
    pub progress: Option<&'a Mutex<Progress>>,
    pub silent: bool,
    halt: bool,
}

impl<'a> SearchCtx<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nodes: &'a mut [Node],
        board: &'a mut PieceBoard,
        seen: &'a mut SeenSet,
        hist: &'a mut History,
        tt: &'a mut TranspositionTable,
        stats: &'a mut Stats,
        params: Params,
        stop: &'a AtomicBool,
    ) -> Self {
        let stm = nodes[0].color_to_move();
        let mut draw_score = [0; 2];
        draw_score[stm] = -params.contempt;
        draw_score[stm ^ 1] = params.contempt;
        SearchCtx {
            nodes,
            board,
            seen,
            hist,
            tt,
            stats,
            params,
            stop,
            pondering: None,
            deadline: None,
            start: Instant::now(),
            depth: 0,
            seldepth: 0,
            movenum: 0,
            currmove: String::new(),
            draw_score,
            progress: None,
            silent: false,
            halt: false,
        }
    }

    /// Poll the stop signals. The deadline is only consulted every 1024
    /// nodes, and never while pondering; once any signal fires the result
    /// latches so the whole stack unwinds.
    fn stopped(&mut self) -> bool {
        if self.halt {
            return true;
        }
        if self.stop.load(Ordering::Relaxed) {
            self.halt = true;
            return true;
        }
        if let Some(deadline) = self.deadline {
            let pondering = self.pondering.is_some_and(|p| p.load(Ordering::Relaxed));
            if !pondering && self.stats.total_nodes().trailing_zeros() >= 10 {
                if Instant::now() >= deadline {
                    self.halt = true;
                    return true;
                }
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Node-stack plumbing
    // -----------------------------------------------------------------------

    pub(crate) fn exec_move(&mut self, ply: usize, mv: Move) {
        let (head, tail) = self.nodes.split_at_mut(ply + 1);
        exec(
            &head[ply],
            &mut tail[0],
            self.board,
            self.seen,
            mv,
            &self.params,
            self.stats,
        );
    }

    pub(crate) fn undo_move(&mut self, ply: usize, mv: Move) {
        undo(&self.nodes[ply], self.board, self.seen, mv);
    }

    fn exec_null_move(&mut self, ply: usize) {
        let (head, tail) = self.nodes.split_at_mut(ply + 1);
        exec_null(&head[ply], &mut tail[0], &self.params, self.stats);
    }

    pub(crate) fn next_move(&mut self, ply: usize, gen_type: u32, depth: i32) -> Option<Move> {
        let mut gen = MoveGen {
            node: &mut self.nodes[ply],
            board: &mut *self.board,
            hist: &*self.hist,
        };
        gen.next_move(gen_type, depth)
    }

    pub(crate) fn generate_all(&mut self, ply: usize) {
        let mut gen = MoveGen {
            node: &mut self.nodes[ply],
            board: &mut *self.board,
            hist: &*self.hist,
        };
        gen.generate_all();
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let (head, tail) = self.nodes.split_at_mut(ply + 1);
        let node = &mut head[ply];
        node.pv[0] = mv;
        match tail.first() {
            Some(child) if child.pv_count > 0 => {
                let len = child.pv_count;
                debug_assert!(len + 1 <= MAX_PLIES);
                node.pv[1..=len].copy_from_slice(&child.pv[..len]);
                node.pv_count = len + 1;
            }
            _ => node.pv_count = 1,
        }
    }

    fn publish_progress(&self) {
        if let Some(progress) = self.progress {
            let mut p = progress.lock();
            p.depth = self.depth;
            p.seldepth = self.seldepth;
            p.nodes = self.stats.snodes;
            p.qnodes = self.stats.qnodes;
            p.msecs = self.start.elapsed().as_millis() as u64;
            p.movenum = self.movenum;
            p.currmove = self.currmove.clone();
        }
    }

    /// Emit a UCI info line for the current PV (bound > 0 reports a
    /// lowerbound, bound < 0 an upperbound).
    fn output_pv(&self, score: i32, bound: i32) {
        if self.nodes[0].pv_count == 0 || self.silent {
            return;
        }
        let msecs = self.start.elapsed().as_millis() as u64;
        let total = self.stats.total_nodes();
        let nps = if msecs > 0 { total * 1000 / msecs } else { total };

        let mut line = format!(
            "info depth {} seldepth {} nodes {} time {} nps {}",
            self.depth, self.seldepth, total, msecs, nps
        );
        if bound != 0 {
            line.push_str(&format!(
                " currmovenumber {} currmove {}",
                self.movenum, self.currmove
            ));
        }
        if score.abs() < MATE_SCORE {
            line.push_str(&format!(" score cp {score}"));
        } else {
            let moves_left = (INFINITY - score.abs() + 1) / 2;
            let mate = if score < 0 { -moves_left } else { moves_left };
            line.push_str(&format!(" score mate {mate}"));
        }
        if bound != 0 {
            line.push_str(if bound < 0 { " upperbound" } else { " lowerbound" });
        } else {
            line.push_str(" pv");
            for mv in &self.nodes[0].pv[..self.nodes[0].pv_count] {
                line.push_str(&format!(" {mv}"));
            }
        }
        println!("{line}");
    }

    // -----------------------------------------------------------------------
    // Quiescence
    // -----------------------------------------------------------------------

    pub fn qsearch(&mut self, ply: usize, mut alpha: i32, beta: i32, depth: i32) -> i32 {
        debug_assert!(alpha < beta);
        debug_assert!(depth <= 0);

        self.stats.qnodes += 1;
        if ply as i32 > self.seldepth {
            self.seldepth = ply as i32;
        }

        self.nodes[ply].pv_count = 0;
        let color = self.nodes[ply].color_to_move();
        if self.nodes[ply].is_draw(self.seen) {
            return self.draw_score[color];
        }

        // Stand pat (or mate-distance floor when in check).
        let check = self.nodes[ply].in_check();
        let mut best = if check {
            ply as i32 - INFINITY
        } else {
            self.nodes[ply].stand_pat
        };
        if best >= beta || ply + 1 >= self.nodes.len() {
            return best;
        }
        if best > alpha {
            alpha = best;
        }

        let key = self.nodes[ply].position_key;
        let mut first_move = Move::NONE;
        if let Some(entry) = self.tt.probe(key) {
            let score = entry.score as i32;
            match entry.primary_flag() {
                flag::CHECKMATE => return ply as i32 - INFINITY,
                flag::STALEMATE => return self.draw_score[color],
                flag::UPPER_BOUND => {
                    first_move = Move::from_bits(entry.move_bits, score);
                    if score <= alpha {
                        self.nodes[ply].pv[0] = first_move;
                        self.nodes[ply].pv_count = 1;
                        return score;
                    }
                }
                flag::EXACT_SCORE => {
                    first_move = Move::from_bits(entry.move_bits, score);
                    self.nodes[ply].pv[0] = first_move;
                    self.nodes[ply].pv_count = 1;
                    if score >= beta && !first_move.is_cap_or_promo() {
                        self.nodes[ply].add_killer(first_move);
                    }
                    return score;
                }
                flag::LOWER_BOUND => {
                    first_move = Move::from_bits(entry.move_bits, score);
                    if score >= beta {
                        self.nodes[ply].pv[0] = first_move;
                        self.nodes[ply].pv_count = 1;
                        if !first_move.is_cap_or_promo() {
                            self.nodes[ply].add_killer(first_move);
                        }
                        return score;
                    }
                }
                _ => debug_assert!(false, "bad primary flag"),
            }
            // Only noisy hash moves are worth trying in quiescence, unless
            // we are evading check.
            if !check && !first_move.is_cap_or_promo() {
                first_move.clear();
            }
        }

        let orig_alpha = alpha;
        if first_move.is_valid() {
            self.stats.qexecs += 1;
            self.exec_move(ply, first_move);
            first_move.score = -self.qsearch(ply + 1, -beta, -alpha, depth - 1);
            self.undo_move(ply, first_move);
            if self.stopped() {
                return beta;
            }
            if first_move.score >= best {
                best = first_move.score;
                self.update_pv(ply, first_move);
                if first_move.score >= beta {
                    if !first_move.is_cap_or_promo() {
                        self.nodes[ply].add_killer(first_move);
                    }
                    if check {
                        first_move.score = beta;
                        self.tt.store(key, first_move, 0, flag::LOWER_BOUND, 0);
                    }
                    return best;
                }
                if first_move.score > alpha {
                    alpha = first_move.score;
                }
            }
        }

        self.nodes[ply].init_movegen(QUIESCENCE);
        while let Some(mut mv) = self.next_move(ply, QUIESCENCE, depth) {
            if mv == first_move {
                continue;
            }

            self.stats.qexecs += 1;
            self.exec_move(ply, mv);

            // Delta pruning: a quiet capture that cannot reach alpha even
            // with the margin is not worth searching.
            if self.params.delta != 0
                && !check
                && depth < 0
                && mv.promo() == 0
                && !self.nodes[ply + 1].in_check()
                && self.nodes[ply].stand_pat + VALUE_OF[mv.cap()] + self.params.delta < alpha
            {
                self.undo_move(ply, mv);
                if self.stopped() {
                    return beta;
                }
                self.stats.delta_count += 1;
                continue;
            }

            mv.score = -self.qsearch(ply + 1, -beta, -alpha, depth - 1);
            self.undo_move(ply, mv);
            if self.stopped() {
                return beta;
            }

            if mv.score > best {
                best = mv.score;
                self.update_pv(ply, mv);
                if mv.score >= beta {
                    if !mv.is_cap_or_promo() {
                        self.nodes[ply].add_killer(mv);
                    }
                    if check {
                        mv.score = beta;
                        self.tt.store(key, mv, 0, flag::LOWER_BOUND, 0);
                    }
                    return best;
                }
                if mv.score > alpha {
                    alpha = mv.score;
                }
            }
        }

        debug_assert!(best <= alpha);
        debug_assert!(alpha < beta);

        if check {
            if self.nodes[ply].move_count == 0 {
                self.tt.store_checkmate(key);
                return ply as i32 - INFINITY;
            }
            // Evasion nodes are worth remembering; quiet quiescence nodes
            // are not recorded at all.
            if self.nodes[ply].pv_count > 0 {
                let mut pv0 = self.nodes[ply].pv[0];
                if alpha > orig_alpha {
                    debug_assert_eq!(pv0.score, alpha);
                    self.tt.store(key, pv0, 0, flag::EXACT_SCORE, 0);
                } else {
                    pv0.score = alpha;
                    self.tt.store(key, pv0, 0, flag::UPPER_BOUND, 0);
                }
            }
        }

        best
    }

    // -----------------------------------------------------------------------
    // Full-width search
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    pub fn search(
        &mut self,
        ply: usize,
        mut alpha: i32,
        beta: i32,
        mut depth: i32,
        cut_node: bool,
    ) -> i32 {
        debug_assert!(alpha < beta);
        debug_assert!(depth > 0);
        debug_assert!(ply > 0);

        self.stats.snodes += 1;
        self.nodes[ply].extended = 0;
        self.nodes[ply].reduced = 0;
        self.nodes[ply].pv_count = 0;

        let color = self.nodes[ply].color_to_move();
        if self.nodes[ply].is_draw(self.seen) {
            return self.draw_score[color];
        }

        // Mate-distance pruning / node-stack exhaustion.
        let mut best = ply as i32 - INFINITY;
        if best >= beta || ply + 1 >= self.nodes.len() {
            return best;
        }
        if best > alpha {
            alpha = best;
        }

        let check = self.nodes[ply].in_check();
        let parent_extended = self.nodes[ply - 1].extended;

        // Check extension: always on double check, otherwise when the
        // check leaves at most one king flight square.
        if self.params.check_ext && check && parent_extended == 0 {
            if multi_bit(self.nodes[ply].chkrs) != 0 {
                self.stats.chk_exts += 1;
                self.nodes[ply].extended += 1;
                depth += 1;
            } else {
                let node = &self.nodes[ply];
                let mut dests =
                    node.atks[color | KING] & !node.atks[color ^ 1] & !node.pc[color];
                if dests != 0 {
                    let from = low_square(node.chkrs);
                    let d = dir(from, node.king[color]);
                    if d != 0 {
                        dests &= !ray(d, from);
                    }
                }
                if multi_bit(dests) == 0 {
                    self.stats.chk_exts += 1;
                    self.nodes[ply].extended += 1;
                    depth += 1;
                }
            }
        }

        // Threat extension: the evaluation flagged a new mate threat
        // against the enemy king that the parent did not have.
        if self.params.test > 1
            && self.nodes[ply].extended == 0
            && parent_extended == 0
            && self.nodes[ply].state & threat_bit(color ^ 1) != 0
            && self.nodes[ply - 1].state & threat_bit(color ^ 1) == 0
        {
            self.stats.threat_exts += 1;
            self.nodes[ply].extended += 1;
            depth += 1;
        }

        let pv_node = alpha + 1 < beta;
        let key = self.nodes[ply].position_key;
        let mut first_move = Move::NONE;
        if let Some(entry) = self.tt.probe(key) {
            let score = entry.score as i32;
            let entry_depth = entry.depth as i32;
            match entry.primary_flag() {
                flag::CHECKMATE => return ply as i32 - INFINITY,
                flag::STALEMATE => return self.draw_score[color],
                flag::UPPER_BOUND => {
                    first_move = Move::from_bits(entry.move_bits, score);
                    if (!pv_node || entry.from_pv()) && entry_depth >= depth && score <= alpha {
                        self.nodes[ply].pv[0] = first_move;
                        self.nodes[ply].pv_count = 1;
                        return score;
                    }
                    if entry_depth >= depth - 3 && score < beta {
                        self.nodes[ply].null_move_ok = false;
                    }
                }
                flag::EXACT_SCORE => {
                    first_move = Move::from_bits(entry.move_bits, score);
                    if entry_depth >= depth {
                        self.nodes[ply].pv[0] = first_move;
                        self.nodes[ply].pv_count = 1;
                        if score >= beta && !first_move.is_cap_or_promo() {
                            self.hist.inc(first_move, check, entry_depth);
                            self.nodes[ply].add_killer(first_move);
                        }
                        return score;
                    }
                    if entry_depth >= depth - 3 && score < beta {
                        self.nodes[ply].null_move_ok = false;
                    }
                }
                flag::LOWER_BOUND => {
                    first_move = Move::from_bits(entry.move_bits, score);
                    if (!pv_node || entry.from_pv()) && entry_depth >= depth && score >= beta {
                        self.nodes[ply].pv[0] = first_move;
                        self.nodes[ply].pv_count = 1;
                        if !first_move.is_cap_or_promo() {
                            self.hist.inc(first_move, check, entry_depth);
                            self.nodes[ply].add_killer(first_move);
                        }
                        return score;
                    }
                }
                _ => debug_assert!(false, "bad primary flag"),
            }
            if entry.extended() && self.nodes[ply].extended == 0 && parent_extended == 0 {
                self.stats.hash_exts += 1;
                self.nodes[ply].extended += 1;
                depth += 1;
            }
        }

        // Razoring: hopelessly below alpha near the horizon, and the
        // quiescence search finds no saving tactic.
        if self.params.razor != 0
            && !check
            && !pv_node
            && !first_move.is_valid()
            && depth <= 2
            && alpha.abs() < WINNING_SCORE
            && self.nodes[ply].stand_pat + self.params.razor + 64 * (depth - 1) < alpha
        {
            self.stats.rzr_count += 1;
            let eval = self.qsearch(ply, alpha, beta, 0);
            if self.stopped() {
                return beta;
            }
            if eval <= alpha {
                self.stats.rzr_cutoffs += 1;
                return eval;
            }
        }

        // Null-move pruning: if standing pat beats beta even after giving
        // the opponent a free move, fail hard.
        if self.params.null_move
            && self.nodes[ply].null_move_ok
            && !check
            && !pv_node
            && depth > 1
            && self.nodes[ply].stand_pat >= beta
            && beta.abs() < WINNING_SCORE
            && self.nodes[ply].majors_and_minors(color) != 0
        {
            self.exec_null_move(ply);
            self.nodes[ply + 1].null_move_ok = false;
            let reduction = 3 + depth / 6 + i32::from(self.nodes[ply].stand_pat - beta >= 400);
            let rdepth = 0.max(depth - reduction);
            let eval = if rdepth > 0 {
                -self.search(ply + 1, -beta, 1 - beta, rdepth, false)
            } else {
                -self.qsearch(ply + 1, -beta, 1 - beta, 0)
            };
            if self.stopped() {
                return beta;
            }
            if eval >= beta {
                self.nodes[ply].pv_count = 0;
                self.stats.nm_cutoffs += 1;
                return beta;
            }
        }

        // Internal iterative deepening when the table gave us no move.
        if self.params.iid
            && !check
            && !first_move.is_valid()
            && beta < INFINITY
            && depth > if pv_node { 3 } else { 5 }
        {
            self.stats.iid_count += 1;
            let saved = self.nodes[ply].null_move_ok;
            self.nodes[ply].null_move_ok = false;
            let eval = self.search(
                ply,
                beta - 1,
                beta,
                depth - if pv_node { 2 } else { 4 },
                true,
            );
            self.nodes[ply].null_move_ok = saved;
            if self.stopped() || self.nodes[ply].pv_count == 0 {
                return eval;
            }
            if eval >= beta {
                self.stats.iid_beta += 1;
            }
            first_move = self.nodes[ply].pv[0];
        }

        // Make sure we have a first move (and detect mate/stalemate).
        self.nodes[ply].init_movegen(ALL_MOVES);
        if !first_move.is_valid() {
            match self.next_move(ply, ALL_MOVES, depth) {
                None => {
                    debug_assert_eq!(self.nodes[ply].move_count, 0);
                    if check {
                        self.tt.store_checkmate(key);
                        return ply as i32 - INFINITY;
                    }
                    self.tt.store_stalemate(key);
                    return self.draw_score[color];
                }
                Some(mv) => {
                    first_move = mv;
                    if self.params.one_reply
                        && self.nodes[ply].move_count == 1
                        && self.nodes[ply].extended == 0
                    {
                        self.stats.one_reply_exts += 1;
                        self.nodes[ply].extended += 1;
                        depth += 1;
                    }
                }
            }
        }

        let tt_flags = |extended: i32, pv_node: bool| -> u8 {
            (if extended != 0 { flag::EXTENDED } else { 0 })
                | (if pv_node { flag::FROM_PV } else { 0 })
        };

        // First move gets the full window.
        let orig_alpha = alpha;
        self.exec_move(ply, first_move);
        self.nodes[ply + 1].null_move_ok = true;
        let mut eval = if depth > 1 {
            -self.search(ply + 1, -beta, -alpha, depth - 1, !cut_node)
        } else {
            -self.qsearch(ply + 1, -beta, -alpha, 0)
        };
        self.undo_move(ply, first_move);
        if self.stopped() {
            return beta;
        }
        if eval > alpha {
            alpha = eval;
        }
        if eval >= best {
            best = eval;
            first_move.score = eval;
            self.update_pv(ply, first_move);
            if eval >= beta {
                if !first_move.is_cap_or_promo() {
                    self.hist.inc(first_move, check, depth);
                    self.nodes[ply].add_killer(first_move);
                }
                first_move.score = beta;
                let flags = tt_flags(self.nodes[ply].extended, pv_node);
                self.tt.store(key, first_move, depth, flag::LOWER_BOUND, flags);
                return best;
            }
        } else if !first_move.is_cap_or_promo() {
            self.hist.dec(first_move, check);
        }

        let lmr_ok =
            self.params.lmr != 0 && !pv_node && !check && depth > self.params.lmr + 1;
        let mut pv_depth = depth;

        // Remaining moves: null-window probes with late-move reductions,
        // re-searched on surprise.
        while let Some(mut mv) = self.next_move(ply, ALL_MOVES, depth) {
            if mv == first_move {
                continue;
            }

            self.exec_move(ply, mv);

            self.stats.late_moves += 1;
            if lmr_ok {
                self.stats.lm_candidates += 1;
            }
            let hist_val = self.hist.value(mv);
            let mut reduced = 0;
            if lmr_ok
                && !mv.is_cap_or_promo()
                && !self.nodes[ply + 1].in_check()
                && !self.nodes[ply].is_killer(mv)
                && !mv.is_seventh_rank_push()
                && hist_val < 0
            {
                self.stats.lm_reductions += 1;
                reduced = self.params.lmr;
                if depth > reduced + 1 && hist_val < -1 {
                    self.stats.lm_double_red += 1;
                    reduced += 1;
                }
            }
            self.nodes[ply].reduced = reduced;

            let new_depth = depth - 1 - reduced;
            self.nodes[ply + 1].null_move_ok = true;
            eval = if new_depth > 0 {
                -self.search(ply + 1, -(alpha + 1), -alpha, new_depth, true)
            } else {
                -self.qsearch(ply + 1, -(alpha + 1), -alpha, 0)
            };
            self.nodes[ply + 1].null_move_ok = false;

            // Confirm a promising reduced search at full depth.
            if !self.stopped() && reduced > 0 && eval > alpha {
                debug_assert!(depth > 1);
                self.stats.lm_researches += 1;
                reduced = 0;
                self.nodes[ply].reduced = 0;
                eval = -self.search(ply + 1, -(alpha + 1), -alpha, depth - 1, false);
                if !self.stopped() && eval > alpha {
                    self.stats.lm_confirmed += 1;
                }
            }

            // Full-window re-search on PV nodes.
            if !self.stopped() && pv_node && eval > alpha {
                debug_assert_eq!(reduced, 0);
                eval = if depth > 1 {
                    -self.search(ply + 1, -beta, -alpha, depth - 1, false)
                } else {
                    -self.qsearch(ply + 1, -beta, -alpha, 0)
                };
            }

            self.undo_move(ply, mv);
            if self.stopped() {
                return beta;
            }
            if eval > alpha {
                alpha = eval;
                self.stats.lm_alpha_incs += 1;
            }
            if eval > best {
                best = eval;
                mv.score = eval;
                self.update_pv(ply, mv);
                pv_depth = depth - reduced;
                if eval >= beta {
                    if !mv.is_cap_or_promo() {
                        self.hist.inc(mv, check, pv_depth);
                        self.nodes[ply].add_killer(mv);
                    }
                    mv.score = beta;
                    let flags = tt_flags(self.nodes[ply].extended, pv_node);
                    self.tt.store(key, mv, pv_depth, flag::LOWER_BOUND, flags);
                    return best;
                }
            } else if !mv.is_cap_or_promo() {
                self.hist.dec(mv, check);
            }
        }

        debug_assert!(self.nodes[ply].move_count > 0);
        debug_assert!(best <= alpha);
        debug_assert!(alpha < beta);

        if self.nodes[ply].pv_count > 0 {
            let mut pv0 = self.nodes[ply].pv[0];
            pv0.score = alpha;
            let flags = tt_flags(self.nodes[ply].extended, pv_node);
            if alpha > orig_alpha {
                if !pv0.is_cap_or_promo() {
                    self.hist.inc(pv0, check, pv_depth);
                }
                self.tt.store(key, pv0, pv_depth, flag::EXACT_SCORE, flags);
            } else {
                self.tt.store(key, pv0, pv_depth, flag::UPPER_BOUND, flags);
            }
        }

        best
    }

    // -----------------------------------------------------------------------
    // Root
    // -----------------------------------------------------------------------

    /// Iterative deepening with aspiration windows. Returns the best move,
    /// or `None` when the position has no legal moves. The PV stays in
    /// `nodes[0]`.
    pub fn search_root(&mut self, max_depth: i32) -> Option<Move> {
        debug_assert!(self.nodes[0].ply == 0);
        self.nodes[0].extended = 0;
        self.nodes[0].reduced = 0;

        self.generate_all(0);
        if self.nodes[0].move_count == 0 {
            return None;
        }
        // One pass through the selection sort fully orders the list.
        while self.next_move(0, ALL_MOVES, 1).is_some() {}

        // Try the table's move first.
        if self.nodes[0].move_count > 1 {
            if let Some(entry) = self.tt.probe(self.nodes[0].position_key) {
                if matches!(
                    entry.primary_flag(),
                    flag::UPPER_BOUND | flag::EXACT_SCORE | flag::LOWER_BOUND
                ) {
                    let tt_move = Move::from_bits(entry.move_bits, entry.score as i32);
                    for i in 0..self.nodes[0].move_count {
                        if self.nodes[0].moves[i] == tt_move {
                            self.nodes[0].scoot_move_to_front(i);
                            break;
                        }
                    }
                }
            }
        }

        self.nodes[0].pv_count = 1;
        self.nodes[0].pv[0] = self.nodes[0].moves[0];

        if self.nodes[0].move_count == 1 {
            self.output_pv(self.nodes[0].pv[0].score, 0);
            return Some(self.nodes[0].pv[0]);
        }

        let mut show_pv = true;
        let mut best = self.nodes[0].stand_pat;

        for d in 0..max_depth {
            if self.stopped() {
                break;
            }
            self.depth = d + 1;
            self.seldepth = d + 1;
            self.nodes[1].null_move_ok = d > 0;

            show_pv = true;
            let mut delta = 25;
            let mut alpha = (best - delta).max(-INFINITY);
            let mut beta = (best + delta).min(INFINITY);

            let mut index = 0;
            while !self.stopped() && index < self.nodes[0].move_count {
                let mut mv = self.nodes[0].moves[index];
                self.movenum = index + 1;
                self.currmove = mv.to_string();
                self.publish_progress();

                self.exec_move(0, mv);
                loop {
                    mv.score = if self.depth > 1 {
                        -self.search(1, -beta, -alpha, self.depth - 1, false)
                    } else {
                        -self.qsearch(1, -beta, -alpha, 0)
                    };

                    // Expand the aspiration window and re-search?
                    if !self.stopped()
                        && (mv.score >= beta || (mv.score <= alpha && self.movenum == 1))
                    {
                        delta *= 20;
                        if mv.score >= beta {
                            beta = (mv.score + delta).min(INFINITY);
                            if self.start.elapsed().as_millis() > 1000 {
                                self.output_pv(mv.score, 1);
                            }
                        } else {
                            alpha = (mv.score - delta).max(-INFINITY);
                            if self.start.elapsed().as_millis() > 1000 {
                                self.output_pv(mv.score, -1);
                            }
                        }
                        continue;
                    }
                    delta = 25;
                    break;
                }
                self.undo_move(0, mv);
                self.nodes[0].moves[index].score = mv.score;

                // New principal variation?
                if !self.stopped() && (self.movenum == 1 || mv.score > best) {
                    self.update_pv(0, mv);
                    self.output_pv(mv.score, 0);
                    show_pv = false;
                    self.tt.store(
                        self.nodes[0].position_key,
                        mv,
                        self.depth,
                        flag::EXACT_SCORE,
                        flag::FROM_PV,
                    );

                    // Null window for the rest of the move list.
                    best = mv.score;
                    alpha = mv.score;
                    beta = alpha + 1;

                    self.nodes[0].scoot_move_to_front(index);
                }
                index += 1;
            }
        }

        if show_pv {
            self.output_pv(self.nodes[0].pv[0].score, 0);
        }
        Some(self.nodes[0].pv[0])
    }
}
