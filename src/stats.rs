//! Search counters, collected per search and accumulated into process
//! totals for the stats commands.

use std::fmt;

#[derive(Clone, Copy, Default)]
pub struct Stats {
    pub snodes: u64,
    pub qnodes: u64,
    pub execs: u64,
    pub qexecs: u64,
    pub null_moves: u64,
    pub nm_cutoffs: u64,
    pub delta_count: u64,
    pub rzr_count: u64,
    pub rzr_cutoffs: u64,
    pub chk_exts: u64,
    pub one_reply_exts: u64,
    pub hash_exts: u64,
    pub threat_exts: u64,
    pub iid_count: u64,
    pub iid_beta: u64,
    pub late_moves: u64,
    pub lm_candidates: u64,
    pub lm_reductions: u64,
    pub lm_double_red: u64,
    pub lm_researches: u64,
    pub lm_confirmed: u64,
    pub lm_alpha_incs: u64,
}

impl Stats {
    pub fn clear(&mut self) {
        *self = Stats::default();
    }

    /// Fold another stats block into this one (per-search -> totals).
    pub fn add(&mut self, other: &Stats) {
        self.snodes += other.snodes;
        self.qnodes += other.qnodes;
        self.execs += other.execs;
        self.qexecs += other.qexecs;
        self.null_moves += other.null_moves;
        self.nm_cutoffs += other.nm_cutoffs;
        self.delta_count += other.delta_count;
        self.rzr_count += other.rzr_count;
        self.rzr_cutoffs += other.rzr_cutoffs;
        self.chk_exts += other.chk_exts;
        self.one_reply_exts += other.one_reply_exts;
        self.hash_exts += other.hash_exts;
        self.threat_exts += other.threat_exts;
        self.iid_count += other.iid_count;
        self.iid_beta += other.iid_beta;
        self.late_moves += other.late_moves;
        self.lm_candidates += other.lm_candidates;
        self.lm_reductions += other.lm_reductions;
        self.lm_double_red += other.lm_double_red;
        self.lm_researches += other.lm_researches;
        self.lm_confirmed += other.lm_confirmed;
        self.lm_alpha_incs += other.lm_alpha_incs;
    }

    #[must_use]
    pub fn total_nodes(&self) -> u64 {
        self.snodes + self.qnodes
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "nodes {} qnodes {} execs {} qexecs {}",
            self.snodes, self.qnodes, self.execs, self.qexecs
        )?;
        writeln!(
            f,
            "null moves {} cutoffs {} | razor tries {} cutoffs {} | delta skips {}",
            self.null_moves, self.nm_cutoffs, self.rzr_count, self.rzr_cutoffs, self.delta_count
        )?;
        writeln!(
            f,
            "extensions: check {} one-reply {} hash {} threat {}",
            self.chk_exts, self.one_reply_exts, self.hash_exts, self.threat_exts
        )?;
        writeln!(f, "iid runs {} fail-highs {}", self.iid_count, self.iid_beta)?;
        write!(
            f,
            "late moves {} candidates {} reduced {} double {} re-searched {} confirmed {} alpha+ {}",
            self.late_moves,
            self.lm_candidates,
            self.lm_reductions,
            self.lm_double_red,
            self.lm_researches,
            self.lm_confirmed,
            self.lm_alpha_incs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates() {
        let mut totals = Stats::default();
        let mut a = Stats::default();
        a.snodes = 10;
        a.qnodes = 5;
        totals.add(&a);
        totals.add(&a);
        assert_eq!(totals.total_nodes(), 30);
        totals.clear();
        assert_eq!(totals.total_nodes(), 0);
    }
}
