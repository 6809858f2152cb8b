//! Tunable engine parameters, set through the option surface.

/// Search and evaluation knobs. A zero margin disables the corresponding
/// pruning technique.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Draw-score bias: positive means draws are scored against us.
    pub contempt: i32,
    /// Delta-pruning margin for quiescence (0 disables).
    pub delta: i32,
    /// Razoring margin (0 disables).
    pub razor: i32,
    /// Check (and one-reply) extensions enabled.
    pub check_ext: bool,
    /// Internal iterative deepening enabled.
    pub iid: bool,
    /// Late-move reduction depth (0 disables).
    pub lmr: i32,
    /// Null-move pruning enabled.
    pub null_move: bool,
    /// One-reply extension enabled.
    pub one_reply: bool,
    /// Bonus for the side to move.
    pub tempo: i32,
    /// Experimental-feature gate; threat extensions require > 1.
    pub test: i32,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            hash_mb: 512,
            contempt: 0,
            delta: 200,
            razor: 300,
            check_ext: true,
            iid: true,
            lmr: 1,
            null_move: true,
            one_reply: true,
            tempo: 10,
            test: 0,
        }
    }
}
