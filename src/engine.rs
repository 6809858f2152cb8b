//! The engine shell: owns the node stack, shared board, search memory,
//! and transposition table, and exposes the command surface the UCI layer
//! drives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{FenError, MoveParseError};
use crate::fen;
use crate::history::{History, SeenSet};
use crate::movegen::MoveGen;
use crate::node::Node;
use crate::options::{self, EngineOption};
use crate::params::Params;
use crate::search::{Progress, SearchCtx};
use crate::stats::Stats;
use crate::tt::TranspositionTable;
use crate::types::{Color, PieceBoard, MAX_PLIES, WHITE};

pub const ENGINE_NAME: &str = "Stoat";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const ENGINE_AUTHOR: &str = "the stoat authors";

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Time and depth budget for a search.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoParams {
    pub depth: i32,
    pub movestogo: i32,
    pub movetime: u64,
    pub wtime: u64,
    pub winc: u64,
    pub btime: u64,
    pub binc: u64,
    pub infinite: bool,
    pub ponder: bool,
}

/// Search outcome handed back to the host layer.
#[derive(Clone, Debug, Default)]
pub struct GoResult {
    pub best: Option<String>,
    pub ponder: Option<String>,
    /// Score of the principal variation, from the root mover's view.
    pub score: i32,
}

pub struct Engine {
    nodes: Vec<Node>,
    board: PieceBoard,
    seen: SeenSet,
    hist: History,
    tt: TranspositionTable,
    stats: Stats,
    total_stats: Stats,
    params: Params,
    initialized: bool,
    stop: Arc<AtomicBool>,
    pondering: Arc<AtomicBool>,
    progress: Arc<Mutex<Progress>>,
    /// Suppress info/perft output (used by tests and benches).
    pub silent: bool,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Engine::with_flags(
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicBool::new(false)),
        )
    }

    /// Build an engine sharing externally owned stop/ponder flags, so a
    /// front-end thread can signal a running search.
    #[must_use]
    pub fn with_flags(stop: Arc<AtomicBool>, pondering: Arc<AtomicBool>) -> Self {
        Engine {
            nodes: Vec::new(),
            board: [0; 64],
            seen: SeenSet::new(),
            hist: History::new(),
            tt: TranspositionTable::new(0),
            stats: Stats::default(),
            total_stats: Stats::default(),
            params: Params::default(),
            initialized: false,
            stop,
            pondering,
            progress: Arc::new(Mutex::new(Progress::default())),
            silent: false,
        }
    }

    /// One-time setup: node stack, transposition table, start position.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.nodes = (0..MAX_PLIES).map(Node::new).collect();
        if !self.tt.resize(self.params.hash_mb) {
            #[cfg(feature = "logging")]
            log::warn!("cannot allocate hash table of {} MB", self.params.hash_mb);
        }
        self.initialized = true;
        self.set_position(START_FEN)
            .expect("start position is valid");
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    #[must_use]
    pub fn ponder_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pondering)
    }

    #[must_use]
    pub fn progress_handle(&self) -> Arc<Mutex<Progress>> {
        Arc::clone(&self.progress)
    }

    // -----------------------------------------------------------------------
    // Position management
    // -----------------------------------------------------------------------

    /// Parse a FEN and replace the root position. On error the previous
    /// position is kept.
    pub fn set_position(&mut self, fen_str: &str) -> Result<(), FenError> {
        debug_assert!(self.initialized);
        let (node, board) = fen::parse(fen_str, &self.params)?;
        self.nodes[0] = node;
        self.board = board;
        self.seen.clear();
        Ok(())
    }

    /// Apply an externally supplied coordinate move (`e2e4`, `e7e8q`) to
    /// the root position.
    pub fn make_move(&mut self, coord: &str) -> Result<(), MoveParseError> {
        debug_assert!(self.initialized);
        if coord.len() < 4 || coord.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: coord.len() });
        }
        let mut chars = coord.chars();
        let ok = |c: char, lo: char, hi: char| c >= lo && c <= hi;
        let f1 = chars.next().unwrap_or('?');
        let r1 = chars.next().unwrap_or('?');
        let f2 = chars.next().unwrap_or('?');
        let r2 = chars.next().unwrap_or('?');
        if !(ok(f1, 'a', 'h') && ok(r1, '1', '8') && ok(f2, 'a', 'h') && ok(r2, '1', '8')) {
            return Err(MoveParseError::InvalidSquare {
                notation: coord.to_string(),
            });
        }

        let mut gen = MoveGen {
            node: &mut self.nodes[0],
            board: &mut self.board,
            hist: &self.hist,
        };
        gen.generate_all();

        let count = self.nodes[0].move_count;
        let found = self.nodes[0].moves[..count]
            .iter()
            .copied()
            .find(|m| m.to_string() == coord);
        let Some(mv) = found else {
            return Err(MoveParseError::IllegalMove {
                notation: coord.to_string(),
            });
        };

        // Exec wants distinct parent and child nodes; for a permanent game
        // move the root is both, so play from a snapshot.
        let parent = self.nodes[0].clone();
        crate::exec::exec(
            &parent,
            &mut self.nodes[0],
            &mut self.board,
            &mut self.seen,
            mv,
            &self.params,
            &mut self.stats,
        );
        Ok(())
    }

    #[must_use]
    pub fn fen(&self) -> String {
        fen::format(&self.nodes[0], &self.board)
    }

    #[must_use]
    pub fn pretty(&self) -> String {
        fen::pretty(&self.nodes[0], &self.board)
    }

    #[must_use]
    pub fn white_to_move(&self) -> bool {
        self.nodes[0].color_to_move() == WHITE
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.nodes[0].color_to_move()
    }

    #[must_use]
    pub fn in_check(&self) -> bool {
        self.nodes[0].in_check()
    }

    /// Root draw state: 50-move rule, repetition, or dead material.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.nodes[0].is_draw(&self.seen)
    }

    /// Static evaluation of the root, from White's perspective.
    #[must_use]
    pub fn static_eval(&self) -> i32 {
        if self.white_to_move() {
            self.nodes[0].stand_pat
        } else {
            -self.nodes[0].stand_pat
        }
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    fn allocate_msecs(&self, go: &GoParams) -> Option<Duration> {
        if go.infinite {
            return None;
        }
        if go.movetime > 0 {
            return Some(Duration::from_millis(go.movetime));
        }
        let (time_left, inc) = if self.white_to_move() {
            (go.wtime, go.winc)
        } else {
            (go.btime, go.binc)
        };
        if time_left == 0 {
            return None;
        }
        // Split the clock across the expected remaining moves, credit half
        // the increment, and keep a safety margin.
        let moves_to_go = if go.movestogo > 0 {
            go.movestogo as u64
        } else {
            30
        };
        let mut msecs = time_left / moves_to_go + inc / 2;
        if time_left > 100 {
            msecs = msecs.min(time_left - 50);
        }
        Some(Duration::from_millis(msecs.max(1)))
    }

    /// Run an iterative-deepening search under the given budget and
    /// return the best move (and expected reply) found.
    pub fn go(&mut self, go: &GoParams) -> GoResult {
        debug_assert!(self.initialized);

        self.stop.store(false, Ordering::Relaxed);
        self.pondering.store(go.ponder, Ordering::Relaxed);

        self.stats.clear();
        self.tt.reset_counters();
        for node in &mut self.nodes {
            node.clear_killers();
        }
        *self.progress.lock() = Progress::default();

        let start = Instant::now();
        let deadline = self.allocate_msecs(go).map(|budget| start + budget);
        let max_depth = if go.depth > 0 {
            go.depth.min(MAX_PLIES as i32 - 2)
        } else {
            MAX_PLIES as i32 - 2
        };

        let mut ctx = SearchCtx::new(
            &mut self.nodes,
            &mut self.board,
            &mut self.seen,
            &mut self.hist,
            &mut self.tt,
            &mut self.stats,
            self.params,
            &self.stop,
        );
        ctx.pondering = Some(&*self.pondering);
        ctx.deadline = deadline;
        ctx.start = start;
        ctx.progress = Some(&*self.progress);
        ctx.silent = self.silent;

        let best = ctx.search_root(max_depth);

        let ponder = if self.nodes[0].pv_count > 1 {
            Some(self.nodes[0].pv[1].to_string())
        } else {
            None
        };
        self.total_stats.add(&self.stats);
        self.pondering.store(false, Ordering::Relaxed);

        GoResult {
            best: best.map(|m| m.to_string()),
            ponder,
            score: self.nodes[0].pv[0].score,
        }
    }

    /// Leaf count at fixed depth, printing the per-move split at the root.
    pub fn perft(&mut self, depth: i32) -> u64 {
        debug_assert!(self.initialized);
        if depth <= 0 {
            return 1;
        }
        let mut ctx = SearchCtx::new(
            &mut self.nodes,
            &mut self.board,
            &mut self.seen,
            &mut self.hist,
            &mut self.tt,
            &mut self.stats,
            self.params,
            &self.stop,
        );
        ctx.silent = self.silent;
        ctx.perft_root(depth)
    }

    // -----------------------------------------------------------------------
    // Lifecycle and bookkeeping
    // -----------------------------------------------------------------------

    /// New-game reset: search memory, killers, hash, seen keys.
    pub fn clear_search_data(&mut self) {
        self.hist.clear();
        self.seen.clear();
        self.tt.clear();
        self.stats.clear();
        for node in &mut self.nodes {
            node.clear_killers();
        }
    }

    pub fn clear_hash(&mut self) {
        self.tt.clear();
    }

    pub fn reset_stats_totals(&mut self) {
        self.total_stats.clear();
    }

    /// Cumulative counters since the last reset, formatted for display.
    #[must_use]
    pub fn stats_totals(&self) -> String {
        format!(
            "{}\ntt stores {} hits {} checkmates {} stalemates {}",
            self.total_stats,
            self.tt.stores(),
            self.tt.hits(),
            self.tt.checkmates(),
            self.tt.stalemates()
        )
    }

    pub fn show_stats_totals(&self) {
        println!("{}", self.stats_totals());
    }

    /// Snapshot of the running (or last) search.
    #[must_use]
    pub fn get_stats(&self) -> Progress {
        self.progress.lock().clone()
    }

    /// A ponder hit converts the current ponder search into a normal timed
    /// search; the search itself never paused.
    pub fn ponder_hit(&mut self) {
        self.pondering.store(false, Ordering::Relaxed);
    }

    pub fn quit(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn options(&self) -> Vec<EngineOption> {
        options::all()
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Apply a named option. Returns false for unknown names or values.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> bool {
        let spin = |v: Option<&str>| v.and_then(|s| s.parse::<i32>().ok());
        let check = |v: Option<&str>| match v {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };
        match name {
            "Hash" => {
                let Some(mb) = spin(value).filter(|mb| *mb > 0) else {
                    return false;
                };
                let mut fresh = TranspositionTable::new(0);
                if fresh.resize(mb as usize) {
                    self.tt = fresh;
                    self.params.hash_mb = mb as usize;
                    true
                } else {
                    // Keep the previous table on allocation failure.
                    #[cfg(feature = "logging")]
                    log::warn!("cannot allocate hash table of {mb} MB");
                    false
                }
            }
            "ClearHash" => {
                self.tt.clear();
                true
            }
            "Contempt" => spin(value).map(|v| self.params.contempt = v).is_some(),
            "DeltaPruning" => spin(value).map(|v| self.params.delta = v).is_some(),
            "Razoring" => spin(value).map(|v| self.params.razor = v).is_some(),
            "CheckExtensions" => check(value).map(|v| self.params.check_ext = v).is_some(),
            "IID" => check(value).map(|v| self.params.iid = v).is_some(),
            "LMR" => spin(value)
                .filter(|v| (0..=4).contains(v))
                .map(|v| self.params.lmr = v)
                .is_some(),
            "NullMovePruning" => check(value).map(|v| self.params.null_move = v).is_some(),
            "OneReplyExt" => check(value).map(|v| self.params.one_reply = v).is_some(),
            "Tempo" => spin(value).map(|v| self.params.tempo = v).is_some(),
            "Test" => spin(value).map(|v| self.params.test = v).is_some(),
            _ => false,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        let mut engine = Engine::new();
        engine.initialize();
        engine
    }
}
