//! Stoat: a bitboard chess engine.
//!
//! The core is a node-stack alpha-beta searcher: the position at each ply
//! lives in a preallocated [`node::Node`], moves execute from parent into
//! child (so undo is nearly free), and evaluation runs on every exec to
//! keep attack maps and pin masks current for the staged, pin-aware move
//! generator. A direct-mapped transposition table, killer/history
//! ordering, and the usual pruning and reduction heuristics (null move,
//! razoring, IID, LMR, check and one-reply extensions) sit on top.
//!
//! [`engine::Engine`] wraps everything behind the command surface the UCI
//! loop in [`uci`] drives.
//!
//! # Example
//! ```
//! use stoat::{Engine, GoParams};
//!
//! let mut engine = Engine::default();
//! engine.silent = true;
//! engine.set_position("4k3/8/4K3/4Q3/8/8/8/8 w - - 0 1").unwrap();
//! let result = engine.go(&GoParams { depth: 3, ..Default::default() });
//! assert!(result.best.is_some());
//! ```

pub mod bits;
pub mod engine;
pub mod error;
pub mod eval;
pub mod exec;
pub mod fen;
pub mod geometry;
pub mod history;
pub mod movegen;
pub mod moves;
pub mod node;
pub mod options;
pub mod params;
pub mod perft;
pub mod search;
pub mod see;
pub mod stats;
pub mod tables;
pub mod tt;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use engine::{Engine, GoParams, GoResult};
pub use error::{FenError, MoveParseError};
pub use moves::Move;
pub use params::Params;
