//! Property tests over random game walks: exec/undo symmetry, position
//! key integrity, and generator legality.

use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

use stoat::exec::{exec, undo};
use stoat::fen;
use stoat::history::{History, SeenSet};
use stoat::movegen::MoveGen;
use stoat::moves::Move;
use stoat::node::Node;
use stoat::params::Params;
use stoat::stats::Stats;
use stoat::types::{color_of, PieceBoard, KING, MAX_PLIES};
use stoat::zobrist::ZOBRIST;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

struct Walk {
    nodes: Vec<Node>,
    board: PieceBoard,
    seen: SeenSet,
    hist: History,
    stats: Stats,
    params: Params,
}

impl Walk {
    fn new(fen_str: &str) -> Self {
        let params = Params::default();
        let (root, board) = fen::parse(fen_str, &params).expect("valid walk fen");
        let mut nodes: Vec<Node> = (0..MAX_PLIES).map(Node::new).collect();
        nodes[0] = root;
        Walk {
            nodes,
            board,
            seen: SeenSet::new(),
            hist: History::new(),
            stats: Stats::default(),
            params,
        }
    }

    fn generate(&mut self, ply: usize) -> usize {
        let mut gen = MoveGen {
            node: &mut self.nodes[ply],
            board: &mut self.board,
            hist: &self.hist,
        };
        gen.generate_all();
        self.nodes[ply].move_count
    }

    fn play(&mut self, ply: usize, mv: Move) {
        let (head, tail) = self.nodes.split_at_mut(ply + 1);
        exec(
            &head[ply],
            &mut tail[0],
            &mut self.board,
            &mut self.seen,
            mv,
            &self.params,
            &mut self.stats,
        );
    }

    fn take_back(&mut self, ply: usize, mv: Move) {
        undo(&self.nodes[ply], &mut self.board, &mut self.seen, mv);
    }
}

/// Recompute the piece key from scratch.
fn full_piece_key(node: &Node) -> u64 {
    let mut key = 0;
    for piece in 2..14 {
        let mut bb = node.pc[piece];
        while bb != 0 {
            let sqr = bb.trailing_zeros() as usize;
            bb &= bb - 1;
            key ^= ZOBRIST.piece[piece][sqr];
        }
    }
    key
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Descending a random line and unwinding it restores the shared
    /// board array and the seen-set exactly.
    #[test]
    fn exec_undo_restores_board_and_seen(seed in any::<u64>(), plies in 1usize..24) {
        let mut walk = Walk::new(START_FEN);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut line: Vec<(usize, Move, PieceBoard, usize)> = Vec::new();

        for ply in 0..plies {
            let count = walk.generate(ply);
            if count == 0 {
                break;
            }
            let mv = walk.nodes[ply].moves[rng.gen_range(0..count)];
            line.push((ply, mv, walk.board, walk.seen.len()));
            walk.play(ply, mv);
        }

        while let Some((ply, mv, board_before, seen_before)) = line.pop() {
            walk.take_back(ply, mv);
            prop_assert_eq!(walk.board, board_before, "board not restored at ply {}", ply);
            prop_assert_eq!(walk.seen.len(), seen_before, "seen-set not restored at ply {}", ply);
        }
        prop_assert!(walk.seen.is_empty());
    }

    /// The incrementally maintained piece key always equals the XOR over
    /// occupied squares, and the generator never leaves its own king
    /// attacked.
    #[test]
    fn keys_and_legality_hold_along_random_lines(seed in any::<u64>(), plies in 1usize..24) {
        let mut walk = Walk::new(START_FEN);
        let mut rng = StdRng::seed_from_u64(seed);

        for ply in 0..plies {
            let count = walk.generate(ply);
            if count == 0 {
                break;
            }

            // Every generated move must keep the mover's king safe.
            let mover = walk.nodes[ply].color_to_move();
            for i in 0..count {
                let mv = walk.nodes[ply].moves[i];
                prop_assert_eq!(color_of(mv.pc()), mover);
                walk.play(ply, mv);
                let child = &walk.nodes[ply + 1];
                prop_assert!(
                    !child.attacked_by(mover ^ 1, child.king[mover]),
                    "move {} leaves the king attacked", mv
                );
                prop_assert_eq!(child.piece_key, full_piece_key(child));
                prop_assert_eq!(child.pc[KING].count_ones(), 1);
                prop_assert_eq!(child.pc[1 | KING].count_ones(), 1);
                walk.take_back(ply, mv);
            }

            let mv = walk.nodes[ply].moves[rng.gen_range(0..count)];
            walk.play(ply, mv);
        }
    }

    /// The evaluation never wanders outside sane bounds on reachable
    /// positions.
    #[test]
    fn stand_pat_is_bounded(seed in any::<u64>(), plies in 0usize..30) {
        let mut walk = Walk::new(START_FEN);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut ply = 0;
        for _ in 0..plies {
            let count = walk.generate(ply);
            if count == 0 {
                break;
            }
            let mv = walk.nodes[ply].moves[rng.gen_range(0..count)];
            walk.play(ply, mv);
            ply += 1;
            prop_assert!(walk.nodes[ply].stand_pat.abs() < 10_000);
        }
    }
}
