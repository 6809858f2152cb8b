//! Perft: exact leaf counts proving move-generation correctness, including
//! castling, en passant, promotions, pins, and check evasions.

use stoat::Engine;

struct TestPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(i32, u64)],
}

const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "initial position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8_902), (4, 197_281), (5, 4_865_609)],
    },
    TestPosition {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        depths: &[(1, 48), (2, 2_039), (3, 97_862), (4, 4_085_603)],
    },
    TestPosition {
        name: "rook endgame with ep pins",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -",
        depths: &[(1, 14), (2, 191), (3, 2_812), (4, 43_238), (5, 674_624)],
    },
    TestPosition {
        name: "promotion tangle",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9_467), (4, 422_333)],
    },
    TestPosition {
        name: "underpromotion trap",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        depths: &[(1, 44), (2, 1_486), (3, 62_379), (4, 2_103_487)],
    },
    TestPosition {
        name: "symmetric middlegame",
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        depths: &[(1, 46), (2, 2_079), (3, 89_890), (4, 3_894_594)],
    },
];

#[test]
fn perft_matches_reference_counts() {
    let mut engine = Engine::default();
    engine.silent = true;

    for position in TEST_POSITIONS {
        engine
            .set_position(position.fen)
            .unwrap_or_else(|e| panic!("{}: {e}", position.name));
        for &(depth, expected) in position.depths {
            let nodes = engine.perft(depth);
            assert_eq!(
                nodes, expected,
                "perft mismatch for '{}' at depth {depth}: expected {expected}, got {nodes}",
                position.name
            );
        }
    }
}

#[test]
fn perft_zero_is_one() {
    let mut engine = Engine::default();
    engine.silent = true;
    assert_eq!(engine.perft(0), 1);
}

#[test]
fn perft_en_passant_and_castling_positions() {
    let mut engine = Engine::default();
    engine.silent = true;

    engine
        .set_position("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
        .expect("en passant position");
    assert_eq!(engine.perft(1), 31);
    assert_eq!(engine.perft(2), 707);
    assert_eq!(engine.perft(3), 21_637);

    engine
        .set_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
        .expect("castling position");
    assert_eq!(engine.perft(1), 26);
    assert_eq!(engine.perft(2), 568);
    assert_eq!(engine.perft(3), 13_744);

    engine
        .set_position("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1")
        .expect("promotion position");
    assert_eq!(engine.perft(1), 24);
    assert_eq!(engine.perft(2), 496);
    assert_eq!(engine.perft(3), 9_483);
}
