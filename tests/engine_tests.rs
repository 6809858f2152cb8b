//! Engine shell behavior: position management, move application, options,
//! and evaluation symmetry.

use stoat::Engine;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn invalid_fen_keeps_previous_position() {
    let mut engine = Engine::default();
    engine.set_position(KIWIPETE).expect("valid fen");
    let before = engine.fen();

    assert!(engine.set_position("this is not a fen").is_err());
    assert!(engine.set_position("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    assert!(engine
        .set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1")
        .is_err());

    assert_eq!(engine.fen(), before);
}

#[test]
fn make_move_applies_and_rejects() {
    let mut engine = Engine::default();
    assert!(engine.white_to_move());

    engine.make_move("e2e4").expect("legal opening move");
    assert!(!engine.white_to_move());
    assert!(engine.fen().starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));

    assert!(engine.make_move("e7e4").is_err());
    assert!(engine.make_move("zz99").is_err());
    assert!(engine.make_move("e2").is_err());
    // Errors leave the position alone.
    assert!(engine.fen().starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
}

#[test]
fn castling_and_promotion_round_trip() {
    let mut engine = Engine::default();
    engine
        .set_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
        .expect("castling position");
    engine.make_move("e1g1").expect("white castles short");
    assert!(engine.fen().contains(" b kq "));

    engine
        .set_position("8/P6k/8/8/8/8/8/K7 w - - 0 1")
        .expect("promotion position");
    engine.make_move("a7a8q").expect("promotes to queen");
    assert!(engine.fen().starts_with("Q7/"));
}

#[test]
fn option_surface() {
    let mut engine = Engine::default();

    // Every advertised option accepts its default.
    assert!(engine.set_option("Hash", Some("8")));
    assert!(engine.set_option("Contempt", Some("25")));
    assert!(engine.set_option("DeltaPruning", Some("0")));
    assert!(engine.set_option("Razoring", Some("0")));
    assert!(engine.set_option("CheckExtensions", Some("false")));
    assert!(engine.set_option("IID", Some("false")));
    assert!(engine.set_option("LMR", Some("2")));
    assert!(engine.set_option("NullMovePruning", Some("false")));
    assert!(engine.set_option("OneReplyExt", Some("false")));
    assert!(engine.set_option("Tempo", Some("5")));
    assert!(engine.set_option("Test", Some("2")));
    assert!(engine.set_option("ClearHash", None));

    assert!(!engine.set_option("NoSuchOption", Some("1")));
    assert!(!engine.set_option("LMR", Some("99")));
    assert!(!engine.set_option("Hash", Some("zero")));
    assert!(!engine.set_option("IID", Some("maybe")));

    assert_eq!(engine.params().contempt, 25);
    assert_eq!(engine.params().lmr, 2);
    assert!(!engine.params().null_move);
}

#[test]
fn searches_with_heuristics_disabled_still_work() {
    use stoat::GoParams;

    // The pruning options change the tree, never the result's legality.
    let mut engine = Engine::default();
    engine.silent = true;
    for (name, value) in [
        ("NullMovePruning", "false"),
        ("IID", "false"),
        ("CheckExtensions", "false"),
        ("LMR", "0"),
        ("Razoring", "0"),
        ("DeltaPruning", "0"),
    ] {
        assert!(engine.set_option(name, Some(value)));
    }
    engine.set_position(KIWIPETE).expect("valid fen");
    let result = engine.go(&GoParams {
        depth: 4,
        ..Default::default()
    });
    assert!(result.best.is_some());
}

/// Flip a FEN top-to-bottom and swap colors.
fn mirror_fen(fen: &str) -> String {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    let swap_case = |c: char| {
        if c.is_ascii_uppercase() {
            c.to_ascii_lowercase()
        } else {
            c.to_ascii_uppercase()
        }
    };

    let placement = parts[0]
        .split('/')
        .rev()
        .map(|rank| rank.chars().map(swap_case).collect::<String>())
        .collect::<Vec<_>>()
        .join("/");
    let stm = if parts[1] == "w" { "b" } else { "w" };
    let castling: String = if parts[2] == "-" {
        "-".to_string()
    } else {
        parts[2].chars().map(swap_case).collect()
    };
    let ep = if parts[3] == "-" {
        "-".to_string()
    } else {
        let mut chars = parts[3].chars();
        let file = chars.next().unwrap();
        let rank = match chars.next().unwrap() {
            '3' => '6',
            '6' => '3',
            other => other,
        };
        format!("{file}{rank}")
    };

    format!("{placement} {stm} {castling} {ep} 0 1")
}

#[test]
fn evaluation_is_color_symmetric() {
    let mut engine = Engine::default();
    let tempo = engine.params().tempo;

    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        KIWIPETE,
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ] {
        engine.set_position(fen).expect("valid fen");
        let eval = engine.static_eval();
        engine
            .set_position(&mirror_fen(fen))
            .expect("mirrored fen is valid");
        let mirrored = engine.static_eval();
        assert!(
            (eval + mirrored).abs() <= 2 * tempo,
            "asymmetric evaluation for {fen}: {eval} vs mirrored {mirrored}"
        );
    }
}

#[test]
fn stats_totals_accumulate_and_reset() {
    use stoat::GoParams;

    let mut engine = Engine::default();
    engine.silent = true;
    engine.go(&GoParams {
        depth: 4,
        ..Default::default()
    });
    let totals = engine.stats_totals();
    assert!(totals.contains("nodes"));

    let progress = engine.get_stats();
    assert!(progress.depth >= 1);
    assert!(progress.nodes + progress.qnodes > 0);

    engine.reset_stats_totals();
    let cleared = engine.stats_totals();
    assert!(cleared.starts_with("nodes 0 qnodes 0"));
}
