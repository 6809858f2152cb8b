//! Search behavior: mate finding, stalemate handling, draw detection, and
//! material-win scoring.

use stoat::types::{INFINITY, MATE_SCORE};
use stoat::{Engine, GoParams};

fn depth(d: i32) -> GoParams {
    GoParams {
        depth: d,
        ..Default::default()
    }
}

#[test]
fn finds_short_mate() {
    let mut engine = Engine::default();
    engine.silent = true;
    engine
        .set_position("4k3/8/4K3/4Q3/8/8/8/8 w - -")
        .expect("mating position");

    let result = engine.go(&depth(3));
    assert!(result.best.is_some(), "a mating move exists");
    assert!(
        result.score > MATE_SCORE,
        "expected a mate score, got {}",
        result.score
    );
    let mate_in = (INFINITY - result.score + 1) / 2;
    assert!(
        (1..=2).contains(&mate_in),
        "score {} should announce a mate within two moves",
        result.score
    );
}

#[test]
fn stalemate_yields_no_move() {
    let mut engine = Engine::default();
    engine.silent = true;
    engine
        .set_position("8/8/8/8/8/6k1/6p1/6K1 w - -")
        .expect("stalemate position");

    assert!(!engine.in_check());
    let result = engine.go(&depth(3));
    assert!(result.best.is_none(), "stalemated side has no move");
}

#[test]
fn material_loss_scores_as_centipawns() {
    let mut engine = Engine::default();
    engine.silent = true;
    engine
        .set_position("r1b1k2r/ppppnppp/2n2q2/2b5/3NP3/2P1B3/PP3PPP/RN1QKB1R w KQkq -")
        .expect("tactical position");

    let result = engine.go(&depth(6));
    assert!(result.best.is_some());
    assert!(
        result.score.abs() < MATE_SCORE,
        "score {} must be centipawns, not mate",
        result.score
    );
    assert!(
        result.score < 0,
        "white is losing material, got score {}",
        result.score
    );
}

#[test]
fn fifty_move_rule_draw() {
    let mut engine = Engine::default();
    engine.silent = true;
    engine
        .set_position("8/8/8/8/8/4k3/8/4K2R w - - 99 80")
        .expect("near 50-move position");

    assert!(!engine.is_draw());
    engine.make_move("h1h2").expect("quiet rook move");
    assert!(engine.is_draw(), "100 reversible half-moves is a draw");
}

#[test]
fn insufficient_material_draw() {
    let mut engine = Engine::default();
    engine.silent = true;
    engine
        .set_position("4k3/8/4K3/8/8/8/8/8 w - -")
        .expect("bare kings");
    assert!(engine.is_draw());

    engine
        .set_position("4k3/8/4KN2/8/8/8/8/8 w - -")
        .expect("king and knight");
    assert!(engine.is_draw(), "K+N vs K cannot be won");
}

#[test]
fn threefold_repetition_path_is_draw() {
    let mut engine = Engine::default();
    engine.silent = true;
    for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        assert!(!engine.is_draw());
        engine.make_move(mv).expect("legal shuffle");
    }
    // Back to the starting position, which is on the seen path.
    assert!(engine.is_draw());
}

#[test]
fn search_respects_stop_flag() {
    use std::sync::atomic::Ordering;

    let mut engine = Engine::default();
    engine.silent = true;
    let stop = engine.stop_flag();

    // A pre-set stop flag is cleared by go, so the search still returns a
    // move; setting it mid-search is exercised by the UCI layer. Here we
    // just confirm a deep search terminates quickly once stop is set by a
    // watcher thread.
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(200));
        stop.store(true, Ordering::Relaxed);
    });
    let result = engine.go(&GoParams {
        infinite: true,
        ..Default::default()
    });
    handle.join().expect("watcher thread");
    assert!(result.best.is_some(), "interrupted search still reports a move");
}

#[test]
fn single_reply_is_instant() {
    let mut engine = Engine::default();
    engine.silent = true;
    // Back-rank check with a single legal escape.
    engine
        .set_position("R5k1/6pp/8/8/8/8/8/6K1 b - -")
        .expect("one-reply position");
    let result = engine.go(&depth(8));
    assert_eq!(result.best.as_deref(), Some("g8f7"));
}
