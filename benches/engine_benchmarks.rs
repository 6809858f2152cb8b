//! Criterion benchmarks: raw move generation throughput via perft, and a
//! fixed-depth search of a tactical middlegame.

use criterion::{criterion_group, criterion_main, Criterion};

use stoat::{Engine, GoParams};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn perft_benchmark(c: &mut Criterion) {
    let mut engine = Engine::default();
    engine.silent = true;

    c.bench_function("perft 4 startpos", |b| {
        b.iter(|| {
            engine
                .set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap();
            assert_eq!(engine.perft(4), 197_281);
        });
    });

    c.bench_function("perft 3 kiwipete", |b| {
        b.iter(|| {
            engine.set_position(KIWIPETE).unwrap();
            assert_eq!(engine.perft(3), 97_862);
        });
    });
}

fn search_benchmark(c: &mut Criterion) {
    let mut engine = Engine::default();
    engine.silent = true;

    c.bench_function("search depth 6 kiwipete", |b| {
        b.iter(|| {
            engine.set_position(KIWIPETE).unwrap();
            engine.clear_hash();
            let result = engine.go(&GoParams {
                depth: 6,
                ..Default::default()
            });
            assert!(result.best.is_some());
        });
    });
}

criterion_group!(benches, perft_benchmark, search_benchmark);
criterion_main!(benches);
