use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use knight_isolation::game_state::isolation_types::*;
use knight_isolation::search::board_scoring::EvaluatorKind;
use knight_isolation::search::iterative_deepening::{
    alpha_beta_search, iterative_deepening_search, CachePolicy, MoveOrdering, SearchConfig,
    SearchPolicy,
};
use knight_isolation::search::search_cache::SearchCaches;
use knight_isolation::search::time_budget::Unlimited;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    moves: &'static [(u8, u8)],
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "opening",
        moves: &[(3, 3), (2, 4)],
    },
    BenchCase {
        name: "corners",
        moves: &[(0, 0), (6, 6), (1, 2), (5, 4)],
    },
    BenchCase {
        name: "midgame",
        moves: &[(3, 3), (2, 2), (1, 4), (4, 3), (3, 5), (6, 4), (5, 6), (4, 5)],
    },
];

fn board_for(case: &BenchCase) -> BoardState {
    let mut board = BoardState::new_game();
    for &(row, col) in case.moves {
        board
            .apply_move(Square::new(row, col))
            .expect("benchmark line should be legal");
    }
    board
}

fn bench_alpha_beta(c: &mut Criterion) {
    let mut group = c.benchmark_group("alpha_beta_fixed_depth");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    let evaluator = EvaluatorKind::Improved.build();
    let plain = SearchPolicy {
        cache: CachePolicy::Disabled,
        ordering: MoveOrdering::None,
        ..SearchPolicy::default()
    };
    let policies = [("plain", plain), ("ordered", SearchPolicy::default())];

    for case in CASES {
        let board = board_for(case);
        for depth in [3u8, 5] {
            for (label, policy) in policies {
                let bench_name = format!("{}_{}_d{}", case.name, label, depth);
                group.bench_with_input(
                    BenchmarkId::from_parameter(bench_name),
                    &depth,
                    |b, &depth| {
                        b.iter(|| {
                            let mut root = board.clone();
                            let mut caches = SearchCaches::new();
                            let out = alpha_beta_search(
                                black_box(&mut root),
                                evaluator.as_ref(),
                                black_box(depth),
                                policy,
                                &Unlimited,
                                0.0,
                                &mut caches,
                            )
                            .expect("unlimited search completes");
                            black_box(out.nodes)
                        });
                    },
                );
            }
        }
    }

    group.finish();
}

fn bench_iterative_deepening(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterative_deepening");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    let evaluator = EvaluatorKind::Mixed.build();
    for case in CASES {
        let board = board_for(case);
        let config = SearchConfig {
            max_depth: 6,
            ..SearchConfig::default()
        };
        group.bench_function(BenchmarkId::from_parameter(case.name), |b| {
            b.iter(|| {
                let mut root = board.clone();
                let out = iterative_deepening_search(
                    black_box(&mut root),
                    evaluator.as_ref(),
                    &config,
                    &Unlimited,
                )
                .expect("search runs");
                black_box(out.best_move)
            });
        });
    }

    group.finish();
}

criterion_group!(search_benches, bench_alpha_beta, bench_iterative_deepening);
criterion_main!(search_benches);
