//! Benchmarks for training and lookup
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a synthetic matrix so the benchmark runs without the dataset.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::RatingMatrix;
use recommender::{ClusterRecommender, Recommender, recommend, train};

fn synthetic_matrix(users: u32, items: usize) -> RatingMatrix {
    let titles: Vec<String> = (0..items).map(|i| format!("Movie {i}")).collect();
    let rows: Vec<Vec<f32>> = (0..users)
        .map(|user| {
            (0..items)
                .map(|item| {
                    let v = (user as usize * 31 + item * 17) % 11;
                    if v < 5 { 0.0 } else { (v - 5) as f32 * 0.5 + 2.0 }
                })
                .collect()
        })
        .collect();
    RatingMatrix::new((1..=users).collect(), titles, rows).expect("valid synthetic matrix")
}

fn bench_train(c: &mut Criterion) {
    let matrix = synthetic_matrix(600, 200);
    let recommender = ClusterRecommender::new(5).with_runs(1);

    c.bench_function("train_kmeans_600x200", |b| {
        b.iter(|| {
            let state = recommender.train(black_box(&matrix)).unwrap();
            black_box(state)
        })
    });
}

fn bench_recommend(c: &mut Criterion) {
    let matrix = synthetic_matrix(600, 200);
    let state = train(&matrix, 5, 42).expect("training failed");

    c.bench_function("recommend_top_10", |b| {
        b.iter(|| {
            let recs = recommend(&state, black_box(123), black_box(10));
            black_box(recs)
        })
    });
}

criterion_group!(benches, bench_train, bench_recommend);
criterion_main!(benches);
