//! Integration tests for the recommender.
//!
//! These tests train on a small synthetic rating matrix and check the
//! properties callers rely on: determinism, profile ordering, lookup limits
//! and snapshot round-trips.

use data_loader::{Movie, Rating, RatingMatrix};
use recommender::persistence;
use recommender::{
    ClusterRecommender, PopularityRecommender, Recommender, RecommenderState, is_fitted,
    recommend, train,
};
use std::sync::Arc;

/// 20 users x 10 items in two taste groups.
///
/// Users 1..=10 rate items 0..5 highly, users 11..=20 items 5..10. Small
/// per-user offsets keep every row distinct.
fn scenario_matrix() -> RatingMatrix {
    let items: Vec<String> = (0..10).map(|i| format!("Movie {i:02}")).collect();
    let mut users = Vec::new();
    let mut rows = Vec::new();

    for user in 1..=20u32 {
        let first_group = user <= 10;
        let offset = (user % 5) as f32 * 0.1;
        let row: Vec<f32> = (0..10)
            .map(|item| {
                let liked = (item < 5) == first_group;
                if liked {
                    5.0 - item as f32 * 0.3 - offset
                } else if (user + item as u32) % 3 == 0 {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        users.push(user);
        rows.push(row);
    }

    RatingMatrix::new(users, items, rows).unwrap()
}

fn profile_means(state: &RecommenderState, cluster: usize) -> Vec<f64> {
    state
        .profile(cluster)
        .unwrap()
        .entries()
        .iter()
        .map(|e| e.mean_rating)
        .collect()
}

#[test]
fn test_scenario_two_clusters() {
    let matrix = scenario_matrix();
    let state = train(&matrix, 2, 42).unwrap();

    assert!(is_fitted(&state));
    for &user in matrix.users() {
        let cluster = state.cluster_of(user).unwrap();
        assert!(cluster == 0 || cluster == 1);
    }

    let cluster = state.cluster_of(1).unwrap();
    let recs = recommend(&state, 1, 3);
    assert_eq!(recs.len(), 3);
    assert_eq!(recs, state.profile(cluster).unwrap().top(3));

    let means = profile_means(&state, cluster);
    assert!(means[..3].windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_scenario_groups_stay_together() {
    let matrix = scenario_matrix();
    let state = train(&matrix, 2, 42).unwrap();

    let first = state.cluster_of(1).unwrap();
    let second = state.cluster_of(11).unwrap();
    assert_ne!(first, second);
    assert!((1..=10).all(|u| state.cluster_of(u) == Some(first)));
    assert!((11..=20).all(|u| state.cluster_of(u) == Some(second)));

    assert_eq!(recommend(&state, 3, 2), vec!["Movie 00", "Movie 01"]);
    assert_eq!(recommend(&state, 17, 2), vec!["Movie 05", "Movie 06"]);
}

#[test]
fn test_training_is_deterministic() {
    let matrix = scenario_matrix();

    for (k, seed) in [(2, 42), (3, 7), (4, 1234)] {
        let a = train(&matrix, k, seed).unwrap();
        let b = train(&matrix, k, seed).unwrap();
        assert_eq!(a.assignment(), b.assignment());
        assert_eq!(a.profiles(), b.profiles());
    }
}

#[test]
fn test_profiles_sorted_and_capped() {
    let matrix = scenario_matrix();
    let state = ClusterRecommender::new(3)
        .with_seed(9)
        .with_profile_size(6)
        .train(&matrix)
        .unwrap();

    assert_eq!(state.profiles().len(), 3);
    for cluster in 0..3 {
        let means = profile_means(&state, cluster);
        assert!(means.len() <= 6);
        assert!(means.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn test_lookup_limits() {
    let matrix = scenario_matrix();
    let state = train(&matrix, 2, 42).unwrap();

    assert!(recommend(&state, 1, 0).is_empty());
    for n in [1, 5, 20, 50] {
        let recs = recommend(&state, 1, n);
        let profile_len = state.profile(state.cluster_of(1).unwrap()).unwrap().len();
        assert!(recs.len() <= n);
        assert!(recs.len() <= profile_len);
    }
    for n in [0, 3, 100] {
        assert!(recommend(&state, 999, n).is_empty());
    }
}

#[test]
fn test_snapshot_round_trip() {
    let matrix = scenario_matrix();
    let state = train(&matrix, 3, 42).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_v1.json");
    persistence::save_to_path(&state, &path).unwrap();
    let restored = persistence::load_from_path(&path).unwrap();

    assert_eq!(restored.k(), state.k());
    assert_eq!(restored.assignment(), state.assignment());
    assert_eq!(restored.profiles(), state.profiles());
    assert_eq!(recommend(&restored, 5, 4), recommend(&state, 5, 4));
}

#[test]
fn test_variants_behind_trait_objects() {
    let matrix = scenario_matrix();
    let variants: Vec<Box<dyn Recommender>> = vec![
        Box::new(ClusterRecommender::new(2)),
        Box::new(PopularityRecommender::new()),
    ];

    for variant in &variants {
        let state = variant.train(&matrix).unwrap();
        assert!(state.is_fitted(), "{} should be fitted", variant.name());
        assert_eq!(variant.recommend(&state, 1, 3).len(), 3);
        assert!(variant.recommend(&state, 999, 3).is_empty());
    }
}

#[test]
fn test_concurrent_lookups_share_state() {
    let matrix = scenario_matrix();
    let state = Arc::new(train(&matrix, 2, 42).unwrap());
    let expected = recommend(&state, 1, 5);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let state = Arc::clone(&state);
            std::thread::spawn(move || recommend(&state, 1, 5))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_end_to_end_from_records() {
    let movies: Vec<Movie> = (1..=4)
        .map(|id| Movie {
            id,
            title: format!("Film {id}"),
            genres: vec!["Drama".to_string()],
        })
        .collect();

    let mut ratings = Vec::new();
    for user in 1..=6u32 {
        for movie_id in 1..=4u32 {
            let likes_low = user <= 3;
            let rating = if (movie_id <= 2) == likes_low { 4.5 } else { 1.0 };
            ratings.push(Rating {
                user_id: user,
                movie_id,
                rating: rating - (user as f32) * 0.05,
                timestamp: 0,
            });
        }
    }

    let matrix = RatingMatrix::from_ratings(&movies, &ratings, 5).unwrap();
    assert_eq!(matrix.shape(), (6, 4));

    let state = train(&matrix, 2, 42).unwrap();
    assert_eq!(recommend(&state, 1, 2), vec!["Film 1", "Film 2"]);
    assert_eq!(recommend(&state, 6, 2), vec!["Film 3", "Film 4"]);
}
