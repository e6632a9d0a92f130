//! Clustering engine: K-Means over user rating vectors plus per-cluster
//! profile precomputation.
//!
//! ## Algorithm
//! 1. Convert the rating matrix into an ndarray observation grid
//! 2. Run seeded Lloyd's K-Means (linfa) to label every user with a cluster
//! 3. For every cluster, in parallel:
//!    - average each item column over the cluster's members
//!    - rank items by that mean, descending, ties in column order
//!    - keep the top `profile_size` entries
//!
//! Training is a pure function of (matrix, parameters): the same inputs and
//! seed produce the same assignment and profiles.

use crate::error::{RecommenderError, Result};
use crate::state::{
    ClusterAssignment, ClusterProfile, DEFAULT_PROFILE_SIZE, ProfileEntry, RecommenderState,
};
use crate::traits::Recommender;
use data_loader::RatingMatrix;
use linfa::prelude::*;
use linfa_clustering::{KMeans, KMeansInit};
use ndarray::{Array1, Array2};
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, instrument};

pub const DEFAULT_CLUSTERS: usize = 5;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_ITERATIONS: u64 = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
pub const DEFAULT_RUNS: usize = 10;

/// K-Means based recommender.
///
/// Holds only training parameters; the trained model is the returned
/// [`RecommenderState`].
#[derive(Debug, Clone)]
pub struct ClusterRecommender {
    n_clusters: usize,
    seed: u64,
    profile_size: usize,
    max_iterations: u64,
    tolerance: f64,
    n_runs: usize,
}

impl ClusterRecommender {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            seed: DEFAULT_SEED,
            profile_size: DEFAULT_PROFILE_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            n_runs: DEFAULT_RUNS,
        }
    }

    /// Configure the RNG seed (default: 42)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Configure how many items each cluster profile keeps (default: 20)
    pub fn with_profile_size(mut self, profile_size: usize) -> Self {
        self.profile_size = profile_size;
        self
    }

    /// Configure the Lloyd iteration cap per run (default: 300)
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Configure the convergence tolerance (default: 1e-4)
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Configure how many initialisations are tried, best inertia wins (default: 10)
    pub fn with_runs(mut self, n_runs: usize) -> Self {
        self.n_runs = n_runs.max(1);
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Label every matrix row with a cluster index in `[0, k)`
    fn fit_labels(&self, matrix: &RatingMatrix) -> Result<Vec<usize>> {
        let observations = to_observations(matrix)?;
        let k = self.n_clusters;

        // k-means++ needs at least k distinct points to draw distinct centres
        let init = if distinct_rows(matrix) >= k {
            KMeansInit::KMeansPlusPlus
        } else {
            debug!("Fewer than {} distinct rows, falling back to random init", k);
            KMeansInit::Random
        };

        let rng = ChaCha8Rng::seed_from_u64(self.seed);
        let dataset = DatasetBase::from(observations.clone());
        let model = KMeans::params_with_rng(k, rng)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .init_method(init)
            .fit(&dataset)
            .map_err(|e| RecommenderError::Clustering(e.to_string()))?;

        let labels: Array1<usize> = model.predict(&observations);
        Ok(labels.to_vec())
    }
}

impl Default for ClusterRecommender {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTERS)
    }
}

impl Recommender for ClusterRecommender {
    fn name(&self) -> &str {
        "ClusterRecommender"
    }

    #[instrument(skip(self, matrix), fields(k = self.n_clusters, seed = self.seed))]
    fn train(&self, matrix: &RatingMatrix) -> Result<RecommenderState> {
        let k = self.n_clusters;
        if k == 0 {
            return Err(RecommenderError::InvalidClusterCount(k));
        }
        check_shape(matrix, k)?;

        let start = Instant::now();
        info!("Training K-Means with {} clusters on {:?} matrix", k, matrix.shape());

        let labels = self.fit_labels(matrix)?;

        info!("Precomputing cluster profiles...");
        let profiles = compute_profiles(matrix, &labels, k, self.profile_size);

        let assignment = ClusterAssignment::from_labels(
            matrix.users().iter().copied().zip(labels).collect(),
        );
        let state = RecommenderState::from_parts(k, self.seed, assignment, profiles, true);

        info!(
            "Model trained in {:.4?}, cluster sizes {:?}",
            start.elapsed(),
            state.cluster_sizes()
        );
        Ok(state)
    }
}

/// Train a K-Means model with default profile size and iteration settings
pub fn train(matrix: &RatingMatrix, k: usize, seed: u64) -> Result<RecommenderState> {
    ClusterRecommender::new(k).with_seed(seed).train(matrix)
}

fn check_shape(matrix: &RatingMatrix, k: usize) -> Result<()> {
    let (users, items) = matrix.shape();
    if users < k || items == 0 {
        return Err(RecommenderError::InsufficientData {
            users,
            items,
            clusters: k,
        });
    }
    Ok(())
}

fn to_observations(matrix: &RatingMatrix) -> Result<Array2<f64>> {
    let cells: Vec<f64> = matrix.values().iter().map(|&v| f64::from(v)).collect();
    Array2::from_shape_vec(matrix.shape(), cells)
        .map_err(|e| RecommenderError::Clustering(e.to_string()))
}

fn distinct_rows(matrix: &RatingMatrix) -> usize {
    (0..matrix.shape().0)
        .filter_map(|i| matrix.row(i))
        .map(|row| row.iter().map(|v| v.to_bits()).collect::<Vec<_>>())
        .collect::<HashSet<_>>()
        .len()
}

/// Build one profile per cluster index `0..k` from row labels.
///
/// Clusters without members get all-zero means, so their profile is simply
/// the first `profile_size` columns.
pub(crate) fn compute_profiles(
    matrix: &RatingMatrix,
    labels: &[usize],
    k: usize,
    profile_size: usize,
) -> BTreeMap<usize, ClusterProfile> {
    (0..k)
        .into_par_iter()
        .map(|cluster| {
            let members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == cluster)
                .map(|(row, _)| row)
                .collect();
            let means = column_means(matrix, &members);
            (cluster, rank_items(matrix, &means, profile_size))
        })
        .collect()
}

/// Mean of each column over the given rows; all zeros for no rows
pub(crate) fn column_means(matrix: &RatingMatrix, rows: &[usize]) -> Vec<f64> {
    let mut sums = vec![0.0f64; matrix.shape().1];
    let mut count = 0usize;
    for row in rows.iter().filter_map(|&i| matrix.row(i)) {
        for (sum, &value) in sums.iter_mut().zip(row) {
            *sum += f64::from(value);
        }
        count += 1;
    }
    if count > 0 {
        for sum in &mut sums {
            *sum /= count as f64;
        }
    }
    sums
}

/// Rank columns by descending mean; `sort_by` is stable so ties keep column order
pub(crate) fn rank_items(matrix: &RatingMatrix, means: &[f64], size: usize) -> ClusterProfile {
    let mut order: Vec<usize> = (0..means.len()).collect();
    order.sort_by(|&a, &b| means[b].total_cmp(&means[a]));
    order.truncate(size);

    ClusterProfile::new(
        order
            .into_iter()
            .map(|column| ProfileEntry {
                item: matrix.items()[column].clone(),
                mean_rating: means[column],
            })
            .collect(),
    )
}
