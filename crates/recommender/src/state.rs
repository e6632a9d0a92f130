//! Trained model state and the recommendation lookup.
//!
//! A [`RecommenderState`] is produced by training (or by loading a snapshot)
//! and never mutated afterwards. Sharing it behind an `Arc` is enough for
//! concurrent lookups; swapping in a retrained model replaces the whole value.

use data_loader::{ItemId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, warn};

/// Default number of items kept per cluster profile
pub const DEFAULT_PROFILE_SIZE: usize = 20;

/// Maps every trained user to a cluster index in `[0, k)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: BTreeMap<UserId, usize>,
}

impl ClusterAssignment {
    pub(crate) fn from_labels(labels: BTreeMap<UserId, usize>) -> Self {
        Self { labels }
    }

    pub fn cluster_of(&self, user_id: UserId) -> Option<usize> {
        self.labels.get(&user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// (user, cluster) pairs in ascending user order
    pub fn iter(&self) -> impl Iterator<Item = (UserId, usize)> + '_ {
        self.labels.iter().map(|(&user, &cluster)| (user, cluster))
    }

    /// Users assigned to `cluster`, ascending
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = UserId> + '_ {
        self.iter()
            .filter(move |&(_, c)| c == cluster)
            .map(|(user, _)| user)
    }

    /// Member count per cluster index
    pub fn sizes(&self, k: usize) -> Vec<usize> {
        let mut sizes = vec![0; k];
        for &cluster in self.labels.values() {
            if let Some(size) = sizes.get_mut(cluster) {
                *size += 1;
            }
        }
        sizes
    }
}

/// One ranked item inside a cluster profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub item: ItemId,
    /// Mean rating over the cluster's members, unrated cells counted as 0
    pub mean_rating: f64,
}

/// Items ranked by descending mean rating within one cluster
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterProfile {
    entries: Vec<ProfileEntry>,
}

impl ClusterProfile {
    pub fn new(entries: Vec<ProfileEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemId> + '_ {
        self.entries.iter().map(|entry| &entry.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First `n` items in rank order (fewer if the profile is shorter)
    pub fn top(&self, n: usize) -> Vec<ItemId> {
        self.items().take(n).cloned().collect()
    }
}

/// Everything a trained cluster model needs to answer lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderState {
    k: usize,
    seed: u64,
    assignment: ClusterAssignment,
    profiles: BTreeMap<usize, ClusterProfile>,
    fitted: bool,
}

impl RecommenderState {
    /// A state that has not been trained yet. Every lookup returns nothing.
    pub fn unfitted(k: usize) -> Self {
        Self {
            k,
            seed: 0,
            assignment: ClusterAssignment::default(),
            profiles: BTreeMap::new(),
            fitted: false,
        }
    }

    pub(crate) fn from_parts(
        k: usize,
        seed: u64,
        assignment: ClusterAssignment,
        profiles: BTreeMap<usize, ClusterProfile>,
        fitted: bool,
    ) -> Self {
        Self {
            k,
            seed,
            assignment,
            profiles,
            fitted,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn assignment(&self) -> &ClusterAssignment {
        &self.assignment
    }

    pub fn profiles(&self) -> &BTreeMap<usize, ClusterProfile> {
        &self.profiles
    }

    pub fn profile(&self, cluster: usize) -> Option<&ClusterProfile> {
        self.profiles.get(&cluster)
    }

    pub fn cluster_of(&self, user_id: UserId) -> Option<usize> {
        self.assignment.cluster_of(user_id)
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.assignment.sizes(self.k)
    }

    pub fn user_count(&self) -> usize {
        self.assignment.len()
    }

    /// Top `top_n` items of the user's cluster profile.
    ///
    /// Returns an empty list for an unfitted model, an unknown user or
    /// `top_n == 0`. Never fails.
    pub fn recommend(&self, user_id: UserId, top_n: usize) -> Vec<ItemId> {
        if !self.fitted {
            error!("Model is not trained, returning no recommendations");
            return Vec::new();
        }

        let Some(cluster) = self.assignment.cluster_of(user_id) else {
            warn!("User {} is unknown, returning no recommendations", user_id);
            return Vec::new();
        };

        self.profiles
            .get(&cluster)
            .map(|profile| profile.top(top_n))
            .unwrap_or_default()
    }
}

/// Free-function form of [`RecommenderState::recommend`]
pub fn recommend(state: &RecommenderState, user_id: UserId, top_n: usize) -> Vec<ItemId> {
    state.recommend(user_id, top_n)
}

/// Whether `state` came out of a completed training run
pub fn is_fitted(state: &RecommenderState) -> bool {
    state.is_fitted()
}
