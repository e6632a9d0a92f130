//! Model persistence with an explicit, versioned JSON schema.
//!
//! Layout of a snapshot (format version 1):
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "k": 5,
//!   "seed": 42,
//!   "fitted": true,
//!   "assignments": [{ "user_id": 1, "cluster": 3 }],
//!   "profiles": [{ "cluster": 3, "items": [{ "item": "Heat (1995)", "mean_rating": 4.1 }] }]
//! }
//! ```
//!
//! Loading checks the version first and then every state invariant, so a
//! snapshot that decodes is safe to serve.

use crate::error::{RecommenderError, Result};
use crate::state::{ClusterAssignment, ClusterProfile, ProfileEntry, RecommenderState};
use data_loader::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Snapshot format written by [`save`]
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelSnapshot {
    format_version: u32,
    k: usize,
    seed: u64,
    fitted: bool,
    assignments: Vec<AssignmentRow>,
    profiles: Vec<ProfileRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AssignmentRow {
    user_id: UserId,
    cluster: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileRow {
    cluster: usize,
    items: Vec<ProfileEntry>,
}

/// Only the version field, read before committing to a full decode
#[derive(Debug, Deserialize)]
struct VersionProbe {
    format_version: u32,
}

impl From<&RecommenderState> for ModelSnapshot {
    fn from(state: &RecommenderState) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            k: state.k(),
            seed: state.seed(),
            fitted: state.is_fitted(),
            assignments: state
                .assignment()
                .iter()
                .map(|(user_id, cluster)| AssignmentRow { user_id, cluster })
                .collect(),
            profiles: state
                .profiles()
                .iter()
                .map(|(&cluster, profile)| ProfileRow {
                    cluster,
                    items: profile.entries().to_vec(),
                })
                .collect(),
        }
    }
}

impl TryFrom<ModelSnapshot> for RecommenderState {
    type Error = RecommenderError;

    fn try_from(snapshot: ModelSnapshot) -> Result<Self> {
        let k = snapshot.k;
        if snapshot.fitted && k == 0 {
            return Err(corrupt("fitted model has 0 clusters"));
        }

        let mut labels = BTreeMap::new();
        for row in snapshot.assignments {
            if row.cluster >= k {
                return Err(corrupt(format!(
                    "user {} assigned to cluster {} but k is {}",
                    row.user_id, row.cluster, k
                )));
            }
            if labels.insert(row.user_id, row.cluster).is_some() {
                return Err(corrupt(format!("user {} assigned twice", row.user_id)));
            }
        }

        let mut profiles = BTreeMap::new();
        for row in snapshot.profiles {
            if row.cluster >= k {
                return Err(corrupt(format!("profile for cluster {} but k is {}", row.cluster, k)));
            }
            if let Some(entry) = row.items.iter().find(|e| !e.mean_rating.is_finite()) {
                return Err(corrupt(format!("non-finite mean rating for '{}'", entry.item)));
            }
            if profiles.insert(row.cluster, ClusterProfile::new(row.items)).is_some() {
                return Err(corrupt(format!("cluster {} has two profiles", row.cluster)));
            }
        }

        if snapshot.fitted && profiles.len() != k {
            return Err(corrupt(format!(
                "fitted model has {} profiles for {} clusters",
                profiles.len(),
                k
            )));
        }

        Ok(RecommenderState::from_parts(
            k,
            snapshot.seed,
            ClusterAssignment::from_labels(labels),
            profiles,
            snapshot.fitted,
        ))
    }
}

fn corrupt(reason: impl Into<String>) -> RecommenderError {
    RecommenderError::CorruptState(reason.into())
}

/// Serialize a state into a snapshot blob
pub fn save(state: &RecommenderState) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&ModelSnapshot::from(state))?)
}

/// Decode a snapshot blob.
///
/// Fails with [`RecommenderError::UnsupportedVersion`] for an unknown format
/// version and [`RecommenderError::CorruptState`] for anything malformed.
pub fn load(bytes: &[u8]) -> Result<RecommenderState> {
    let probe: VersionProbe =
        serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
    if probe.format_version != FORMAT_VERSION {
        return Err(RecommenderError::UnsupportedVersion {
            found: probe.format_version,
            supported: FORMAT_VERSION,
        });
    }

    let snapshot: ModelSnapshot =
        serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
    RecommenderState::try_from(snapshot)
}

/// Write a snapshot to `path`, creating parent directories as needed
pub fn save_to_path(state: &RecommenderState, path: &Path) -> Result<()> {
    info!("Saving model to {}", path.display());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, save(state)?)?;
    Ok(())
}

/// Read a snapshot from `path`; a missing file is [`RecommenderError::NotFound`]
pub fn load_from_path(path: &Path) -> Result<RecommenderState> {
    if !path.exists() {
        return Err(RecommenderError::NotFound {
            path: path.to_path_buf(),
        });
    }
    info!("Loading model from {}", path.display());
    let bytes = fs::read(path)?;
    load(&bytes)
}
