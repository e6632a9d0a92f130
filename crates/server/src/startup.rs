//! Model bootstrap at server start.
//!
//! 1. Load the snapshot at `model_path` if it exists
//! 2. Otherwise, when `train_on_startup` is set, build the matrix and train in
//!    the background, then save the snapshot and swap the model in
//! 3. Otherwise start without a model; `/health` reports it and
//!    `/recommend` answers 503 until a `/reload` succeeds

use recommender::{ClusterRecommender, Recommender, RecommenderError, RecommenderState, persistence};
use data_loader::MatrixBuilder;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::model::ModelHandle;

/// Build the matrix, train, and persist the snapshot. Blocking, CPU-bound.
pub fn train_and_save(config: &ServerConfig) -> ServerResult<RecommenderState> {
    let matrix = MatrixBuilder::new(&config.data_dir)
        .with_min_votes(config.min_votes)
        .build()?;

    let state = ClusterRecommender::new(config.n_clusters)
        .with_seed(config.seed)
        .train(&matrix)?;

    persistence::save_to_path(&state, &config.model_path)?;
    Ok(state)
}

/// Put a model into `handle` according to `config`.
///
/// Returns the background training task when one was started. A snapshot
/// that exists but fails to decode is reported as an error.
pub async fn bootstrap(
    config: &ServerConfig,
    handle: &ModelHandle,
) -> ServerResult<Option<JoinHandle<()>>> {
    let path = config.model_path.clone();
    let loaded = tokio::task::spawn_blocking(move || persistence::load_from_path(&path)).await?;

    match loaded {
        Ok(state) => {
            info!(
                "Model loaded into memory ({} clusters, {} users)",
                state.k(),
                state.user_count()
            );
            handle.replace(state).await;
            Ok(None)
        }
        Err(RecommenderError::NotFound { path }) if config.train_on_startup => {
            info!("No model at {}, training in the background", path.display());
            let config = config.clone();
            let handle = handle.clone();
            let task = tokio::spawn(async move {
                match tokio::task::spawn_blocking(move || train_and_save(&config)).await {
                    Ok(Ok(state)) => {
                        handle.replace(state).await;
                        info!("Background training finished, model is live");
                    }
                    Ok(Err(e)) => error!("Background training failed: {}", e),
                    Err(e) => error!("Background training task panicked: {}", e),
                }
            });
            Ok(Some(task))
        }
        Err(RecommenderError::NotFound { path }) => {
            error!("No model file at {}, serving without a model", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Abort a background training task that has not finished yet.
///
/// Returns `true` when a task was still running. The model is left as it is.
pub fn stop_training(task: Option<JoinHandle<()>>) -> bool {
    match task {
        Some(task) if !task.is_finished() => {
            task.abort();
            warn!("Background training still running at shutdown, abandoning it");
            true
        }
        _ => false,
    }
}
