use axum::{
    Json,
    extract::{Path, Query, State},
};
use data_loader::{ItemId, UserId};
use recommender::persistence;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};
use crate::routes::AppState;

/// Number of titles returned when the caller doesn't ask for a count
pub const DEFAULT_TOP_N: i64 = 5;

// Request/Response types

#[derive(Debug, Serialize, Deserialize)]
pub struct LandingPage {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub running_model: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub top_n: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: UserId,
    pub recommendations: Vec<ItemId>,
    pub model_version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub reloaded: bool,
    pub clusters: usize,
    pub users: usize,
}

// Handlers

pub async fn root() -> Json<LandingPage> {
    Json(LandingPage {
        status: "alive".to_string(),
        message: "Movie recommendation API".to_string(),
    })
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        running_model: state.model.is_ready().await,
    })
}

/// Recommendations for one user.
///
/// An unknown user gets `200` with an empty list; only a missing model is an error.
pub async fn recommend(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendParams>,
) -> ServerResult<Json<RecommendationResponse>> {
    let model = state.model.current().await.ok_or(ServerError::ModelUnavailable)?;

    // Negative counts behave like zero
    let top_n = usize::try_from(params.top_n.unwrap_or(DEFAULT_TOP_N)).unwrap_or(0);
    let recommendations = model.recommend(user_id, top_n);

    if recommendations.is_empty() {
        warn!("No recommendations for user {}", user_id);
    }

    Ok(Json(RecommendationResponse {
        user_id,
        recommendations,
        model_version: state.model_version.clone(),
    }))
}

/// Re-read the model snapshot from disk and swap it in
pub async fn reload(State(state): State<AppState>) -> ServerResult<Json<ReloadResponse>> {
    let path = state.model_path.clone();
    let loaded = tokio::task::spawn_blocking(move || persistence::load_from_path(&path)).await??;

    let response = ReloadResponse {
        reloaded: true,
        clusters: loaded.k(),
        users: loaded.user_count(),
    };
    state.model.replace(loaded).await;

    info!(
        "Model reloaded from {} ({} clusters, {} users)",
        state.model_path.display(),
        response.clusters,
        response.users
    );
    Ok(Json(response))
}
