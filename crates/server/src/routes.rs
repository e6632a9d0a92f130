use axum::{
    Router,
    routing::{get, post},
};
use std::path::PathBuf;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::model::ModelHandle;

/// Version tag reported alongside every recommendation
pub const MODEL_VERSION: &str = "v1";

/// Shared application state, injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub model_path: PathBuf,
    pub model_version: String,
}

impl AppState {
    pub fn new(model: ModelHandle, model_path: impl Into<PathBuf>) -> Self {
        Self {
            model,
            model_path: model_path.into(),
            model_version: MODEL_VERSION.to_string(),
        }
    }
}

/// Creates the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/recommend/:user_id", get(handlers::recommend))
        .route("/reload", post(handlers::reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
