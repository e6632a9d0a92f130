use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use data_loader::DataLoadError;
use recommender::RecommenderError;
use serde_json::json;

/// Serving-layer errors
///
/// The core never fails a lookup; these cover a missing model and the
/// load/train paths behind reload and startup.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Model is not ready")]
    ModelUnavailable,

    #[error(transparent)]
    Recommender(#[from] RecommenderError),

    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("Background task failed: {}", err))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Recommender(RecommenderError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServerError::Recommender(
                RecommenderError::InsufficientData { .. } | RecommenderError::InvalidClusterCount(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::DataLoad(DataLoadError::MissingSourceData { .. }) => StatusCode::NOT_FOUND,
            ServerError::Recommender(_) | ServerError::DataLoad(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
