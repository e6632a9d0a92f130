use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use data_loader::RatingMatrix;
use recommender::{RecommenderState, persistence, train};
use serde_json::Value;
use std::path::PathBuf;
use tower::ServiceExt;

use server::{AppState, ModelHandle, create_router};

fn trained_state() -> RecommenderState {
    let items: Vec<String> = ["Alien", "Heat", "Up", "Zodiac"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = vec![
        vec![5.0, 4.5, 0.0, 0.5],
        vec![4.5, 5.0, 0.5, 0.0],
        vec![0.0, 0.5, 5.0, 4.0],
        vec![0.5, 0.0, 4.5, 5.0],
    ];
    let matrix = RatingMatrix::new(vec![1, 2, 3, 4], items, rows).unwrap();
    train(&matrix, 2, 42).unwrap()
}

fn app_with(model: ModelHandle, model_path: PathBuf) -> Router {
    create_router(AppState::new(model, model_path))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_root() {
    let app = app_with(ModelHandle::empty(), PathBuf::from("unused.json"));
    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_health_reports_model_presence() {
    let (status, body) = get(app_with(ModelHandle::empty(), "unused.json".into()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "ok", "running_model": false }));

    let (_, body) = get(
        app_with(ModelHandle::new(trained_state()), "unused.json".into()),
        "/health",
    )
    .await;
    assert_eq!(body["running_model"], true);
}

#[tokio::test]
async fn test_recommend_without_model_is_503() {
    let app = app_with(ModelHandle::empty(), "unused.json".into());
    let (status, body) = get(app, "/recommend/1").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recommend_known_user() {
    let app = app_with(ModelHandle::new(trained_state()), "unused.json".into());
    let (status, body) = get(app, "/recommend/1?top_n=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], 1);
    assert_eq!(body["model_version"], "v1");
    assert_eq!(body["recommendations"], serde_json::json!(["Alien", "Heat"]));
}

#[tokio::test]
async fn test_recommend_default_top_n() {
    let app = app_with(ModelHandle::new(trained_state()), "unused.json".into());
    let (_, body) = get(app, "/recommend/3").await;

    // Profiles only hold 4 items, fewer than the default of 5
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);
    assert_eq!(body["recommendations"][0], "Up");
}

#[tokio::test]
async fn test_recommend_unknown_user_is_empty() {
    let app = app_with(ModelHandle::new(trained_state()), "unused.json".into());
    let (status, body) = get(app, "/recommend/999").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn test_recommend_negative_top_n_is_empty() {
    let app = app_with(ModelHandle::new(trained_state()), "unused.json".into());
    let (status, body) = get(app, "/recommend/1?top_n=-3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn test_reload_swaps_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_v1.json");
    persistence::save_to_path(&trained_state(), &path).unwrap();

    let model = ModelHandle::empty();
    let request = Request::post("/reload").body(Body::empty()).unwrap();
    let (status, body) = send(app_with(model.clone(), path), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reloaded"], true);
    assert_eq!(body["clusters"], 2);
    assert_eq!(body["users"], 4);
    assert!(model.is_ready().await);
}

#[tokio::test]
async fn test_reload_missing_file_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let model = ModelHandle::empty();
    let request = Request::post("/reload").body(Body::empty()).unwrap();

    let (status, _) = send(app_with(model.clone(), dir.path().join("absent.json")), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!model.is_ready().await);
}

#[tokio::test]
async fn test_reload_corrupt_file_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_v1.json");
    std::fs::write(&path, b"{ broken").unwrap();

    let model = ModelHandle::empty();
    let request = Request::post("/reload").body(Body::empty()).unwrap();
    let (status, body) = send(app_with(model.clone(), path.clone()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(!model.is_ready().await);

    // A model that is already serving survives the failed reload
    let serving = ModelHandle::new(trained_state());
    let request = Request::post("/reload").body(Body::empty()).unwrap();
    let (status, _) = send(app_with(serving.clone(), path), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(serving.current().await.unwrap().recommend(1, 1), vec!["Alien"]);
}
