// tests/api_test.rs — Integration test: HTTP scoring API

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use essaymark::api::{build_router, ApiState};
use essaymark::features::FEATURE_DIM;
use essaymark::feedback::FeedbackGenerator;
use essaymark::infra::config::Config;
use essaymark::model::forest::{ForestParams, ForestRegressor};
use essaymark::scoring::{ScoringPipeline, FALLBACK_SCORE};
use serde_json::{json, Value};
use tower::ServiceExt;

const ESSAY: &str = "The library should stay open late because students need quiet places to study and learn.";

fn offline_config() -> Config {
    let mut config = Config::default();
    config.models.artifact_dir = Some(PathBuf::from("/nonexistent/essaymark/models"));
    config.models.embeddings_file = Some(PathBuf::from("/nonexistent/essaymark/embeddings.vec"));
    config.models.corpus_file = Some(PathBuf::from("/nonexistent/essaymark/corpus.tsv"));
    config
}

/// A real fitted forest that predicts `value` for any feature row.
fn constant_forest(value: f64) -> ForestRegressor {
    let rows = vec![vec![0.0; FEATURE_DIM], vec![1.0; FEATURE_DIM]];
    let params = ForestParams {
        n_trees: 3,
        max_depth: 2,
        min_samples_split: 2,
        seed: 1,
    };
    ForestRegressor::fit(&rows, &[value, value], params).unwrap()
}

fn app_with_forest(score: f64) -> Router {
    let config = offline_config();
    build_router(ApiState {
        pipeline: Arc::new(ScoringPipeline::new(&config).with_forest(constant_forest(score))),
        feedback: Arc::new(FeedbackGenerator::new(config.feedback.clone())),
    })
}

fn app_without_models() -> Router {
    let config = offline_config();
    build_router(ApiState {
        pipeline: Arc::new(ScoringPipeline::new(&config)),
        feedback: Arc::new(FeedbackGenerator::new(config.feedback.clone())),
    })
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    json_response(app, req).await
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    json_response(app, req).await
}

async fn json_response(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_score_endpoint_happy_path() {
    let (status, body) = post_json(
        app_with_forest(5.0),
        "/score",
        json!({"essay": ESSAY, "essay_set": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 5.0 sits in the neutral calibration band for set 2
    let score = body["score"].as_f64().unwrap();
    assert!((score - 5.0).abs() < 1e-9, "score was {score}");
    assert!(body["feedback"].is_object());
}

#[tokio::test]
async fn test_score_defaults_to_set_one() {
    let (status, body) = post_json(app_with_forest(5.0), "/score", json!({"essay": ESSAY})).await;
    assert_eq!(status, StatusCode::OK);
    let score = body["score"].as_f64().unwrap();
    assert!((score - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_score_applies_set_calibration() {
    // set 4 damps scores above its pivot: 9.0 * 0.6 = 5.4
    let (status, body) = post_json(
        app_with_forest(9.0),
        "/score",
        json!({"essay": ESSAY, "essay_set": 4}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let score = body["score"].as_f64().unwrap();
    assert!((score - 5.4).abs() < 1e-9, "score was {score}");
}

#[tokio::test]
async fn test_score_rejects_short_essay() {
    let (status, body) = post_json(
        app_with_forest(5.0),
        "/score",
        json!({"essay": "too short", "essay_set": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("10"));
}

#[tokio::test]
async fn test_score_rejects_unknown_essay_set() {
    for set in [0, 9] {
        let (status, body) = post_json(
            app_with_forest(5.0),
            "/score",
            json!({"essay": ESSAY, "essay_set": set}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "set {set} accepted");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("between 1 and 8"));
    }
}

#[tokio::test]
async fn test_score_falls_back_without_models() {
    let (status, body) = post_json(
        app_without_models(),
        "/score",
        json!({"essay": ESSAY, "essay_set": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"].as_f64().unwrap(), FALLBACK_SCORE);
}

#[tokio::test]
async fn test_essay_sets_listing() {
    let (status, body) = get_json(app_without_models(), "/essay-sets").await;
    assert_eq!(status, StatusCode::OK);

    let sets = body["essay_sets"].as_array().unwrap();
    assert_eq!(sets.len(), 8);
    assert_eq!(sets[0]["id"], 1);
    assert_eq!(sets[0]["score_range"], "2-12");
    assert_eq!(sets[7]["score_range"], "0-60");
    assert!(sets[6]["description"]
        .as_str()
        .unwrap()
        .contains("patience"));
}

#[tokio::test]
async fn test_health_reports_version() {
    let (status, body) = get_json(app_without_models(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
