// src/api/handlers.rs

use crate::api::{types::*, ApiState, MIN_ESSAY_CHARS};
use crate::scoring::normalize;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

/// POST /score: score an essay and generate writing feedback.
pub async fn score_essay(
    State(state): State<ApiState>,
    Json(body): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, (StatusCode, Json<ErrorResponse>)> {
    if body.essay.chars().count() < MIN_ESSAY_CHARS {
        return Err(bad_request(format!(
            "essay must be at least {MIN_ESSAY_CHARS} characters"
        )));
    }
    if !normalize::is_known_set(body.essay_set) {
        return Err(bad_request("essay_set must be between 1 and 8".into()));
    }

    let pipeline = state.pipeline.clone();
    let feedback = state.feedback.clone();
    let essay_set = body.essay_set;
    let essay = body.essay;

    // Model inference is CPU-bound; keep it off the async workers. A first
    // request may also trigger lazy training in here.
    let result = tokio::task::spawn_blocking(move || {
        let score = pipeline.predict(&essay, essay_set);
        let report = feedback.generate(&essay);
        (score, report)
    })
    .await;

    match result {
        Ok((score, report)) => {
            debug!(essay_set, score, "Scored essay over HTTP");
            Ok(Json(ScoreResponse {
                score,
                feedback: report,
            }))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Scoring task failed: {e}"),
            }),
        )),
    }
}

/// GET /essay-sets: registered prompt families and their native ranges.
pub async fn list_essay_sets() -> Json<EssaySetsResponse> {
    let essay_sets = normalize::ESSAY_SETS
        .iter()
        .map(|set| EssaySetInfo {
            id: set.id,
            description: set.description.to_string(),
            score_range: format!("{}-{}", set.min_score, set.max_score),
        })
        .collect();
    Json(EssaySetsResponse { essay_sets })
}

/// GET /health: simple health check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn bad_request(error: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}
