// src/api/types.rs

use serde::{Deserialize, Serialize};

use crate::feedback::FeedbackReport;

fn default_essay_set() -> u8 {
    1
}

/// Request body for scoring an essay.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub essay: String,
    /// Prompt family (1-8). Defaults to the persuasive-essay set.
    #[serde(default = "default_essay_set")]
    pub essay_set: u8,
}

/// Scored essay with grouped writing suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub score: f64,
    pub feedback: FeedbackReport,
}

/// One registered essay set.
#[derive(Debug, Clone, Serialize)]
pub struct EssaySetInfo {
    pub id: u8,
    pub description: String,
    /// Native grader range, e.g. "2-12".
    pub score_range: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EssaySetsResponse {
    pub essay_sets: Vec<EssaySetInfo>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
