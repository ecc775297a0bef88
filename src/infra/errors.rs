// src/infra/errors.rs — Error types for essaymark

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    // Model availability
    #[error("Model '{slot}' is not available")]
    ModelUnavailable { slot: &'static str },

    // Training
    #[error("Training corpus unavailable at '{path}': {message}")]
    TrainingData { path: PathBuf, message: String },

    #[error("Training failed: {0}")]
    Training(String),

    // Inference
    #[error("Prediction failed: {0}")]
    Prediction(String),

    // Artifact persistence
    #[error("Artifact '{name}' is malformed: {message}")]
    Artifact { name: String, message: String },

    #[error("Artifact '{name}' failed checksum verification")]
    ChecksumMismatch { name: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoreError {
    /// Stable kind label, so log and metrics layers can count failure
    /// classes even though scoring itself degrades to the fallback score.
    pub fn kind(&self) -> &'static str {
        match self {
            ScoreError::ModelUnavailable { .. } => "model_unavailable",
            ScoreError::TrainingData { .. } => "training_data",
            ScoreError::Training(_) => "training",
            ScoreError::Prediction(_) => "prediction",
            ScoreError::Artifact { .. } => "artifact",
            ScoreError::ChecksumMismatch { .. } => "checksum_mismatch",
            ScoreError::Config(_) => "config",
            ScoreError::Io(_) => "io",
        }
    }
}
