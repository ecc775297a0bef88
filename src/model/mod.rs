// src/model/mod.rs — Trained regressors and their storage

pub mod embeddings;
pub mod forest;
pub mod persist;
pub mod sequence;

use crate::infra::errors::ScoreError;

/// A fitted model that maps feature rows to raw scores. The scoring
/// pipeline drives every ensemble member through this seam.
pub trait Regressor: Send + Sync {
    /// Stable identifier used in logs and artifact manifests.
    fn name(&self) -> &'static str;

    /// Predict one value per input row.
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ScoreError>;

    fn predict_one(&self, row: &[f64]) -> Result<f64, ScoreError> {
        let rows = [row.to_vec()];
        self.predict_batch(&rows)?
            .first()
            .copied()
            .ok_or_else(|| ScoreError::Prediction("empty prediction batch".into()))
    }
}
