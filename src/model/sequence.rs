// src/model/sequence.rs — Dense feed-forward scorer over embedding vectors

use serde::{Deserialize, Serialize};

use crate::infra::errors::ScoreError;
use crate::model::Regressor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Tanh,
    Linear,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }
}

/// One fully-connected layer. `weights` is row-major, one row per output
/// unit, each row as wide as the layer input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn apply(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let dot: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.activation.apply(dot + b)
            })
            .collect()
    }
}

/// Inference-only network scoring averaged word embeddings. Weights come
/// from a serialized artifact; there is no training path here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceModel {
    pub input_dim: usize,
    pub layers: Vec<DenseLayer>,
}

impl SequenceModel {
    /// Check layer shapes chain together and end in a single output.
    pub fn validate(&self) -> Result<(), ScoreError> {
        let malformed = |message: String| ScoreError::Artifact {
            name: "sequence".into(),
            message,
        };

        if self.layers.is_empty() {
            return Err(malformed("model has no layers".into()));
        }
        let mut dim = self.input_dim;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.weights.len() != layer.bias.len() {
                return Err(malformed(format!(
                    "layer {i}: {} weight rows but {} biases",
                    layer.weights.len(),
                    layer.bias.len()
                )));
            }
            if layer.weights.is_empty() {
                return Err(malformed(format!("layer {i} has no units")));
            }
            if let Some(row) = layer.weights.iter().find(|r| r.len() != dim) {
                return Err(malformed(format!(
                    "layer {i}: weight row of width {} does not match input width {dim}",
                    row.len()
                )));
            }
            dim = layer.weights.len();
        }
        if dim != 1 {
            return Err(malformed(format!("final layer emits {dim} values, want 1")));
        }
        Ok(())
    }

    fn forward(&self, input: &[f64]) -> f64 {
        let mut acts = input.to_vec();
        for layer in &self.layers {
            acts = layer.apply(&acts);
        }
        acts.first().copied().unwrap_or(0.0)
    }
}

impl Regressor for SequenceModel {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ScoreError> {
        rows.iter()
            .map(|row| {
                if row.len() != self.input_dim {
                    return Err(ScoreError::Prediction(format!(
                        "expected {} inputs, got {}",
                        self.input_dim,
                        row.len()
                    )));
                }
                Ok(self.forward(row))
            })
            .collect()
    }
}
