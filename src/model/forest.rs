// src/model/forest.rs — Random forest regressor built from variance-splitting trees

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::infra::errors::ScoreError;
use crate::model::Regressor;

/// Residual variance below this is treated as pure.
const VARIANCE_EPS: f64 = 1e-12;

/// Fitting knobs. Defaults match the shipped scoring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Flat tree storage; children reference node indices in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Row width and node links are validated at the forest boundary, so
    /// the walk can index directly.
    fn predict(&self, row: &[f64]) -> f64 {
        let mut at = 0usize;
        loop {
            match &self.nodes[at] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [f64],
    params: ForestParams,
    nodes: Vec<TreeNode>,
}

impl<'a> TreeBuilder<'a> {
    fn build(rows: &'a [Vec<f64>], targets: &'a [f64], params: ForestParams, sample: &[usize]) -> DecisionTree {
        let mut builder = Self {
            rows,
            targets,
            params,
            nodes: Vec::new(),
        };
        builder.grow(sample, 0);
        DecisionTree { nodes: builder.nodes }
    }

    fn grow(&mut self, indices: &[usize], depth: usize) -> usize {
        let n = indices.len() as f64;
        let sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let sum_sq: f64 = indices.iter().map(|&i| self.targets[i] * self.targets[i]).sum();
        let mean = sum / n;
        let node_sse = (sum_sq - sum * sum / n).max(0.0);

        let at_limit = depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split.max(2)
            || node_sse <= VARIANCE_EPS;
        if at_limit {
            return self.push(TreeNode::Leaf { value: mean });
        }

        let Some((feature, threshold)) = self.best_split(indices, node_sse) else {
            return self.push(TreeNode::Leaf { value: mean });
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.rows[i][feature] <= threshold);
        if left.is_empty() || right.is_empty() {
            // midpoint rounded onto a sample value; nothing to gain here
            return self.push(TreeNode::Leaf { value: mean });
        }

        // reserve the slot before recursing so children land after it
        let id = self.push(TreeNode::Leaf { value: mean });
        let left_id = self.grow(&left, depth + 1);
        let right_id = self.grow(&right, depth + 1);
        self.nodes[id] = TreeNode::Split {
            feature,
            threshold,
            left: left_id,
            right: right_id,
        };
        id
    }

    /// Pick the (feature, threshold) pair with the lowest summed child
    /// variance, requiring a real improvement over the parent.
    fn best_split(&self, indices: &[usize], node_sse: f64) -> Option<(usize, f64)> {
        let width = self.rows[indices[0]].len();
        let total_n = indices.len() as f64;
        let total_sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.targets[i] * self.targets[i]).sum();

        let mut best: Option<(f64, usize, f64)> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(indices.len());
        for feature in 0..width {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (self.rows[i][feature], self.targets[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_n = 0.0;
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for i in 1..pairs.len() {
                let (value, target) = pairs[i - 1];
                left_n += 1.0;
                left_sum += target;
                left_sq += target * target;
                if value == pairs[i].0 {
                    continue;
                }

                let right_n = total_n - left_n;
                let left_sse = (left_sq - left_sum * left_sum / left_n).max(0.0);
                let right_sum = total_sum - left_sum;
                let right_sse = ((total_sq - left_sq) - right_sum * right_sum / right_n).max(0.0);
                let split_sse = left_sse + right_sse;
                if best.map_or(true, |(b, _, _)| split_sse < b) {
                    best = Some((split_sse, feature, (value + pairs[i].0) / 2.0));
                }
            }
        }

        match best {
            Some((sse, feature, threshold)) if sse < node_sse - VARIANCE_EPS => {
                Some((feature, threshold))
            }
            _ => None,
        }
    }

    fn push(&mut self, node: TreeNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Bootstrap-aggregated regression trees. Fitting is deterministic for a
/// given seed; serialized forests reproduce their predictions exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    params: ForestParams,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl ForestRegressor {
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], params: ForestParams) -> Result<Self, ScoreError> {
        if rows.is_empty() {
            return Err(ScoreError::Training("no training rows".into()));
        }
        if rows.len() != targets.len() {
            return Err(ScoreError::Training(format!(
                "{} rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        let n_features = rows[0].len();
        if n_features == 0 {
            return Err(ScoreError::Training("feature rows are empty".into()));
        }
        if rows.iter().any(|r| r.len() != n_features) {
            return Err(ScoreError::Training("ragged feature rows".into()));
        }
        if targets.iter().any(|t| !t.is_finite()) {
            return Err(ScoreError::Training("non-finite training target".into()));
        }
        if params.n_trees == 0 || params.max_depth == 0 {
            return Err(ScoreError::Training(
                "n_trees and max_depth must be positive".into(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let sample: Vec<usize> = (0..rows.len())
                .map(|_| rng.gen_range(0..rows.len()))
                .collect();
            trees.push(TreeBuilder::build(rows, targets, params, &sample));
        }

        Ok(Self {
            params,
            n_features,
            trees,
        })
    }

    /// Structural check for deserialized forests. `predict` walks node
    /// links and feature indices unchecked, so a load must reject anything
    /// a fit could not have produced.
    pub fn validate(&self) -> Result<(), ScoreError> {
        let malformed = |message: String| ScoreError::Artifact {
            name: "forest".into(),
            message,
        };

        if self.trees.is_empty() {
            return Err(malformed("forest has no trees".into()));
        }
        if self.n_features == 0 {
            return Err(malformed("forest reports zero-width feature rows".into()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(malformed(format!("tree {t} has no nodes")));
            }
            for (at, node) in tree.nodes.iter().enumerate() {
                let TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } = node
                else {
                    continue;
                };
                if *feature >= self.n_features {
                    return Err(malformed(format!(
                        "tree {t} node {at}: feature {feature} out of range for width {}",
                        self.n_features
                    )));
                }
                // children always land after their parent, so links must
                // point forward and stay inside the arena
                if *left <= at || *right <= at || *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                    return Err(malformed(format!("tree {t} node {at}: bad child link")));
                }
            }
        }
        Ok(())
    }

    pub fn params(&self) -> ForestParams {
        self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for ForestRegressor {
    fn name(&self) -> &'static str {
        "forest"
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ScoreError> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != self.n_features {
                return Err(ScoreError::Prediction(format!(
                    "expected {} features, got {}",
                    self.n_features,
                    row.len()
                )));
            }
            let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
            out.push(sum / self.trees.len() as f64);
        }
        Ok(out)
    }
}
