// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::ScoreError;
use crate::infra::paths;
use crate::model::forest::ForestParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub ensemble: EnsembleConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding trained artifacts. Defaults to the data dir.
    pub artifact_dir: Option<PathBuf>,
    /// Word-vector table in word2vec/GloVe text format.
    pub embeddings_file: Option<PathBuf>,
    /// Tab-separated training corpus used for lazy and explicit training.
    pub corpus_file: Option<PathBuf>,
    /// Records taken from the head of the corpus when training.
    pub train_limit: usize,
    #[serde(default)]
    pub forest: ForestParams,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            artifact_dir: None,
            embeddings_file: None,
            corpus_file: None,
            train_limit: 500,
            forest: ForestParams::default(),
        }
    }
}

/// How the tree and sequence predictions are blended per essay set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Essay sets where the tree model carries the larger weight.
    pub tree_favored_sets: Vec<u8>,
    /// Tree weight on favored sets (sequence gets the complement).
    pub tree_weight_favored: f64,
    /// Tree weight everywhere else.
    pub tree_weight_default: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            tree_favored_sets: vec![1, 2, 6],
            tree_weight_favored: 0.6,
            tree_weight_default: 0.4,
        }
    }
}

/// Post-hoc score calibration. Defaults reproduce the factors fitted
/// against the ASAP reference corpus; retune after retraining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Set 4: scores above the pivot scale by `set4_above_factor`,
    /// the rest by `set4_below_factor`.
    pub set4_pivot: f64,
    pub set4_above_factor: f64,
    pub set4_below_factor: f64,
    /// Set 7: uniform damping.
    pub set7_factor: f64,

    /// Band edges for all other sets: [0, low_max) / [low_max, mid_max) /
    /// [mid_max, neutral_max] untouched / (neutral_max, high_max) / above.
    pub low_max: f64,
    pub mid_max: f64,
    pub neutral_max: f64,
    pub high_max: f64,
    pub low_factor: f64,
    pub mid_factor: f64,
    pub high_factor: f64,
    pub top_factor: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            set4_pivot: 2.0,
            set4_above_factor: 0.6,
            set4_below_factor: 0.4,
            set7_factor: 0.9,
            low_max: 2.0,
            mid_max: 4.0,
            neutral_max: 6.0,
            high_max: 8.0,
            low_factor: 0.5,
            mid_factor: 0.8,
            high_factor: 1.05,
            top_factor: 1.1,
        }
    }
}

/// Thresholds that trigger writing suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    pub long_sentence_words: f64,
    pub long_word_chars: f64,
    pub flat_tone_polarity: f64,
    pub spelling_error_limit: f64,
    pub grammar_error_limit: f64,
    pub style_error_limit: f64,
    pub vocab_richness_floor: f64,
    pub sentence_start_floor: f64,
    pub discourse_marker_floor: f64,
    pub topic_development_floor: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            long_sentence_words: 35.0,
            long_word_chars: 6.0,
            flat_tone_polarity: 0.3,
            spelling_error_limit: 3.0,
            grammar_error_limit: 2.0,
            style_error_limit: 2.0,
            vocab_richness_floor: 0.4,
            sentence_start_floor: 5.0,
            discourse_marker_floor: 3.0,
            topic_development_floor: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolved artifact directory.
    pub fn artifact_dir(&self) -> PathBuf {
        self.models
            .artifact_dir
            .clone()
            .unwrap_or_else(paths::model_dir)
    }

    /// Resolved embeddings file.
    pub fn embeddings_file(&self) -> PathBuf {
        self.models
            .embeddings_file
            .clone()
            .unwrap_or_else(paths::embeddings_path)
    }

    /// Resolved training corpus file.
    pub fn corpus_file(&self) -> PathBuf {
        self.models
            .corpus_file
            .clone()
            .unwrap_or_else(paths::default_corpus_path)
    }

    /// Reject configs that would make scoring nonsensical rather than
    /// letting them surface as confusing predictions later.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.models.train_limit == 0 {
            return Err(ScoreError::Config("train_limit must be at least 1".into()));
        }
        if self.models.forest.n_trees == 0 {
            return Err(ScoreError::Config("forest.n_trees must be at least 1".into()));
        }
        if self.models.forest.max_depth == 0 {
            return Err(ScoreError::Config(
                "forest.max_depth must be at least 1".into(),
            ));
        }

        for (name, w) in [
            ("tree_weight_favored", self.ensemble.tree_weight_favored),
            ("tree_weight_default", self.ensemble.tree_weight_default),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(ScoreError::Config(format!(
                    "ensemble.{name} must be within [0, 1], got {w}"
                )));
            }
        }

        let c = &self.calibration;
        let edges = [c.low_max, c.mid_max, c.neutral_max, c.high_max];
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ScoreError::Config(
                "calibration band edges must be strictly increasing".into(),
            ));
        }
        let factors = [
            c.set4_above_factor,
            c.set4_below_factor,
            c.set7_factor,
            c.low_factor,
            c.mid_factor,
            c.high_factor,
            c.top_factor,
        ];
        if factors.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(ScoreError::Config(
                "calibration factors must be finite and non-negative".into(),
            ));
        }

        Ok(())
    }
}
