// src/scoring/mod.rs — Scoring pipeline: features, ensemble members, calibration

pub mod calibrate;
pub mod ensemble;
pub mod normalize;

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info, warn};

use crate::corpus::{self, TrainingRecord};
use crate::features::{self, FeatureExtractor};
use crate::infra::config::Config;
use crate::infra::errors::ScoreError;
use crate::model::embeddings::EmbeddingTable;
use crate::model::forest::ForestRegressor;
use crate::model::persist;
use crate::model::sequence::SequenceModel;
use crate::model::Regressor;

/// Returned whenever scoring cannot produce a real prediction. Callers
/// always get a number on the output scale.
pub const FALLBACK_SCORE: f64 = 5.0;

/// End-to-end scorer. Holds the trained ensemble members and drives
/// preprocess, extraction, blending and calibration.
///
/// The tree model slot is lazily fillable: the first `predict` without a
/// trained forest fits one from the configured corpus, exactly once, and
/// concurrent callers wait rather than racing duplicate fits.
pub struct ScoringPipeline {
    config: Config,
    extractor: FeatureExtractor,
    forest: RwLock<Option<Arc<ForestRegressor>>>,
    sequence: Option<Arc<SequenceModel>>,
    embeddings: Option<Arc<EmbeddingTable>>,
    train_lock: Mutex<()>,
    #[cfg(test)]
    fit_count: AtomicUsize,
}

impl ScoringPipeline {
    /// Pipeline with no trained members. Scoring will lazily train the
    /// forest when first asked.
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            extractor: FeatureExtractor::new(),
            forest: RwLock::new(None),
            sequence: None,
            embeddings: None,
            train_lock: Mutex::new(()),
            #[cfg(test)]
            fit_count: AtomicUsize::new(0),
        }
    }

    /// Load whatever artifacts the config points at. Each member is
    /// optional; a failed load logs and leaves the slot empty instead of
    /// failing construction.
    pub fn from_config(config: &Config) -> Self {
        let dir = config.artifact_dir();
        let forest = match persist::load_forest(&dir) {
            Ok(Some(model)) => {
                info!("Loaded forest model ({} trees) from {}", model.n_trees(), dir.display());
                Some(Arc::new(model))
            }
            Ok(None) => {
                debug!("No forest artifact at {}", dir.display());
                None
            }
            Err(e) => {
                warn!(kind = e.kind(), "Skipping forest artifact: {e}");
                None
            }
        };
        let sequence = match persist::load_sequence(&dir) {
            Ok(Some(model)) => {
                info!("Loaded sequence model from {}", dir.display());
                Some(Arc::new(model))
            }
            Ok(None) => {
                debug!("No sequence artifact at {}", dir.display());
                None
            }
            Err(e) => {
                warn!(kind = e.kind(), "Skipping sequence artifact: {e}");
                None
            }
        };

        let embeddings_path = config.embeddings_file();
        let embeddings = if embeddings_path.exists() {
            match EmbeddingTable::load(&embeddings_path) {
                Ok(table) if !table.is_empty() => {
                    info!("Loaded {} word vectors (dim {})", table.len(), table.dim());
                    Some(Arc::new(table))
                }
                Ok(_) => {
                    warn!("Embedding table at {} is empty", embeddings_path.display());
                    None
                }
                Err(e) => {
                    warn!(kind = e.kind(), "Skipping embeddings: {e}");
                    None
                }
            }
        } else {
            debug!("No embeddings file at {}", embeddings_path.display());
            None
        };

        Self {
            config: config.clone(),
            extractor: FeatureExtractor::new(),
            forest: RwLock::new(forest),
            sequence,
            embeddings,
            train_lock: Mutex::new(()),
            #[cfg(test)]
            fit_count: AtomicUsize::new(0),
        }
    }

    pub fn with_forest(self, model: ForestRegressor) -> Self {
        Self {
            forest: RwLock::new(Some(Arc::new(model))),
            ..self
        }
    }

    pub fn with_sequence(self, model: SequenceModel) -> Self {
        Self {
            sequence: Some(Arc::new(model)),
            ..self
        }
    }

    pub fn with_embeddings(self, table: EmbeddingTable) -> Self {
        Self {
            embeddings: Some(Arc::new(table)),
            ..self
        }
    }

    pub fn has_forest(&self) -> bool {
        matches!(self.read_forest(), Ok(Some(_)))
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence.is_some()
    }

    /// Score an essay on [0, 10]. Never fails: any internal error is
    /// logged and degrades to [`FALLBACK_SCORE`].
    pub fn predict(&self, essay: &str, essay_set_id: u8) -> f64 {
        match self.predict_inner(essay, essay_set_id) {
            Ok(score) => score,
            Err(e) => {
                warn!(
                    kind = e.kind(),
                    essay_set = essay_set_id,
                    "Scoring degraded to fallback: {e}"
                );
                FALLBACK_SCORE
            }
        }
    }

    fn predict_inner(&self, essay: &str, essay_set_id: u8) -> Result<f64, ScoreError> {
        let forest = self.ensure_forest()?;
        let cleaned = features::preprocess(essay);
        let record = self.extractor.extract(&cleaned);

        let tree_score = self.member_score(forest.as_ref(), &record.as_row())?;
        let sequence_score = self.sequence_score(&cleaned)?;

        let blended = ensemble::blend(
            Some(tree_score),
            sequence_score,
            essay_set_id,
            &self.config.ensemble,
        )
        .unwrap_or(tree_score);

        let bounded = blended.clamp(normalize::SCALE_MIN, normalize::SCALE_MAX);
        let calibrated = calibrate::calibrate(bounded, essay_set_id, &self.config.calibration);
        Ok(calibrated.clamp(normalize::SCALE_MIN, normalize::SCALE_MAX))
    }

    fn member_score(&self, member: &dyn Regressor, row: &[f64]) -> Result<f64, ScoreError> {
        let score = member.predict_one(row)?;
        debug!(member = member.name(), score, "Ensemble member scored essay");
        Ok(score)
    }

    /// Sequence-model score over the averaged word vectors of the cleaned
    /// text; `None` when the model or the embedding table is absent.
    fn sequence_score(&self, cleaned: &str) -> Result<Option<f64>, ScoreError> {
        let (Some(model), Some(table)) = (&self.sequence, &self.embeddings) else {
            return Ok(None);
        };
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        let vector = table.average(&tokens);
        let row: Vec<f64> = vector.iter().map(|v| f64::from(*v)).collect();
        let score = self.member_score(model.as_ref(), &row)?;
        Ok(Some(score))
    }

    fn read_forest(&self) -> Result<Option<Arc<ForestRegressor>>, ScoreError> {
        self.forest
            .read()
            .map(|slot| slot.clone())
            .map_err(|_| ScoreError::Prediction("forest slot lock poisoned".into()))
    }

    /// Get the forest, training it from the configured corpus if no model
    /// is loaded yet. Double-checked under the training lock so concurrent
    /// first predictions fit at most once.
    fn ensure_forest(&self) -> Result<Arc<ForestRegressor>, ScoreError> {
        if let Some(model) = self.read_forest()? {
            return Ok(model);
        }

        let _guard = self
            .train_lock
            .lock()
            .map_err(|_| ScoreError::Training("training lock poisoned".into()))?;
        // another caller may have finished training while we waited
        if let Some(model) = self.read_forest()? {
            return Ok(model);
        }

        let path = self.config.corpus_file();
        info!("No trained model available; fitting from {}", path.display());
        let records = corpus::load_corpus(&path)?;
        self.train_records(&records)?;
        self.read_forest()?
            .ok_or(ScoreError::ModelUnavailable { slot: "forest" })
    }

    /// Fit the forest from parallel essay/score slices, normalizing each
    /// score against its set's native range. Essays without set ids are
    /// treated as set 1. Takes at most the configured number of records
    /// from the front.
    pub fn train(
        &self,
        essays: &[String],
        scores: &[f64],
        essay_sets: Option<&[u8]>,
    ) -> Result<usize, ScoreError> {
        if essays.is_empty() {
            return Err(ScoreError::Training("no training essays".into()));
        }
        let set_count = essay_sets.map_or(essays.len(), <[u8]>::len);
        if essays.len() != scores.len() || essays.len() != set_count {
            return Err(ScoreError::Training(format!(
                "mismatched training inputs: {} essays, {} scores, {} set ids",
                essays.len(),
                scores.len(),
                set_count
            )));
        }

        let limit = self.config.models.train_limit.min(essays.len());
        let cleaned: Vec<String> = essays[..limit].iter().map(|e| features::preprocess(e)).collect();
        let targets: Vec<f64> = scores[..limit]
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let set = essay_sets.map_or(1, |sets| sets[i]);
                normalize::normalize_score(*score, set)
            })
            .collect();
        self.fit(&cleaned, &targets)
    }

    pub fn train_from_corpus(&self, path: &Path) -> Result<usize, ScoreError> {
        let records = corpus::load_corpus(path)?;
        info!("Loaded {} corpus records from {}", records.len(), path.display());
        self.train_records(&records)
    }

    fn train_records(&self, records: &[TrainingRecord]) -> Result<usize, ScoreError> {
        if records.is_empty() {
            return Err(ScoreError::Training(
                "training corpus has no usable records".into(),
            ));
        }
        let limit = self.config.models.train_limit.min(records.len());
        let head = &records[..limit];
        let cleaned: Vec<String> = head.iter().map(|r| features::preprocess(&r.essay)).collect();
        let targets: Vec<f64> = head
            .iter()
            .map(|r| normalize::normalize_score(r.score, r.essay_set))
            .collect();
        self.fit(&cleaned, &targets)
    }

    fn fit(&self, cleaned: &[String], targets: &[f64]) -> Result<usize, ScoreError> {
        #[cfg(test)]
        self.fit_count.fetch_add(1, Ordering::SeqCst);
        let records = self.extractor.extract_batch(cleaned);
        let rows: Vec<Vec<f64>> = records.iter().map(|r| r.as_row().to_vec()).collect();
        let model = ForestRegressor::fit(&rows, targets, self.config.models.forest)?;
        info!("Trained forest on {} essays ({} trees)", rows.len(), model.n_trees());

        let mut slot = self
            .forest
            .write()
            .map_err(|_| ScoreError::Training("forest slot lock poisoned".into()))?;
        *slot = Some(Arc::new(model));
        Ok(rows.len())
    }

    /// Persist the trained members to `dir`. Saving with nothing trained
    /// is a no-op.
    pub fn save_models(&self, dir: &Path) -> Result<(), ScoreError> {
        let forest = self.read_forest()?;
        let manifest = persist::save_models(dir, forest.as_deref(), self.sequence.as_deref())?;
        debug!("Save manifest lists {} artifact(s)", manifest.artifacts.len());
        Ok(())
    }

    /// Replace the forest and sequence members with artifacts from `dir`,
    /// keeping current members where loading fails. The embedding table is
    /// not restored here: it is configuration read from its own configured
    /// file, never persisted beside the models, and stays as-is.
    pub fn load_models(&mut self, dir: &Path) {
        match persist::load_forest(dir) {
            Ok(Some(model)) => {
                info!("Loaded forest model ({} trees) from {}", model.n_trees(), dir.display());
                self.forest = RwLock::new(Some(Arc::new(model)));
            }
            Ok(None) => debug!("No forest artifact at {}", dir.display()),
            Err(e) => warn!(kind = e.kind(), "Keeping current forest: {e}"),
        }
        match persist::load_sequence(dir) {
            Ok(Some(model)) => {
                info!("Loaded sequence model from {}", dir.display());
                self.sequence = Some(Arc::new(model));
            }
            Ok(None) => debug!("No sequence artifact at {}", dir.display()),
            Err(e) => warn!(kind = e.kind(), "Keeping current sequence model: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_DIM;
    use crate::model::forest::ForestParams;
    use crate::model::sequence::{Activation, DenseLayer};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Config whose every path points nowhere, so tests never touch real
    /// user directories.
    fn offline_config() -> Config {
        let mut config = Config::default();
        config.models.artifact_dir = Some(PathBuf::from("/nonexistent/essaymark/models"));
        config.models.embeddings_file = Some(PathBuf::from("/nonexistent/essaymark/embeddings.vec"));
        config.models.corpus_file = Some(PathBuf::from("/nonexistent/essaymark/corpus.tsv"));
        config
    }

    /// A real fitted forest that predicts `value` for every input row.
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

    /// Zero-weight linear head: outputs its bias for any input.
    fn constant_sequence(value: f64, dim: usize) -> SequenceModel {
        SequenceModel {
            input_dim: dim,
            layers: vec![DenseLayer {
                weights: vec![vec![0.0; dim]],
                bias: vec![value],
                activation: Activation::Linear,
            }],
        }
    }

    #[test]
    fn test_predict_blends_and_calibrates() {
        let pipeline = ScoringPipeline::new(&offline_config())
            .with_forest(constant_forest(6.0))
            .with_sequence(constant_sequence(8.0, 3))
            .with_embeddings(EmbeddingTable::parse("good 1.0 2.0 3.0\n"));

        // favored set: 0.6*6 + 0.4*8 = 6.8, then the (6, 8) boost
        let score = pipeline.predict("A good essay about anything at all.", 1);
        assert!(close(score, 6.8 * 1.05), "got {score}");

        // default weighting: 0.4*6 + 0.6*8 = 7.2
        let score = pipeline.predict("A good essay about anything at all.", 3);
        assert!(close(score, 7.2 * 1.05), "got {score}");
    }

    #[test]
    fn test_predict_forest_only() {
        let pipeline = ScoringPipeline::new(&offline_config()).with_forest(constant_forest(5.0));
        // neutral band leaves the score alone
        assert!(close(pipeline.predict("Plain essay text goes here.", 9), 5.0));
        // set 4 damps above its pivot
        assert!(close(pipeline.predict("Plain essay text goes here.", 4), 3.0));
    }

    #[test]
    fn test_predict_falls_back_without_models_or_corpus() {
        let pipeline = ScoringPipeline::new(&offline_config());
        assert!(!pipeline.has_forest());
        let score = pipeline.predict("Essay that cannot be scored.", 1);
        assert_eq!(score, FALLBACK_SCORE);
    }

    #[test]
    fn test_predict_stays_on_scale() {
        let pipeline = ScoringPipeline::new(&offline_config()).with_forest(constant_forest(25.0));
        // raw member output is clamped before calibration
        let score = pipeline.predict("Over-enthusiastic model output.", 8);
        assert!(close(score, 10.0), "got {score}");
    }

    #[test]
    fn test_train_validates_input_shape() {
        let pipeline = ScoringPipeline::new(&offline_config());
        let essays = vec!["An essay long enough to use.".to_string()];
        let err = pipeline.train(&essays, &[1.0, 2.0], Some(&[1])).unwrap_err();
        assert!(matches!(err, ScoreError::Training(_)));
        let err = pipeline.train(&essays, &[1.0], Some(&[1, 2])).unwrap_err();
        assert!(matches!(err, ScoreError::Training(_)));
        let err = pipeline.train(&[], &[], None).unwrap_err();
        assert!(matches!(err, ScoreError::Training(_)));
    }

    #[test]
    fn test_train_then_predict() {
        let mut config = offline_config();
        config.models.forest = ForestParams {
            n_trees: 10,
            max_depth: 4,
            min_samples_split: 2,
            seed: 42,
        };
        let pipeline = ScoringPipeline::new(&config);

        let essays: Vec<String> = (0..12)
            .map(|i| {
                let mut essay = String::from("Computers help students learn. ");
                for _ in 0..i {
                    essay.push_str("They also provide great information for school projects. ");
                }
                essay
            })
            .collect();
        let scores: Vec<f64> = (0..12).map(|i| 2.0 + (i as f64) * 0.8).collect();
        let sets = vec![1u8; 12];

        let used = pipeline.train(&essays, &scores, Some(&sets)).unwrap();
        assert_eq!(used, 12);
        assert!(pipeline.has_forest());

        let score = pipeline.predict(&essays[6], 1);
        assert!((0.0..=10.0).contains(&score));
    }

    #[test]
    fn test_train_without_sets_defaults_to_set_one() {
        let mut config = offline_config();
        config.models.forest.n_trees = 5;
        config.models.forest.max_depth = 3;
        let with_sets = ScoringPipeline::new(&config);
        let without_sets = ScoringPipeline::new(&config);

        let essays: Vec<String> = (0..8)
            .map(|i| format!("Essay {i} about learning habits and school routines."))
            .collect();
        let scores: Vec<f64> = (0..8).map(|i| 2.0 + i as f64).collect();

        with_sets.train(&essays, &scores, Some(&vec![1u8; 8])).unwrap();
        without_sets.train(&essays, &scores, None).unwrap();

        let essay = "Essay about learning habits and school routines.";
        assert!(close(with_sets.predict(essay, 1), without_sets.predict(essay, 1)));
    }

    #[test]
    fn test_train_caps_at_limit() {
        let mut config = offline_config();
        config.models.train_limit = 5;
        config.models.forest.n_trees = 5;
        config.models.forest.max_depth = 3;
        let pipeline = ScoringPipeline::new(&config);

        let essays: Vec<String> = (0..20)
            .map(|i| format!("Essay number {i} talks about school and learning outcomes."))
            .collect();
        let scores = vec![5.0; 20];
        let sets = vec![1u8; 20];
        let used = pipeline.train(&essays, &scores, Some(&sets)).unwrap();
        assert_eq!(used, 5);
    }

    #[test]
    fn test_load_models_replaces_forest_and_keeps_the_rest() {
        let dir = TempDir::new().unwrap();
        persist::save_models(dir.path(), Some(&constant_forest(2.0)), None).unwrap();

        let mut pipeline = ScoringPipeline::new(&offline_config())
            .with_forest(constant_forest(6.0))
            .with_sequence(constant_sequence(8.0, 3))
            .with_embeddings(EmbeddingTable::parse("good 1.0 2.0 3.0\n"));
        pipeline.load_models(dir.path());
        assert!(pipeline.has_forest());
        assert!(pipeline.has_sequence());

        // 0.4*2 + 0.6*8 = 5.6 in the neutral band: the forest came from
        // disk while the sequence member and embeddings stayed loaded
        let score = pipeline.predict("A good essay about anything at all.", 3);
        assert!(close(score, 5.6), "got {score}");
    }

    /// Small corpus in the reference layout, all set 1, scores inside the
    /// native 2..=12 range.
    fn write_corpus(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("training.tsv");
        let mut lines = vec!["essay_id\tessay_set\tessay\tdomain1_score".to_string()];
        for i in 0..12u32 {
            let mut essay = format!("Essay {i} discusses computers and school life.");
            for _ in 0..(i % 4) {
                essay.push_str(" Students learn when practice works.");
            }
            lines.push(format!("{i}\t1\t\"{essay}\"\t{}", 2 + (i % 11)));
        }
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_concurrent_first_predictions_fit_once() {
        let dir = TempDir::new().unwrap();
        let mut config = offline_config();
        config.models.corpus_file = Some(write_corpus(&dir));
        config.models.forest.n_trees = 5;
        config.models.forest.max_depth = 3;

        let pipeline = ScoringPipeline::new(&config);
        let essay = "Computers help students learn new things every day.";
        let scores: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| pipeline.predict(essay, 1)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(pipeline.has_forest());
        // the whole burst raced an empty slot; exactly one caller trained
        assert_eq!(pipeline.fit_count.load(Ordering::SeqCst), 1);
        for score in &scores[1..] {
            assert!(close(scores[0], *score), "scores diverged: {scores:?}");
        }
    }
}
