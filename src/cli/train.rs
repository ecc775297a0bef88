// src/cli/train.rs — Train command: fit the tree model and save artifacts

use std::path::PathBuf;

use crate::infra::config::Config;
use crate::infra::paths;
use crate::scoring::ScoringPipeline;

pub async fn run_train(
    config: &Config,
    corpus: Option<String>,
    limit: Option<usize>,
    output: Option<String>,
) -> anyhow::Result<()> {
    paths::ensure_dirs().await?;

    let mut config = config.clone();
    if let Some(limit) = limit {
        config.models.train_limit = limit;
    }
    config.validate()?;

    let corpus_path = corpus
        .map(PathBuf::from)
        .unwrap_or_else(|| config.corpus_file());
    let output_dir = output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.artifact_dir());

    // load existing artifacts first so a sequence model rides along into
    // the save instead of being dropped from the manifest
    let pipeline = ScoringPipeline::from_config(&config);
    let used = pipeline.train_from_corpus(&corpus_path)?;
    pipeline.save_models(&output_dir)?;

    println!("Trained on {used} essays from {}", corpus_path.display());
    println!("Artifacts written to {}", output_dir.display());
    Ok(())
}
