// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the ESSAYMARK_HOME environment variable for isolation.
// When ESSAYMARK_HOME is set, all config and data live under that directory.
// When unset, config uses ~/.essaymark/ and data uses XDG_DATA_HOME/essaymark.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static PROJECT_DIRS: OnceLock<ProjectDirs> = OnceLock::new();

fn project_dirs() -> &'static ProjectDirs {
    PROJECT_DIRS.get_or_init(|| {
        ProjectDirs::from("", "", "essaymark").expect("Could not determine home directory")
    })
}

/// Returns the ESSAYMARK_HOME override, if set.
fn essaymark_home() -> Option<PathBuf> {
    std::env::var_os("ESSAYMARK_HOME").map(PathBuf::from)
}

/// Configuration directory: $ESSAYMARK_HOME/ or ~/.essaymark/
pub fn config_dir() -> PathBuf {
    if let Some(home) = essaymark_home() {
        return home;
    }
    dirs_home().join(".essaymark")
}

/// Data directory: $ESSAYMARK_HOME/data/ or ~/.local/share/essaymark/ (or XDG_DATA_HOME/essaymark)
pub fn data_dir() -> PathBuf {
    if let Some(home) = essaymark_home() {
        return home.join("data");
    }
    project_dirs().data_local_dir().to_path_buf()
}

/// Home directory
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Trained model artifacts (forest.json, sequence.json, manifest.json)
pub fn model_dir() -> PathBuf {
    data_dir().join("models")
}

/// Word-vector table (word2vec/GloVe text format)
pub fn embeddings_path() -> PathBuf {
    model_dir().join("embeddings.vec")
}

/// Training corpora
pub fn corpus_dir() -> PathBuf {
    data_dir().join("corpus")
}

/// Default training corpus (ASAP-style tab-separated file)
pub fn default_corpus_path() -> PathBuf {
    corpus_dir().join("training_set_rel3.tsv")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    let dirs = [config_dir(), data_dir(), model_dir(), corpus_dir()];

    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await?;
    }

    Ok(())
}
