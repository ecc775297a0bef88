// src/model/persist.rs — Model artifact storage with checksummed manifest

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::infra::errors::ScoreError;
use crate::model::forest::ForestRegressor;
use crate::model::sequence::SequenceModel;
use crate::model::Regressor;

pub const FOREST_FILE: &str = "forest.json";
pub const SEQUENCE_FILE: &str = "sequence.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub name: String,
    pub file: String,
    pub sha256: String,
}

/// Written next to the artifacts on every save. Loads verify file digests
/// against it; a missing or unreadable manifest skips verification rather
/// than blocking the load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub created_at: DateTime<Utc>,
    pub artifacts: Vec<ArtifactEntry>,
}

impl Manifest {
    pub fn entry(&self, file: &str) -> Option<&ArtifactEntry> {
        self.artifacts.iter().find(|a| a.file == file)
    }
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}

pub fn load_manifest(dir: &Path) -> Option<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!("Ignoring unreadable manifest at {}: {e}", path.display());
            None
        }
    }
}

fn read_verified(
    dir: &Path,
    file: &str,
    manifest: Option<&Manifest>,
) -> Result<Option<Vec<u8>>, ScoreError> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(&path)?;
    if let Some(entry) = manifest.and_then(|m| m.entry(file)) {
        if checksum(&bytes) != entry.sha256 {
            return Err(ScoreError::ChecksumMismatch {
                name: entry.name.clone(),
            });
        }
    }
    Ok(Some(bytes))
}

fn write_artifact<T: Serialize>(
    dir: &Path,
    name: &str,
    file: &str,
    model: &T,
) -> Result<ArtifactEntry, ScoreError> {
    let bytes = serde_json::to_vec_pretty(model).map_err(|e| ScoreError::Artifact {
        name: name.into(),
        message: e.to_string(),
    })?;
    std::fs::write(dir.join(file), &bytes)?;
    Ok(ArtifactEntry {
        name: name.into(),
        file: file.into(),
        sha256: checksum(&bytes),
    })
}

/// Serialize the given models into `dir` and write a fresh manifest.
/// Absent models are skipped; with neither present the save is a no-op
/// that touches nothing on disk and returns an empty manifest.
pub fn save_models(
    dir: &Path,
    forest: Option<&ForestRegressor>,
    sequence: Option<&SequenceModel>,
) -> Result<Manifest, ScoreError> {
    if forest.is_none() && sequence.is_none() {
        warn!("No trained models to save; leaving {} untouched", dir.display());
        return Ok(Manifest {
            created_at: Utc::now(),
            artifacts: Vec::new(),
        });
    }

    std::fs::create_dir_all(dir)?;
    let mut artifacts = Vec::new();
    if let Some(model) = forest {
        artifacts.push(write_artifact(dir, model.name(), FOREST_FILE, model)?);
    }
    if let Some(model) = sequence {
        artifacts.push(write_artifact(dir, model.name(), SEQUENCE_FILE, model)?);
    }

    let manifest = Manifest {
        created_at: Utc::now(),
        artifacts,
    };
    let json = serde_json::to_vec_pretty(&manifest).map_err(|e| ScoreError::Artifact {
        name: "manifest".into(),
        message: e.to_string(),
    })?;
    std::fs::write(dir.join(MANIFEST_FILE), json)?;
    info!(
        "Saved {} model artifact(s) to {}",
        manifest.artifacts.len(),
        dir.display()
    );
    Ok(manifest)
}

pub fn load_forest(dir: &Path) -> Result<Option<ForestRegressor>, ScoreError> {
    let manifest = load_manifest(dir);
    let Some(bytes) = read_verified(dir, FOREST_FILE, manifest.as_ref())? else {
        return Ok(None);
    };
    let model: ForestRegressor = serde_json::from_slice(&bytes).map_err(|e| ScoreError::Artifact {
        name: "forest".into(),
        message: e.to_string(),
    })?;
    model.validate()?;
    Ok(Some(model))
}

pub fn load_sequence(dir: &Path) -> Result<Option<SequenceModel>, ScoreError> {
    let manifest = load_manifest(dir);
    let Some(bytes) = read_verified(dir, SEQUENCE_FILE, manifest.as_ref())? else {
        return Ok(None);
    };
    let model: SequenceModel = serde_json::from_slice(&bytes).map_err(|e| ScoreError::Artifact {
        name: "sequence".into(),
        message: e.to_string(),
    })?;
    model.validate()?;
    Ok(Some(model))
}
