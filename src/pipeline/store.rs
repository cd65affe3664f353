//! Durable JSON records: stage caches and artifacts
//!
//! Everything is written with sorted keys, two-space indentation and a
//! trailing newline, so identical data always produces identical bytes.

use super::error::PipelineError;
use super::stage::{Stage, StageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Render `value` with object keys sorted
pub fn to_sorted_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    // serde_json::Map is a BTreeMap without the preserve_order feature
    let value = serde_json::to_value(value)?;
    serde_json::to_string_pretty(&value)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let rendered = to_sorted_json(value).map_err(|source| PipelineError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    fs::write(path, rendered + "\n").map_err(|e| PipelineError::io(path, e))?;
    trace!("Wrote {}", path.display());
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let raw = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|source| PipelineError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-repository stage cache: `<state_dir>/<stage>.json`.
///
/// A file's presence is the whole cache contract; there is no staleness
/// check against the checkout.
#[derive(Debug, Clone)]
pub struct StageStore {
    state_dir: PathBuf,
}

impl StageStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    pub fn path(&self, stage: Stage) -> PathBuf {
        self.state_dir.join(stage.cache_file_name())
    }

    pub fn exists(&self, stage: Stage) -> bool {
        self.path(stage).is_file()
    }

    pub fn load(&self, stage: Stage) -> Result<Option<StageResult>, PipelineError> {
        let path = self.path(stage);
        if !path.is_file() {
            return Ok(None);
        }

        let result: StageResult = read_json(&path)?;
        if result.stage() != stage {
            return Err(PipelineError::InvalidCache {
                path,
                message: format!("holds a {} result", result.stage()),
            });
        }
        Ok(Some(result))
    }

    /// Load the cached result of `required`, failing as a precondition of `stage`
    pub fn require(&self, required: Stage, stage: Stage) -> Result<StageResult, PipelineError> {
        self.load(required)?
            .ok_or(PipelineError::MissingPrerequisite { stage, required })
    }

    pub fn save(&self, result: &StageResult) -> Result<PathBuf, PipelineError> {
        let path = self.path(result.stage());
        write_json(&path, result)?;
        Ok(path)
    }
}
