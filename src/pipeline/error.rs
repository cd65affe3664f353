use super::stage::Stage;
use crate::process::ProcessError;
use std::path::PathBuf;
use thiserror::Error;

/// Unrecoverable pipeline failures.
///
/// Recoverable tool failures never surface here; they are recorded as a
/// `failed` stage result instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage requires the {required} stage to have run first")]
    MissingPrerequisite { stage: Stage, required: Stage },

    #[error("Package stage must produce a manifest before publish: {0:?} not found")]
    MissingManifest(PathBuf),

    #[error("No handler registered for the {0} stage")]
    NoHandler(Stage),

    #[error("Checkout failed: {0}")]
    Vcs(#[source] ProcessError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize {path:?}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid stage cache {path:?}: {message}")]
    InvalidCache { path: PathBuf, message: String },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
