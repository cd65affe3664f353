//! On-disk regions used by one repository's pipeline run

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Maps a repository id onto its checkout, state, artifact and log
/// directories under a shared workspace root.
///
/// ```text
/// <root>/repos/<id>        checkout
/// <root>/state/<id>        one cache file per stage
/// <root>/artifacts/<id>    manifests, reports, indexes
/// <root>/logs/<id>         raw tool logs
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
    repo_id: String,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            repo_id: repo_id.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    pub fn checkout_dir(&self) -> PathBuf {
        self.root.join("repos").join(&self.repo_id)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state").join(&self.repo_id)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join("artifacts").join(&self.repo_id)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs").join(&self.repo_id)
    }

    pub fn artifact_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.artifacts_dir().join(relative)
    }

    pub fn log_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.logs_dir().join(relative)
    }

    /// Create all four regions. Safe to call repeatedly.
    pub fn ensure(&self) -> io::Result<()> {
        for dir in [
            self.checkout_dir(),
            self.state_dir(),
            self.artifacts_dir(),
            self.logs_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_are_keyed_by_repo() {
        let layout = WorkspaceLayout::new("/ws", "attrs");

        assert_eq!(layout.checkout_dir(), PathBuf::from("/ws/repos/attrs"));
        assert_eq!(layout.state_dir(), PathBuf::from("/ws/state/attrs"));
        assert_eq!(layout.artifacts_dir(), PathBuf::from("/ws/artifacts/attrs"));
        assert_eq!(layout.logs_dir(), PathBuf::from("/ws/logs/attrs"));
        assert_eq!(
            layout.artifact_path("coverage.xml"),
            PathBuf::from("/ws/artifacts/attrs/coverage.xml")
        );
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(temp.path(), "demo");

        layout.ensure().unwrap();
        fs::write(layout.state_dir().join("discover.json"), "{}").unwrap();
        layout.ensure().unwrap();

        assert!(layout.checkout_dir().is_dir());
        assert!(layout.artifacts_dir().is_dir());
        assert!(layout.logs_dir().is_dir());
        assert!(layout.state_dir().join("discover.json").exists());
    }
}
