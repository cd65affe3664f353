//! Git checkout management
//!
//! Discovery has no degraded mode, so every git failure here is fatal.

use crate::process::{CommandRunner, CommandSpec, ProcessError};
use std::path::Path;
use tracing::info;

pub struct GitClient<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> GitClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    pub fn is_checkout(destination: &Path) -> bool {
        destination.join(".git").exists()
    }

    /// Clone `url` into `destination` unless a checkout is already there
    pub async fn clone(&self, url: &str, destination: &Path) -> Result<bool, ProcessError> {
        if Self::is_checkout(destination) {
            return Ok(false);
        }
        info!("Cloning {} into {}", url, destination.display());
        let dest = destination.to_string_lossy().into_owned();
        let spec = CommandSpec::new(["git", "clone", url, dest.as_str()]);
        self.runner.run(&spec).await?.check(&spec)?;
        Ok(true)
    }

    pub async fn checkout(&self, revision: &str, cwd: &Path) -> Result<(), ProcessError> {
        info!("Checking out {} in {}", revision, cwd.display());
        let spec = CommandSpec::new(["git", "checkout", revision]).current_dir(cwd);
        self.runner.run(&spec).await?.check(&spec)?;
        Ok(())
    }

    /// Make sure `destination` holds a checkout pinned to `revision`.
    ///
    /// An existing checkout is left alone even when it sits on a different
    /// revision. Returns whether a new clone was made.
    pub async fn ensure_checkout(
        &self,
        url: &str,
        revision: &str,
        destination: &Path,
    ) -> Result<bool, ProcessError> {
        let created = self.clone(url, destination).await?;
        if created && !revision.is_empty() {
            self.checkout(revision, destination).await?;
        }
        Ok(created)
    }
}
