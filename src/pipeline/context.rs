//! Pipeline context for managing dependencies

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::RepositoryDescriptor;
use crate::fs::FileSystem;
use crate::process::CommandRunner;
use crate::workspace::WorkspaceLayout;

use super::config::PipelineConfig;
use super::store::StageStore;

/// Everything a stage handler may touch for one repository
pub struct PipelineContext {
    pub repo: Arc<RepositoryDescriptor>,

    pub layout: WorkspaceLayout,

    pub store: StageStore,

    /// Read-only view used to probe the checkout
    pub file_system: Arc<dyn FileSystem>,

    pub runner: Arc<dyn CommandRunner>,

    pub config: PipelineConfig,
}

impl PipelineContext {
    pub fn new(
        repo: Arc<RepositoryDescriptor>,
        workspace_root: impl Into<PathBuf>,
        file_system: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        config: PipelineConfig,
    ) -> Self {
        let layout = WorkspaceLayout::new(workspace_root, repo.id.clone());
        let store = StageStore::new(layout.state_dir());
        Self {
            repo,
            layout,
            store,
            file_system,
            runner,
            config,
        }
    }

    pub fn checkout_dir(&self) -> PathBuf {
        self.layout.checkout_dir()
    }
}
