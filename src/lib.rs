//! repokiln - staged pipeline that turns source repositories into tested images
//!
//! Each catalog repository moves through six stages in a fixed order:
//! discover, plan, build, test, package and publish. Every stage writes one
//! JSON result into the workspace, and a stage whose result already exists
//! is never executed again.
//!
//! # Core Concepts
//!
//! - **Catalog**: repository descriptors (URL, pinned commit, test settings)
//! - **Workspace**: per-repository checkout, state, artifact and log directories
//! - **Stages**: handlers behind [`pipeline::StageHandler`], sequenced by
//!   [`pipeline::PipelineOrchestrator`]
//! - **Runners**: every external tool goes through [`process::CommandRunner`],
//!   so a [`process::MockCommandRunner`] can stand in for git, pip and pytest
//!
//! # Example Usage
//!
//! ```no_run
//! use repokiln::catalog::RepoCatalog;
//! use repokiln::fs::RealFileSystem;
//! use repokiln::pipeline::{HandlerTable, PipelineContext, PipelineOrchestrator, Stage};
//! use repokiln::process::SystemCommandRunner;
//! use repokiln::RepokilnConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RepokilnConfig::default();
//! let catalog = RepoCatalog::from_file(&config.catalog_path)?;
//! let repo = catalog.get("attrs")?.clone();
//!
//! let context = PipelineContext::new(
//!     Arc::new(repo),
//!     &config.workspace_root,
//!     Arc::new(RealFileSystem::new()),
//!     Arc::new(SystemCommandRunner::new()),
//!     config.pipeline_config(),
//! );
//! let orchestrator = PipelineOrchestrator::new(context, HandlerTable::standard())?;
//! let result = orchestrator.run_until(Stage::Test).await?;
//! println!("{}", result.status);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod fs;
pub mod interpret;
pub mod manifest;
pub mod pipeline;
pub mod process;
pub mod toolchain;
pub mod util;
pub mod vcs;
pub mod workspace;

pub use catalog::{CatalogError, RepoCatalog, RepositoryDescriptor, TestConfig};
pub use config::{ConfigError, RepokilnConfig};
pub use pipeline::{
    HandlerTable, PipelineError, PipelineOrchestrator, Stage, StageResult, StageStatus,
};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
