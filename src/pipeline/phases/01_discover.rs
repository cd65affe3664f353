use crate::pipeline::context::PipelineContext;
use crate::pipeline::details::DiscoverDetails;
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::StageHandler;
use crate::pipeline::stage::{Stage, StageDetails, StageResult};
use crate::toolchain::probe_toolchain;
use crate::vcs::GitClient;
use async_trait::async_trait;
use tracing::info;

/// Makes sure a checkout exists and probes it
pub struct DiscoverHandler;

#[async_trait]
impl StageHandler for DiscoverHandler {
    fn stage(&self) -> Stage {
        Stage::Discover
    }

    async fn execute(&self, context: &PipelineContext) -> Result<StageResult, PipelineError> {
        let repo_dir = context.checkout_dir();
        let git = GitClient::new(context.runner.as_ref());

        let checkout_created = git
            .ensure_checkout(&context.repo.url, &context.repo.commit, &repo_dir)
            .await
            .map_err(PipelineError::Vcs)?;

        let toolchain = probe_toolchain(context.file_system.as_ref(), &repo_dir);
        info!(
            "Discovered {} ({} CI workflows)",
            context.repo.id,
            toolchain.ci_workflows.len()
        );

        Ok(StageResult::completed(StageDetails::Discover(DiscoverDetails {
            repo_path: repo_dir.display().to_string(),
            checkout_created,
            toolchain,
        })))
    }
}
