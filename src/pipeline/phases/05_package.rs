use crate::manifest::{assemble, MANIFEST_FILE};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::details::PackageDetails;
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::StageHandler;
use crate::pipeline::stage::{Stage, StageDetails, StageResult};
use crate::pipeline::store::write_json;
use async_trait::async_trait;
use tracing::info;

/// Folds Build and Test results into the image manifest
pub struct PackageHandler;

#[async_trait]
impl StageHandler for PackageHandler {
    fn stage(&self) -> Stage {
        Stage::Package
    }

    async fn execute(&self, context: &PipelineContext) -> Result<StageResult, PipelineError> {
        let build = context.store.require(Stage::Build, Stage::Package)?;
        let test = context.store.require(Stage::Test, Stage::Package)?;
        let invalid = |stage: Stage| PipelineError::InvalidCache {
            path: context.store.path(stage),
            message: format!("no {} details", stage),
        };
        let build = build.build().ok_or_else(|| invalid(Stage::Build))?;
        let test = test.test().ok_or_else(|| invalid(Stage::Test))?;

        let manifest = assemble(&context.repo, build, test, &context.config.image_registry);
        let manifest_path = context.layout.artifact_path(MANIFEST_FILE);
        write_json(&manifest_path, &manifest)?;
        info!(
            "Wrote manifest for {} with {} artifacts",
            context.repo.id,
            manifest.artifacts.len()
        );

        Ok(StageResult::completed(StageDetails::Package(PackageDetails {
            manifest_path: manifest_path.display().to_string(),
            artifact_count: manifest.artifacts.len(),
        })))
    }
}
