use crate::manifest::{ImageManifest, MANIFEST_FILE};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::details::PublishDetails;
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::StageHandler;
use crate::pipeline::stage::{Stage, StageDetails, StageResult, StageStatus};
use crate::pipeline::store::read_json;
use async_trait::async_trait;
use tracing::info;

/// Reports the image that would be pushed. Never touches the network.
pub struct PublishHandler;

#[async_trait]
impl StageHandler for PublishHandler {
    fn stage(&self) -> Stage {
        Stage::Publish
    }

    async fn execute(&self, context: &PipelineContext) -> Result<StageResult, PipelineError> {
        let manifest_path = context.layout.artifact_path(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(PipelineError::MissingManifest(manifest_path));
        }

        let manifest: ImageManifest = read_json(&manifest_path)?;
        info!("Prepared {} for publishing", manifest.image.name);

        Ok(StageResult::new(
            StageStatus::Pending,
            StageDetails::Publish(PublishDetails {
                manifest_path: manifest_path.display().to_string(),
                image_tag: manifest.image.name,
                pushed: false,
            }),
        ))
    }
}
