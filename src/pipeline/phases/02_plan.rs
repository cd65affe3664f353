use crate::pipeline::context::PipelineContext;
use crate::pipeline::details::{BuildPlan, BuilderInputs};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::StageHandler;
use crate::pipeline::stage::{Stage, StageDetails, StageResult};
use crate::toolchain::{select_strategy, ToolchainProbe, PYPROJECT};
use async_trait::async_trait;
use tracing::info;

/// Turns the Discover probe into a [`BuildPlan`]
pub struct PlanHandler;

fn lockfile_sources(probe: &ToolchainProbe) -> Vec<String> {
    [
        (probe.pyproject, PYPROJECT),
        (probe.requirements, "requirements.txt"),
        (probe.environment_yml, "environment.yml"),
    ]
    .into_iter()
    .filter(|(present, _)| *present)
    .map(|(_, name)| name.to_string())
    .collect()
}

#[async_trait]
impl StageHandler for PlanHandler {
    fn stage(&self) -> Stage {
        Stage::Plan
    }

    async fn execute(&self, context: &PipelineContext) -> Result<StageResult, PipelineError> {
        let discover = context.store.require(Stage::Discover, Stage::Plan)?;
        let probe = discover
            .discover()
            .map(|d| d.toolchain.clone())
            .unwrap_or_default();

        let strategy = select_strategy(&probe);
        info!("Selected {} strategy for {}", strategy, context.repo.id);

        let plan = BuildPlan {
            strategy,
            python_version: context.config.python_version.clone(),
            builder_inputs: BuilderInputs {
                requires_network: !probe.ci_workflows.is_empty(),
                lockfile_sources: lockfile_sources(&probe),
            },
            tests: context.repo.tests.clone(),
        };

        Ok(StageResult::completed(StageDetails::Plan(plan)))
    }
}
