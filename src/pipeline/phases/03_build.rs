use crate::pipeline::context::PipelineContext;
use crate::pipeline::details::{BuildDetails, BuildPlan, CommandRecord};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::StageHandler;
use crate::pipeline::stage::{Stage, StageDetails, StageResult};
use crate::pipeline::store::write_json;
use crate::interpret::parse_freeze;
use crate::process::CommandSpec;
use crate::toolchain::build_install_commands;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const ENV_MANIFEST_FILE: &str = "env_manifest.json";

/// Installed environment as recorded after a successful build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvManifest {
    pub python_version: String,
    pub pip_freeze: Vec<String>,
    pub apt_packages: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub generated_at: String,
}

/// SHA-256 over the plan's compact, key-sorted JSON
pub fn plan_hash(plan: &BuildPlan) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(&serde_json::to_value(plan)?)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Installs the checkout's dependencies, stopping at the first failure
pub struct BuildHandler;

impl BuildHandler {
    async fn pip_freeze(&self, context: &PipelineContext) -> Vec<String> {
        let spec = CommandSpec::new(["python", "-m", "pip", "freeze"])
            .current_dir(context.checkout_dir());
        match context.runner.run(&spec).await {
            Ok(output) if output.is_success() => parse_freeze(&output.stdout),
            Ok(output) => {
                warn!("pip freeze exited with {}", output.exit_code);
                Vec::new()
            }
            Err(e) => {
                warn!("pip freeze unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl StageHandler for BuildHandler {
    fn stage(&self) -> Stage {
        Stage::Build
    }

    async fn execute(&self, context: &PipelineContext) -> Result<StageResult, PipelineError> {
        let cached = context.store.require(Stage::Plan, Stage::Build)?;
        let plan = cached.plan().cloned().ok_or_else(|| PipelineError::InvalidCache {
            path: context.store.path(Stage::Plan),
            message: "no build plan".to_string(),
        })?;

        let repo_dir = context.checkout_dir();
        let started = Instant::now();
        let mut details = BuildDetails {
            strategy: plan.strategy,
            lockfiles: plan.builder_inputs.lockfile_sources.clone(),
            requires_network: plan.builder_inputs.requires_network,
            commands: Vec::new(),
            exit_code: 0,
            duration_s: 0.0,
            base_image: None,
            plan_hash: None,
            env_manifest: None,
            message: None,
        };

        for argv in build_install_commands(context.file_system.as_ref(), &repo_dir) {
            let spec = CommandSpec::new(argv.clone()).current_dir(&repo_dir);
            debug!("Running {}", spec.display());
            let output = context.runner.run(&spec).await?;
            let exit_code = output.exit_code;
            details.commands.push(CommandRecord::new(argv, output));

            if exit_code != 0 {
                warn!("{} exited with {}", spec.display(), exit_code);
                details.exit_code = exit_code;
                details.duration_s = round_millis(started.elapsed().as_secs_f64());
                details.message = Some(format!("install command failed: {}", spec.display()));
                return Ok(StageResult::failed(StageDetails::Build(details)));
            }
        }

        let env_manifest = EnvManifest {
            python_version: plan.python_version.clone(),
            pip_freeze: self.pip_freeze(context).await,
            apt_packages: Vec::new(),
            env: BTreeMap::from([("PYTHONHASHSEED".to_string(), "0".to_string())]),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        let env_path = context.layout.artifact_path(ENV_MANIFEST_FILE);
        write_json(&env_path, &env_manifest)?;

        let hash = plan_hash(&plan).map_err(|source| PipelineError::Serialization {
            path: context.store.path(Stage::Plan),
            source,
        })?;

        details.base_image = Some(context.config.base_image.clone());
        details.plan_hash = Some(hash);
        details.env_manifest = Some(env_path.display().to_string());
        details.duration_s = round_millis(started.elapsed().as_secs_f64());
        info!(
            "Installed {} with {} commands",
            context.repo.id,
            details.commands.len()
        );

        Ok(StageResult::completed(StageDetails::Build(details)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TestConfig;
    use crate::pipeline::details::BuilderInputs;
    use crate::pipeline::phases::test_support::{context, demo_repo, write_checkout_file};
    use crate::pipeline::stage::StageStatus;
    use crate::pipeline::store::read_json;
    use crate::process::CommandOutput;
    use crate::toolchain::BuildStrategy;
    use tempfile::TempDir;

    fn plan() -> BuildPlan {
        BuildPlan {
            strategy: BuildStrategy::Pip,
            python_version: "3.11".to_string(),
            builder_inputs: BuilderInputs {
                requires_network: false,
                lockfile_sources: vec!["requirements.txt".to_string()],
            },
            tests: TestConfig::default(),
        }
    }

    #[test]
    fn test_plan_hash_is_stable() {
        let first = plan_hash(&plan()).unwrap();
        assert_eq!(first, plan_hash(&plan()).unwrap());
        assert_eq!(first.len(), 64);

        let mut other = plan();
        other.python_version = "3.12".to_string();
        assert_ne!(first, plan_hash(&other).unwrap());
    }

    #[tokio::test]
    async fn test_requires_plan() {
        let temp = TempDir::new().unwrap();
        let (context, _) = context(&temp, demo_repo());

        let err = BuildHandler.execute(&context).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingPrerequisite {
                required: Stage::Plan,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_successful_build_writes_env_manifest() {
        let temp = TempDir::new().unwrap();
        let (context, runner) = context(&temp, demo_repo());
        write_checkout_file(&context, "requirements.txt", "attrs\n");
        context
            .store
            .save(&StageResult::completed(StageDetails::Plan(plan())))
            .unwrap();
        runner.on(
            ["python", "-m", "pip", "freeze"],
            CommandOutput::success("attrs==23.1.0\npytest==8.0.0\n"),
        );

        let result = BuildHandler.execute(&context).await.unwrap();

        assert_eq!(result.status, StageStatus::Completed);
        let details = result.build().unwrap();
        assert_eq!(details.commands.len(), 2);
        assert_eq!(details.exit_code, 0);
        assert_eq!(details.base_image.as_deref(), Some("python:3.11-slim"));
        assert_eq!(details.plan_hash, Some(plan_hash(&plan()).unwrap()));

        let manifest: EnvManifest =
            read_json(&context.layout.artifact_path(ENV_MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.pip_freeze, vec!["attrs==23.1.0", "pytest==8.0.0"]);
        assert_eq!(manifest.env.get("PYTHONHASHSEED").map(String::as_str), Some("0"));
    }

    #[tokio::test]
    async fn test_second_command_failure_stops_build() {
        let temp = TempDir::new().unwrap();
        let (context, runner) = context(&temp, demo_repo());
        write_checkout_file(&context, "requirements.txt", "attrs\n");
        write_checkout_file(&context, "requirements-dev.txt", "black\n");
        context
            .store
            .save(&StageResult::completed(StageDetails::Plan(plan())))
            .unwrap();
        runner.on(
            ["python", "-m", "pip", "install", "-r", "requirements-dev.txt"],
            CommandOutput::failure(1, "ERROR: No matching distribution found for black"),
        );

        let result = BuildHandler.execute(&context).await.unwrap();

        assert_eq!(result.status, StageStatus::Failed);
        let details = result.build().unwrap();
        assert_eq!(details.commands.len(), 2);
        assert_eq!(details.commands[1].returncode, 1);
        assert_eq!(details.exit_code, 1);
        assert!(details.plan_hash.is_none());
        assert!(details.message.as_deref().unwrap().contains("requirements-dev.txt"));
        assert_eq!(runner.call_count(), 2);
        assert!(!context.layout.artifact_path(ENV_MANIFEST_FILE).exists());
    }
}
