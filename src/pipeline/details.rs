//! Typed payloads carried in each stage's result

use crate::catalog::TestConfig;
use crate::interpret::CoverageSummary;
use crate::process::CommandOutput;
use crate::toolchain::{BuildStrategy, ToolchainProbe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverDetails {
    pub repo_path: String,
    /// Whether this run cloned the repository
    pub checkout_created: bool,
    pub toolchain: ToolchainProbe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderInputs {
    pub requires_network: bool,
    pub lockfile_sources: Vec<String>,
}

/// How to build and test a repository, derived from its probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub strategy: BuildStrategy,
    pub python_version: String,
    pub builder_inputs: BuilderInputs,
    pub tests: TestConfig,
}

/// One external command and what it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: Vec<String>,
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandRecord {
    pub fn new(command: Vec<String>, output: CommandOutput) -> Self {
        Self {
            command,
            returncode: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Build stage payload.
///
/// `commands` holds every install command attempted, up to and including
/// the first one that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildDetails {
    pub strategy: BuildStrategy,
    pub lockfiles: Vec<String>,
    pub requires_network: bool,
    pub commands: Vec<CommandRecord>,
    pub exit_code: i32,
    pub duration_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_manifest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDetails {
    pub runner: String,
    pub discovered: u64,
    pub selected: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub xfailed: u64,
    /// Absent when collection failed and nothing was executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<String>,
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDetails {
    pub manifest_path: String,
    pub artifact_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDetails {
    pub manifest_path: String,
    pub image_tag: String,
    pub pushed: bool,
}
