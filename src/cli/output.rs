//! Output formatting for multiple formats
//!
//! Stage results, status maps, catalog listings and configuration can be
//! rendered as JSON, YAML or human-readable text. JSON stage results use the
//! same sorted-key layout as the cache files.

use anyhow::{Context, Result};

use crate::catalog::RepoCatalog;
use crate::config::RepokilnConfig;
use crate::pipeline::{to_sorted_json, PipelineStatus, StageDetails, StageResult};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_result(&self, result: &StageResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                to_sorted_json(result).context("Failed to serialize stage result to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(result).context("Failed to serialize stage result to YAML")
            }
            OutputFormat::Human => Ok(self.format_result_human(result)),
        }
    }

    /// Stage statuses, in stage order
    pub fn format_status(&self, status: &PipelineStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(status).context("Failed to serialize status to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(status).context("Failed to serialize status to YAML")
            }
            OutputFormat::Human => {
                if status.is_empty() {
                    return Ok("No stages have run".to_string());
                }
                let lines: Vec<String> = status
                    .0
                    .iter()
                    .map(|(stage, st)| format!("{:<10} {}", stage.name(), st))
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    pub fn format_catalog(&self, catalog: &RepoCatalog) -> Result<String> {
        let repos: Vec<_> = catalog.iter().collect();
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&repos).context("Failed to serialize catalog to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(&repos).context("Failed to serialize catalog to YAML")
            }
            OutputFormat::Human => {
                let mut output = format!("{} repositories in {}\n", repos.len(), catalog.path().display());
                for repo in repos {
                    output.push_str(&format!("  {:<24} {}@{}\n", repo.id, repo.url, repo.commit));
                }
                Ok(output.trim_end().to_string())
            }
        }
    }

    pub fn format_config(&self, config: &RepokilnConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&config.to_display_map())
                .context("Failed to serialize config to YAML"),
            OutputFormat::Human => Ok(config.to_string().trim_end().to_string()),
        }
    }

    fn format_result_human(&self, result: &StageResult) -> String {
        let mut output = format!("{}: {}\n", result.stage(), result.status);

        match &result.details {
            StageDetails::Discover(d) => {
                output.push_str(&format!("  Checkout:     {}\n", d.repo_path));
                output.push_str(&format!("  Cloned now:   {}\n", d.checkout_created));
                output.push_str(&format!("  Pyproject:    {}\n", d.toolchain.pyproject));
                output.push_str(&format!("  CI workflows: {}\n", d.toolchain.ci_workflows.len()));
            }
            StageDetails::Plan(p) => {
                output.push_str(&format!("  Strategy:     {}\n", p.strategy));
                output.push_str(&format!("  Python:       {}\n", p.python_version));
                output.push_str(&format!(
                    "  Lockfiles:    {}\n",
                    p.builder_inputs.lockfile_sources.join(", ")
                ));
                output.push_str(&format!(
                    "  Network:      {}\n",
                    p.builder_inputs.requires_network
                ));
            }
            StageDetails::Build(b) => {
                output.push_str(&format!("  Strategy:     {}\n", b.strategy));
                output.push_str(&format!("  Commands:     {}\n", b.commands.len()));
                output.push_str(&format!("  Exit code:    {}\n", b.exit_code));
                output.push_str(&format!("  Duration:     {:.3}s\n", b.duration_s));
                if let Some(message) = &b.message {
                    output.push_str(&format!("  Message:      {}\n", message));
                }
            }
            StageDetails::Test(t) => {
                output.push_str(&format!("  Discovered:   {}\n", t.discovered));
                output.push_str(&format!(
                    "  Results:      {} selected, {} passed, {} failed, {} skipped, {} xfailed\n",
                    t.selected, t.passed, t.failed, t.skipped, t.xfailed
                ));
                if let Some(coverage) = &t.coverage {
                    output.push_str(&format!("  Coverage:     {:.2}%\n", coverage.line_pct));
                    if let Some(error) = &coverage.error {
                        output.push_str(&format!("  Coverage err: {}\n", error));
                    }
                }
                if let Some(message) = &t.message {
                    output.push_str(&format!("  Message:      {}\n", message));
                }
            }
            StageDetails::Package(p) => {
                output.push_str(&format!("  Manifest:     {}\n", p.manifest_path));
                output.push_str(&format!("  Artifacts:    {}\n", p.artifact_count));
            }
            StageDetails::Publish(p) => {
                output.push_str(&format!("  Image:        {}\n", p.image_tag));
                output.push_str(&format!("  Manifest:     {}\n", p.manifest_path));
                output.push_str(&format!("  Pushed:       {}\n", p.pushed));
            }
        }

        output.trim_end().to_string()
    }
}
