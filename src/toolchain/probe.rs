use super::{load_pyproject, PYPROJECT};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const WORKFLOWS_DIR: &str = ".github/workflows";

/// Build and dependency descriptors found in a checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainProbe {
    pub pyproject: bool,
    /// `[tool.poetry]` section present
    pub poetry: bool,
    /// `[tool.hatch]` section present
    pub hatch: bool,
    pub build_backend: Option<String>,
    pub requirements: bool,
    pub environment_yml: bool,
    /// `.yml` workflows sorted, followed by `.yaml` workflows sorted
    pub ci_workflows: Vec<String>,
}

/// Inspect `repo_dir` without touching it
pub fn probe_toolchain(fs: &dyn FileSystem, repo_dir: &Path) -> ToolchainProbe {
    let pyproject = fs.is_file(&repo_dir.join(PYPROJECT));
    let manifest = load_pyproject(fs, repo_dir);

    let build_backend = manifest
        .get("build-system")
        .and_then(|b| b.get("build-backend"))
        .and_then(|b| b.as_str())
        .map(String::from);
    let tool = manifest.get("tool").and_then(|t| t.as_table());
    let has_tool = |name: &str| tool.map(|t| t.contains_key(name)).unwrap_or(false);

    let probe = ToolchainProbe {
        pyproject,
        poetry: has_tool("poetry"),
        hatch: has_tool("hatch"),
        build_backend,
        requirements: fs.is_file(&repo_dir.join("requirements.txt")),
        environment_yml: fs.is_file(&repo_dir.join("environment.yml")),
        ci_workflows: find_workflows(fs, repo_dir),
    };

    debug!(?probe, "Probed toolchain in {}", repo_dir.display());
    probe
}

fn find_workflows(fs: &dyn FileSystem, repo_dir: &Path) -> Vec<String> {
    let dir = repo_dir.join(WORKFLOWS_DIR);
    if !fs.is_dir(&dir) {
        return Vec::new();
    }

    let entries = match fs.read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let with_extension = |ext: &str| {
        let suffix = format!(".{}", ext);
        let mut names: Vec<String> = entries
            .iter()
            // Symlinked workflows count; `is_file` on the path follows the link
            .filter(|e| e.file_name().ends_with(&suffix) && fs.is_file(e.path()))
            .map(|e| format!("{}/{}", WORKFLOWS_DIR, e.file_name()))
            .collect();
        names.sort();
        names
    };

    let mut workflows = with_extension("yml");
    workflows.extend(with_extension("yaml"));
    workflows
}
