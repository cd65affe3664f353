//! Repository introspection: what build descriptors a checkout carries,
//! which install strategy they imply and which install commands to run.

pub mod install;
pub mod probe;
pub mod strategy;

pub use install::{build_install_commands, infer_project_extras};
pub use probe::{probe_toolchain, ToolchainProbe};
pub use strategy::{select_strategy, BuildStrategy};

use crate::fs::FileSystem;
use std::path::Path;
use tracing::debug;

pub const PYPROJECT: &str = "pyproject.toml";

/// Parse `pyproject.toml` if present. Missing or malformed files read as an
/// empty table so introspection never fails on a broken manifest.
pub(crate) fn load_pyproject(fs: &dyn FileSystem, repo_dir: &Path) -> toml::Table {
    let path = repo_dir.join(PYPROJECT);
    if !fs.is_file(&path) {
        return toml::Table::new();
    }

    let content = match fs.read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Unreadable {}: {}", PYPROJECT, e);
            return toml::Table::new();
        }
    };

    match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => {
            debug!("Malformed {}: {}", PYPROJECT, e);
            toml::Table::new()
        }
    }
}
