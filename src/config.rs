//! Configuration management for repokiln
//!
//! Settings are loaded from environment variables with defaults; CLI flags
//! override the catalog and workspace locations afterwards.
//!
//! # Environment
//!
//! - `REPOKILN_CATALOG`: Repository catalog file - default: "repo_catalog/repos.yaml"
//! - `REPOKILN_WORKSPACE`: Workspace root - default: ".repokiln"
//! - `REPOKILN_LOG_LEVEL`: Logging level - default: "info"
//! - `REPOKILN_PYTHON_VERSION`: Runtime version recorded in plans - default: "3.11"
//! - `REPOKILN_BASE_IMAGE`: Base image recorded in build details - default: "python:3.11-slim"
//! - `REPOKILN_IMAGE_REGISTRY`: Prefix for image names and tags - default: "ghcr.io/repokiln"
//!
//! # Example
//!
//! ```no_run
//! use repokiln::RepokilnConfig;
//!
//! let config = RepokilnConfig::default();
//! config.validate().expect("valid configuration");
//! let pipeline = config.pipeline_config();
//! assert_eq!(pipeline.python_version, config.python_version);
//! ```

use crate::pipeline::config::{
    PipelineConfig, DEFAULT_BASE_IMAGE, DEFAULT_IMAGE_REGISTRY, DEFAULT_PYTHON_VERSION,
};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_CATALOG: &str = "repo_catalog/repos.yaml";
const DEFAULT_WORKSPACE: &str = ".repokiln";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    ValidationFailed(String),

    #[error("cannot parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Main configuration structure for repokiln
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepokilnConfig {
    /// Repository catalog (JSON or YAML)
    pub catalog_path: PathBuf,

    /// Root of checkouts, stage caches, artifacts and logs
    pub workspace_root: PathBuf,

    /// One of trace, debug, info, warn, error
    pub log_level: String,

    pub python_version: String,

    pub base_image: String,

    pub image_registry: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Default for RepokilnConfig {
    /// Loads from `REPOKILN_*` environment variables, falling back to defaults
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(env_or("REPOKILN_CATALOG", DEFAULT_CATALOG)),
            workspace_root: PathBuf::from(env_or("REPOKILN_WORKSPACE", DEFAULT_WORKSPACE)),
            log_level: env_or("REPOKILN_LOG_LEVEL", DEFAULT_LOG_LEVEL).to_lowercase(),
            python_version: env_or("REPOKILN_PYTHON_VERSION", DEFAULT_PYTHON_VERSION),
            base_image: env_or("REPOKILN_BASE_IMAGE", DEFAULT_BASE_IMAGE),
            image_registry: env_or("REPOKILN_IMAGE_REGISTRY", DEFAULT_IMAGE_REGISTRY),
        }
    }
}

impl RepokilnConfig {
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_workspace_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.workspace_root = path.into();
        self
    }

    /// Reject settings that would only fail later, mid-pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the log level is unknown, the python version
    /// is not dotted numeric, or the registry is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "log level '{}' is not one of trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        for part in self.python_version.split('.') {
            part.parse::<u32>().map_err(|e| ConfigError::ParseError {
                field: "REPOKILN_PYTHON_VERSION".to_string(),
                error: format!("{:?} is not a version: {}", self.python_version, e),
            })?;
        }

        if self.image_registry.trim_matches('/').is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Image registry cannot be empty".to_string(),
            ));
        }

        if self.workspace_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Workspace root cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The subset of settings stage handlers read
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new()
            .with_python_version(self.python_version.clone())
            .with_base_image(self.base_image.clone())
            .with_image_registry(self.image_registry.clone())
    }

    /// Flattened key/value view used by `repokiln config`
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        map.insert(
            "catalog_path".to_string(),
            self.catalog_path.display().to_string(),
        );
        map.insert(
            "workspace_root".to_string(),
            self.workspace_root.display().to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("python_version".to_string(), self.python_version.clone());
        map.insert("base_image".to_string(), self.base_image.clone());
        map.insert("image_registry".to_string(), self.image_registry.clone());

        map
    }
}

impl fmt::Display for RepokilnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repokiln Configuration:")?;
        writeln!(f, "  Catalog: {}", self.catalog_path.display())?;
        writeln!(f, "  Workspace: {}", self.workspace_root.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Python Version: {}", self.python_version)?;
        writeln!(f, "  Base Image: {}", self.base_image)?;
        writeln!(f, "  Image Registry: {}", self.image_registry)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clear_env() -> Vec<EnvGuard> {
        [
            "REPOKILN_CATALOG",
            "REPOKILN_WORKSPACE",
            "REPOKILN_LOG_LEVEL",
            "REPOKILN_PYTHON_VERSION",
            "REPOKILN_BASE_IMAGE",
            "REPOKILN_IMAGE_REGISTRY",
        ]
        .into_iter()
        .map(EnvGuard::unset)
        .collect()
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clear_env();

        let config = RepokilnConfig::default();

        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG));
        assert_eq!(config.workspace_root, PathBuf::from(DEFAULT_WORKSPACE));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.python_version, "3.11");
        assert_eq!(config.base_image, "python:3.11-slim");
        assert_eq!(config.image_registry, "ghcr.io/repokiln");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        let _guards = clear_env();
        let _catalog = EnvGuard::set("REPOKILN_CATALOG", "/etc/repokiln/repos.json");
        let _level = EnvGuard::set("REPOKILN_LOG_LEVEL", "DEBUG");
        let _python = EnvGuard::set("REPOKILN_PYTHON_VERSION", "3.12");

        let config = RepokilnConfig::default();

        assert_eq!(config.catalog_path, PathBuf::from("/etc/repokiln/repos.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.pipeline_config().python_version, "3.12");
    }

    #[test]
    #[serial]
    fn test_blank_value_falls_back_to_default() {
        let _guards = clear_env();
        let _workspace = EnvGuard::set("REPOKILN_WORKSPACE", "  ");

        assert_eq!(
            RepokilnConfig::default().workspace_root,
            PathBuf::from(DEFAULT_WORKSPACE)
        );
    }

    #[test]
    #[serial]
    fn test_validation_errors() {
        let _guards = clear_env();

        let mut config = RepokilnConfig::default();
        config.log_level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        let mut config = RepokilnConfig::default();
        config.python_version = "3.x".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ParseError { .. })));

        let mut config = RepokilnConfig::default();
        config.image_registry = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_cli_overrides_and_display_map() {
        let _guards = clear_env();

        let config = RepokilnConfig::default()
            .with_catalog_path("catalog.json")
            .with_workspace_root("/tmp/ws");
        let map = config.to_display_map();

        assert_eq!(map.get("catalog_path").map(String::as_str), Some("catalog.json"));
        assert_eq!(map.get("workspace_root").map(String::as_str), Some("/tmp/ws"));
        assert_eq!(map.len(), 6);
        assert!(config.to_string().contains("Image Registry: ghcr.io/repokiln"));
    }
}
