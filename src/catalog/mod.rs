//! Repository catalog
//!
//! The catalog is a JSON or YAML document with a top-level `repos` list.
//! JSON is tried first; anything that is not valid JSON is parsed as YAML.
//!
//! ```yaml
//! version: 1
//! repos:
//!   - id: attrs
//!     url: https://github.com/python-attrs/attrs.git
//!     commit: 23.2.0
//!     license: MIT
//!     tests:
//!       markers_exclude: [slow]
//! ```

mod descriptor;

pub use descriptor::{RepositoryDescriptor, TestConfig};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Catalog must contain a top-level 'repos' list")]
    MissingRepos,

    #[error("Unknown repository id: {0}")]
    UnknownRepository(String),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    version: Option<u32>,
    repos: Option<Vec<RepositoryDescriptor>>,
}

/// Read-only mapping from repository id to descriptor, loaded once
#[derive(Debug, Clone)]
pub struct RepoCatalog {
    path: PathBuf,
    version: Option<u32>,
    repos: Vec<RepositoryDescriptor>,
}

impl RepoCatalog {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: PathBuf) -> Result<Self, CatalogError> {
        let document: CatalogDocument = match serde_json::from_str(raw) {
            Ok(doc) => doc,
            Err(json_err) => {
                debug!("Catalog is not JSON ({}), trying YAML", json_err);
                serde_yaml::from_str(raw).map_err(|e| CatalogError::Parse {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
        };

        let repos = document.repos.ok_or(CatalogError::MissingRepos)?;
        debug!("Loaded {} repositories from {:?}", repos.len(), path);

        Ok(Self {
            path,
            version: document.version,
            repos,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Descriptors in catalog file order
    pub fn iter(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.repos.iter()
    }

    pub fn get(&self, repo_id: &str) -> Result<&RepositoryDescriptor, CatalogError> {
        self.repos
            .iter()
            .find(|repo| repo.id == repo_id)
            .ok_or_else(|| CatalogError::UnknownRepository(repo_id.to_string()))
    }

    pub fn contains(&self, repo_id: &str) -> bool {
        self.repos.iter().any(|repo| repo.id == repo_id)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}
