//! Image manifest assembled from the Build and Test stage results

use crate::catalog::RepositoryDescriptor;
use crate::pipeline::details::{BuildDetails, TestDetails};
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "repo_image_manifest.json";

const PLACEHOLDER_DIGEST: &str = "sha256:placeholder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub url: String,
    pub commit: String,
    pub license: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub name: String,
    pub size_mb: u64,
    pub digest: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub run_tests: bool,
    pub deterministic_seed: bool,
    pub requires_network: bool,
}

/// Everything known about one repository's image, published as a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageManifest {
    pub repo_id: String,
    pub source: SourceInfo,
    pub build: BuildDetails,
    pub tests: TestDetails,
    pub image: ImageInfo,
    /// Paths of every artifact and log the earlier stages produced
    pub artifacts: Vec<String>,
    pub capabilities: Capabilities,
}

/// `<registry>/<id>:<commit>`, with `latest` standing in for an unpinned commit
pub fn image_tag(registry: &str, repo: &RepositoryDescriptor) -> String {
    let tag = if repo.commit.is_empty() {
        "latest"
    } else {
        repo.commit.as_str()
    };
    format!("{}/{}:{}", registry.trim_end_matches('/'), repo.id, tag)
}

fn collect_artifacts(build: &BuildDetails, tests: &TestDetails) -> Vec<String> {
    let mut artifacts: Vec<String> = [
        build.env_manifest.as_ref(),
        tests.index_path.as_ref(),
        tests.coverage.as_ref().map(|c| &c.report_path),
    ]
    .into_iter()
    .flatten()
    .cloned()
    .collect();
    artifacts.extend(tests.logs.iter().cloned());
    artifacts
}

pub fn assemble(
    repo: &RepositoryDescriptor,
    build: &BuildDetails,
    tests: &TestDetails,
    registry: &str,
) -> ImageManifest {
    ImageManifest {
        repo_id: repo.id.clone(),
        source: SourceInfo {
            url: repo.url.clone(),
            commit: repo.commit.clone(),
            license: repo.license.clone(),
        },
        build: build.clone(),
        tests: tests.clone(),
        image: ImageInfo {
            name: image_tag(registry, repo),
            size_mb: 0,
            digest: PLACEHOLDER_DIGEST.to_string(),
        },
        artifacts: collect_artifacts(build, tests),
        capabilities: Capabilities {
            run_tests: true,
            deterministic_seed: true,
            requires_network: build.requires_network,
        },
    }
}
