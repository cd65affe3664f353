//! Static repository metadata read from the catalog

use serde::{Deserialize, Serialize};

fn default_commit() -> String {
    "main".to_string()
}

fn default_language() -> String {
    "python".to_string()
}

fn default_runner() -> String {
    "pytest".to_string()
}

/// How a repository's test suite is executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    #[serde(default = "default_runner")]
    pub runner: String,
    /// Markers deselected from both collection and execution
    #[serde(default)]
    pub markers_exclude: Vec<String>,
    #[serde(default)]
    pub timeout_s: Option<u64>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            runner: default_runner(),
            markers_exclude: Vec::new(),
            timeout_s: None,
        }
    }
}

/// One source repository as described by the catalog.
///
/// Never mutated after loading; the pipeline only borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub url: String,
    /// Pinned revision; an empty string leaves the clone on its default branch
    #[serde(default = "default_commit")]
    pub commit: String,
    #[serde(default)]
    pub license: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub tests: TestConfig,
}

impl RepositoryDescriptor {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            commit: default_commit(),
            license: String::new(),
            language: default_language(),
            tests: TestConfig::default(),
        }
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = commit.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_tests(mut self, tests: TestConfig) -> Self {
        self.tests = tests;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let descriptor: RepositoryDescriptor =
            serde_json::from_str(r#"{"id": "demo", "url": "https://example.com/demo.git"}"#)
                .unwrap();

        assert_eq!(descriptor.commit, "main");
        assert_eq!(descriptor.license, "");
        assert_eq!(descriptor.language, "python");
        assert_eq!(descriptor.tests, TestConfig::default());
        assert_eq!(descriptor.tests.runner, "pytest");
    }

    #[test]
    fn test_explicit_test_config() {
        let descriptor: RepositoryDescriptor = serde_json::from_str(
            r#"{
                "id": "demo",
                "url": "https://example.com/demo.git",
                "commit": "abc123",
                "tests": {"markers_exclude": ["slow", "network"], "timeout_s": 900}
            }"#,
        )
        .unwrap();

        assert_eq!(descriptor.commit, "abc123");
        assert_eq!(descriptor.tests.runner, "pytest");
        assert_eq!(descriptor.tests.markers_exclude, vec!["slow", "network"]);
        assert_eq!(descriptor.tests.timeout_s, Some(900));
    }

    #[test]
    fn test_missing_url_rejected() {
        let result = serde_json::from_str::<RepositoryDescriptor>(r#"{"id": "demo"}"#);
        assert!(result.is_err());
    }
}
