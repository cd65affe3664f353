//! External command execution
//!
//! Every stage shells out through [`CommandRunner`] so the pipeline can be
//! driven by [`MockCommandRunner`] in tests.

mod mock;
mod system;

pub use mock::{MockCommandRunner, MockOutcome};
pub use system::SystemCommandRunner;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Exit code reported when a command exceeds its timeout
pub const TIMEOUT_EXIT_CODE: i32 = 124;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Refusing to run an empty command")]
    EmptyCommand,

    #[error("Failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed with exit code {exit_code}: {stderr}")]
    NonZeroExit {
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

/// A command to launch: argv, working directory and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
            env: BTreeMap::new(),
            timeout: None,
        }
    }

    pub fn current_dir(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr joined the way tool summaries are scanned
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Turn a non-zero exit into an error, for commands that must succeed
    pub fn check(self, spec: &CommandSpec) -> Result<Self, ProcessError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProcessError::NonZeroExit {
                command: spec.display(),
                exit_code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Launches external commands.
///
/// A non-zero exit is not an error at this level; callers that need the
/// command to succeed use [`CommandOutput::check`]. Only failing to launch
/// the process at all is reported as `Err`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError>;

    fn name(&self) -> &str;
}
