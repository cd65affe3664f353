use super::{CommandOutput, CommandRunner, CommandSpec, ProcessError, TIMEOUT_EXIT_CODE};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs commands as real child processes, inheriting the current environment
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        let (program, args) = spec.argv.split_first().ok_or(ProcessError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        debug!("Running `{}` in {:?}", spec.display(), spec.cwd);

        let child = command.output();
        let output = match spec.timeout {
            Some(limit) => match tokio::time::timeout(limit, child).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("`{}` timed out after {:?}", spec.display(), limit);
                    return Ok(CommandOutput::failure(
                        TIMEOUT_EXIT_CODE,
                        format!("timed out after {}s", limit.as_secs()),
                    ));
                }
            },
            None => child.await,
        }
        .map_err(|source| ProcessError::Launch {
            command: spec.display(),
            source,
        })?;

        // A process killed by a signal has no exit code
        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code != 0 {
            debug!("`{}` exited with {}", spec.display(), exit_code);
        }

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn name(&self) -> &str {
        "system"
    }
}
