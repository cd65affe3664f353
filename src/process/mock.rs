use super::{CommandOutput, CommandRunner, CommandSpec, ProcessError};
use async_trait::async_trait;
use std::io;
use std::sync::{Mutex, PoisonError};

/// What a scripted command does when it matches
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Output(CommandOutput),
    LaunchFailure(String),
}

struct Rule {
    prefix: Vec<String>,
    outcome: MockOutcome,
}

/// Scripted command runner.
///
/// Each invocation is matched against the registered argv prefixes, most
/// recently registered first; unmatched commands succeed with empty output.
/// Every invocation is recorded.
pub struct MockCommandRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on<I, S>(&self, prefix: I, output: CommandOutput) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_rule(prefix, MockOutcome::Output(output))
    }

    pub fn fail_launch<I, S>(&self, prefix: I, message: impl Into<String>) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_rule(prefix, MockOutcome::LaunchFailure(message.into()))
    }

    fn push_rule<I, S>(&self, prefix: I, outcome: MockOutcome) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.lock().unwrap_or_else(PoisonError::into_inner).push(Rule {
            prefix: prefix.into_iter().map(Into::into).collect(),
            outcome,
        });
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Recorded argv lists, in invocation order
    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|spec| spec.argv.clone())
            .collect()
    }
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        if spec.argv.is_empty() {
            return Err(ProcessError::EmptyCommand);
        }
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(spec.clone());

        let rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = rules
            .iter()
            .rev()
            .find(|rule| spec.argv.starts_with(&rule.prefix))
            .map(|rule| rule.outcome.clone());

        match outcome {
            Some(MockOutcome::Output(output)) => Ok(output),
            Some(MockOutcome::LaunchFailure(message)) => Err(ProcessError::Launch {
                command: spec.display(),
                source: io::Error::new(io::ErrorKind::NotFound, message),
            }),
            None => Ok(CommandOutput::default()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
