//! Fixture execution
//!
//! [`TestRunner`] turns one fixture into exactly one [`ExecutionOutcome`]. Tool errors and timeouts are folded into
//! the outcome, so `run` has no error path and one broken fixture cannot stop the rest of the suite.
//!
//! ## Modules
//!
//! - `strategy` - picks how a fixture is built
//! - `process` - bounded child-process execution
//! - `workdir` - scoped working-directory changes

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod process;
pub mod strategy;
pub mod workdir;

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::ValidatorConfig;
use crate::discovery::Fixture;

pub use process::{Invocation, ProcessExecutor, ProcessOutcome, SystemExecutor};
pub use strategy::InvocationStrategy;
pub use workdir::ScopedWorkingDir;

/// Errors that end a fixture's execution early.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Could not generate or find Nix build files")]
    NoBuildTarget,

    #[error("{step} timed out after {secs} seconds", secs = .timeout.as_secs())]
    Timeout { step: &'static str, timeout: Duration },

    #[error("Test execution failed: could not run '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Test execution failed: cannot enter '{dir}': {source}")]
    WorkingDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Terminal execution state of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
    TimedOut,
}

/// Result of running one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub fixture: String,
    pub status: ExecutionStatus,
    pub stdout: String,
    /// Captured stderr, or the diagnostic explaining why execution failed
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }

    fn from_error(fixture: &str, error: &ExecutionError) -> Self {
        let status = match error {
            ExecutionError::Timeout { .. } => ExecutionStatus::TimedOut,
            _ => ExecutionStatus::Failed,
        };
        Self {
            fixture: fixture.to_string(),
            status,
            stdout: String::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Runs fixtures one at a time through an executor.
pub struct TestRunner<E: ProcessExecutor = SystemExecutor> {
    config: ValidatorConfig,
    executor: E,
}

impl TestRunner<SystemExecutor> {
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_executor(config, SystemExecutor::default())
    }
}

impl<E: ProcessExecutor> TestRunner<E> {
    pub fn with_executor(config: ValidatorConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// Run one fixture to a terminal outcome.
    #[tracing::instrument(skip_all, fields(fixture = %fixture.name))]
    pub fn run(&self, fixture: &Fixture) -> ExecutionOutcome {
        let Some(strategy) = InvocationStrategy::resolve(fixture, &self.config) else {
            return ExecutionOutcome::from_error(&fixture.name, &ExecutionError::NoBuildTarget);
        };
        tracing::debug!(strategy = strategy.name(), "resolved invocation strategy");

        match self.execute(fixture, &strategy) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!("fixture execution ended early: {}", e);
                ExecutionOutcome::from_error(&fixture.name, &e)
            }
        }
    }

    fn execute(&self, fixture: &Fixture, strategy: &InvocationStrategy) -> Result<ExecutionOutcome, ExecutionError> {
        let dir = strategy.working_dir(fixture);
        // Held until this function returns, on every path.
        let _scope = ScopedWorkingDir::enter(dir).map_err(|source| ExecutionError::WorkingDir {
            dir: dir.to_path_buf(),
            source,
        })?;

        if let Some(generate) = strategy.generate_invocation(&self.config) {
            self.generate(&generate)?;
            if !fixture.dir.join(&self.config.descriptor_file).is_file() {
                return Err(ExecutionError::NoBuildTarget);
            }
        }

        let build = strategy.build_invocation(fixture, &self.config);
        tracing::debug!(command = %build, "running fixture");
        match self.spawn(&build)? {
            ProcessOutcome::Exited {
                success,
                code,
                stdout,
                stderr,
            } => {
                let error = if !stderr.is_empty() {
                    Some(stderr)
                } else if success {
                    None
                } else {
                    Some(match code {
                        Some(code) => format!("{} exited with status {}", build, code),
                        None => format!("{} was terminated by a signal", build),
                    })
                };
                Ok(ExecutionOutcome {
                    fixture: fixture.name.clone(),
                    status: if success {
                        ExecutionStatus::Succeeded
                    } else {
                        ExecutionStatus::Failed
                    },
                    stdout,
                    error,
                })
            }
            ProcessOutcome::TimedOut { .. } => Err(ExecutionError::Timeout {
                step: "Test",
                timeout: build.timeout,
            }),
        }
    }

    fn generate(&self, invocation: &Invocation) -> Result<(), ExecutionError> {
        tracing::debug!(command = %invocation, "generating build descriptor");
        match self.spawn(invocation)? {
            ProcessOutcome::Exited { success: true, .. } => Ok(()),
            ProcessOutcome::Exited { code, stderr, .. } => {
                // Not fatal on its own; the descriptor check afterwards decides.
                tracing::warn!(?code, "generator failed: {}", stderr.trim());
                Ok(())
            }
            ProcessOutcome::TimedOut { .. } => Err(ExecutionError::Timeout {
                step: "Generator",
                timeout: invocation.timeout,
            }),
        }
    }

    fn spawn(&self, invocation: &Invocation) -> Result<ProcessOutcome, ExecutionError> {
        self.executor
            .execute(invocation)
            .map_err(|source| ExecutionError::Spawn {
                program: invocation.program.clone(),
                source,
            })
    }
}
