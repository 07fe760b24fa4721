//! External syntax checking
//!
//! The checker is a fallible collaborator: "the tool rejected the file" and "the tool could not be asked" are
//! different verdicts and must stay distinguishable in reports.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ValidatorConfig;
use crate::runner::process::{Invocation, ProcessExecutor, ProcessOutcome, SystemExecutor};

/// Answer from a syntax checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxVerdict {
    Valid,
    /// The checker ran and rejected the file; carries its diagnostic text
    Invalid(String),
    /// The checker could not be run to completion
    Unavailable(String),
}

pub trait SyntaxChecker {
    /// Name shown in "not available" issues
    fn name(&self) -> &str;
    fn check(&self, path: &Path) -> SyntaxVerdict;
}

impl<C: SyntaxChecker + ?Sized> SyntaxChecker for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn check(&self, path: &Path) -> SyntaxVerdict {
        (**self).check(path)
    }
}

/// `nix-instantiate --parse <file>`
pub struct NixInstantiateChecker<E: ProcessExecutor = SystemExecutor> {
    program: String,
    timeout: Duration,
    executor: E,
}

impl NixInstantiateChecker<SystemExecutor> {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self::with_executor(config, SystemExecutor::default())
    }
}

impl<E: ProcessExecutor> NixInstantiateChecker<E> {
    pub fn with_executor(config: &ValidatorConfig, executor: E) -> Self {
        Self {
            program: config.syntax_checker.clone(),
            timeout: config.syntax_timeout,
            executor,
        }
    }
}

impl<E: ProcessExecutor> NixInstantiateChecker<E> {
    /// Diagnostic for a rejected file: stderr, else stdout, else the exit status.
    fn rejection_text(&self, code: Option<i32>, stdout: String, stderr: String) -> String {
        if !stderr.trim().is_empty() {
            stderr
        } else if !stdout.trim().is_empty() {
            stdout
        } else {
            match code {
                Some(code) => format!("{} exited with status {}", self.program, code),
                None => format!("{} was terminated by a signal", self.program),
            }
        }
    }
}

impl<E: ProcessExecutor> SyntaxChecker for NixInstantiateChecker<E> {
    fn name(&self) -> &str {
        &self.program
    }

    fn check(&self, path: &Path) -> SyntaxVerdict {
        let invocation = Invocation::new(
            PathBuf::from(&self.program),
            vec!["--parse".to_string(), path.display().to_string()],
            self.timeout,
        );
        match self.executor.execute(&invocation) {
            Ok(ProcessOutcome::Exited { success: true, .. }) => SyntaxVerdict::Valid,
            Ok(ProcessOutcome::Exited {
                code,
                stdout,
                stderr,
                ..
            }) => SyntaxVerdict::Invalid(self.rejection_text(code, stdout, stderr)),
            Ok(ProcessOutcome::TimedOut { .. }) => {
                SyntaxVerdict::Unavailable(format!("timed out after {} seconds", self.timeout.as_secs()))
            }
            Err(e) => SyntaxVerdict::Unavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    struct Canned(fn() -> io::Result<ProcessOutcome>);

    impl ProcessExecutor for Canned {
        fn execute(&self, invocation: &Invocation) -> io::Result<ProcessOutcome> {
            assert_eq!(invocation.args[0], "--parse");
            (self.0)()
        }
    }

    fn checker(reply: fn() -> io::Result<ProcessOutcome>) -> NixInstantiateChecker<Canned> {
        NixInstantiateChecker::with_executor(&ValidatorConfig::default(), Canned(reply))
    }

    #[test]
    fn test_zero_exit_is_valid() {
        let c = checker(|| {
            Ok(ProcessOutcome::Exited {
                success: true,
                code: Some(0),
                stdout: "{ }".to_string(),
                stderr: String::new(),
            })
        });
        assert_eq!(c.check(Path::new("/r/default.nix")), SyntaxVerdict::Valid);
    }

    #[test]
    fn test_rejection_carries_stderr() {
        let c = checker(|| {
            Ok(ProcessOutcome::Exited {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: "error: syntax error, unexpected end of file".to_string(),
            })
        });
        assert_eq!(
            c.check(Path::new("/r/default.nix")),
            SyntaxVerdict::Invalid("error: syntax error, unexpected end of file".to_string())
        );
    }

    #[test]
    fn test_silent_rejection_names_exit_status() {
        let c = checker(|| {
            Ok(ProcessOutcome::Exited {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: "\n".to_string(),
            })
        });
        assert_eq!(
            c.check(Path::new("/r/default.nix")),
            SyntaxVerdict::Invalid("nix-instantiate exited with status 1".to_string())
        );
    }

    #[test]
    fn test_rejection_falls_back_to_stdout() {
        let c = checker(|| {
            Ok(ProcessOutcome::Exited {
                success: false,
                code: Some(1),
                stdout: "error: unexpected '}'".to_string(),
                stderr: String::new(),
            })
        });
        assert_eq!(
            c.check(Path::new("/r/default.nix")),
            SyntaxVerdict::Invalid("error: unexpected '}'".to_string())
        );
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let c = checker(|| Err(io::Error::new(io::ErrorKind::NotFound, "not found")));
        assert!(matches!(c.check(Path::new("/r/default.nix")), SyntaxVerdict::Unavailable(_)));
        assert_eq!(c.name(), "nix-instantiate");
    }

    #[test]
    fn test_timeout_is_unavailable() {
        let c = checker(|| {
            Ok(ProcessOutcome::TimedOut {
                stdout: String::new(),
                stderr: String::new(),
            })
        });
        assert_eq!(
            c.check(Path::new("/r/default.nix")),
            SyntaxVerdict::Unavailable("timed out after 30 seconds".to_string())
        );
    }
}
