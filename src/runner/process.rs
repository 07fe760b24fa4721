//! Bounded external process execution
//!
//! The [`ProcessExecutor`] trait separates "run this program with a deadline" from the runner's strategy logic
//! so tests can substitute a scripted executor. [`SystemExecutor`] is the real implementation.
//!
//! Child output goes to anonymous temp files rather than pipes: a killed build can leave grandchildren holding
//! the write end of a pipe, and reading a file back never blocks on them.
//!
//! On Unix each child leads its own process group, and the whole group is killed when the deadline passes, so
//! background work started by a build script cannot outlive its fixture.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// A single external command with its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process exited on its own before the deadline.
    Exited {
        success: bool,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The deadline passed and the process was killed.
    TimedOut { stdout: String, stderr: String },
}

/// Run external commands with a deadline.
///
/// Implementations run the command in the process's current working directory. An `Err` means the command
/// could not be started or supervised at all (missing binary, permission denied, ...).
pub trait ProcessExecutor {
    fn execute(&self, invocation: &Invocation) -> io::Result<ProcessOutcome>;
}

impl<E: ProcessExecutor + ?Sized> ProcessExecutor for &E {
    fn execute(&self, invocation: &Invocation) -> io::Result<ProcessOutcome> {
        (**self).execute(invocation)
    }
}

/// Spawns real child processes and polls them against the deadline.
#[derive(Debug, Clone, Copy)]
pub struct SystemExecutor {
    poll_interval: Duration,
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl SystemExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how often a running child is checked for exit
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn wait_with_deadline<C: Supervised>(&self, child: &mut C, timeout: Duration) -> io::Result<Option<ExitStatus>> {
        let started = Instant::now();
        loop {
            let polled = match child.try_wait() {
                Ok(polled) => polled,
                Err(e) => {
                    // Never leave an unsupervised child behind.
                    child.terminate();
                    let _ = child.wait();
                    return Err(e);
                }
            };
            if let Some(status) = polled {
                return Ok(Some(status));
            }
            if started.elapsed() >= timeout {
                // The child may exit between try_wait and kill; either way it is reaped below.
                child.terminate();
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// The handful of child-process operations the deadline loop needs.
trait Supervised {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;
    fn wait(&mut self) -> io::Result<ExitStatus>;
    /// Kill the child and, on Unix, every process in its group.
    fn terminate(&mut self);
}

impl Supervised for Child {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        Child::try_wait(self)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        Child::wait(self)
    }

    fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            if let Ok(pid) = i32::try_from(self.id()) {
                if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                    tracing::debug!(pid, "could not signal process group: {}", e);
                }
            }
        }
        let _ = self.kill();
    }
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) -> &mut Command {
    use std::os::unix::process::CommandExt;
    command.process_group(0)
}

#[cfg(not(unix))]
fn own_process_group(command: &mut Command) -> &mut Command {
    command
}

impl ProcessExecutor for SystemExecutor {
    fn execute(&self, invocation: &Invocation) -> io::Result<ProcessOutcome> {
        let mut stdout_file = tempfile::tempfile()?;
        let mut stderr_file = tempfile::tempfile()?;

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?));
        let mut child = own_process_group(&mut command).spawn()?;

        let status = self.wait_with_deadline(&mut child, invocation.timeout)?;
        let stdout = read_back(&mut stdout_file)?;
        let stderr = read_back(&mut stderr_file)?;

        Ok(match status {
            Some(status) => ProcessOutcome::Exited {
                success: status.success(),
                code: status.code(),
                stdout,
                stderr,
            },
            None => ProcessOutcome::TimedOut { stdout, stderr },
        })
    }
}

fn read_back(file: &mut File) -> io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
