//! CLI module for the fixture validator
//!
//! `nixgen-check [ROOT]` discovers the `test_*` fixtures under ROOT (default: the current directory), runs and
//! validates each one, prints the report and gap list, and writes `test_results.json`.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use crate::config::ValidatorConfig;
use crate::pipeline::{RunError, Validator};
use crate::report::{ConsoleReporter, RunReport};
use crate::version::NIXGEN_CHECK_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        // miette's Debug output is the rendered diagnostic, help text included.
        Self::failure(format!("{:?}", miette::Report::new(e)))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Validate the CMake Nix generator's test fixtures
#[derive(Parser, Debug)]
#[command(name = "nixgen-check")]
#[command(version = NIXGEN_CHECK_VERSION)]
#[command(about = "Run and validate the CMake Nix generator test fixtures", long_about = None)]
pub struct Cli {
    /// Directory containing the fixture directories
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Where to write the per-fixture JSON results
    #[arg(long, value_name = "FILE", default_value = "test_results.json")]
    pub results: PathBuf,

    /// Generator binary (default: ROOT/bin/cmake)
    #[arg(long, value_name = "PATH")]
    pub generator: Option<PathBuf>,

    /// Directory-name prefix that marks a fixture
    #[arg(long, value_name = "PREFIX", default_value = "test_")]
    pub prefix: String,

    /// Seconds allowed for descriptor generation
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub generator_timeout: u64,

    /// Seconds allowed for a fixture's build and run
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub build_timeout: u64,

    /// Seconds allowed for the syntax check
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub syntax_timeout: u64,

    /// Syntax checker program
    #[arg(long, value_name = "PROGRAM", default_value = "nix-instantiate")]
    pub syntax_checker: String,

    /// Echo each fixture's captured output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Map flags onto a validator configuration.
    pub fn to_config(&self) -> ValidatorConfig {
        let mut config = ValidatorConfig::new(&self.root)
            .with_fixture_prefix(self.prefix.clone())
            .with_results_path(&self.results)
            .with_generator_timeout(Duration::from_secs(self.generator_timeout))
            .with_build_timeout(Duration::from_secs(self.build_timeout))
            .with_syntax_timeout(Duration::from_secs(self.syntax_timeout))
            .with_syntax_checker(self.syntax_checker.clone());
        if let Some(generator) = &self.generator {
            config = config.with_generator(generator);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute a validation run and return the exit code.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    println!("CMake Nix Generator Test Validation");
    println!("{}", "=".repeat(50));

    let validator = Validator::new(cli.to_config());
    let mut reporter = ConsoleReporter::default().with_verbose(cli.verbose);
    let outcome = validator.run(&mut reporter)?;

    let results_path = &validator.config().results_path;
    outcome.save_results(results_path)?;
    println!("\nDetailed results saved to {}", results_path.display());

    println!("{}", final_message(&outcome.report));
    Ok(exit_code(&outcome.report))
}

/// Exit status for a finished run: success only when no fixture failed.
pub fn exit_code(report: &RunReport) -> ExitCode {
    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// The closing line printed after the results file is written.
pub fn final_message(report: &RunReport) -> String {
    if !report.all_passed() {
        format!("❌ {} tests failed", report.failed)
    } else if report.total == 0 {
        "✅ No test fixtures found, nothing failed".to_string()
    } else {
        "✅ All tests passed!".to_string()
    }
}
