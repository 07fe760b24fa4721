//! The discovery → execution → validation → aggregation pipeline.
//!
//! [`Validator::run`] is the only entry point. Per-fixture problems never surface as `Err`; they are recorded in
//! that fixture's outcomes. Only an unusable fixture root fails the run.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::artifact::{ArtifactValidator, NixInstantiateChecker, SyntaxChecker};
use crate::config::ValidatorConfig;
use crate::coverage::analyze_coverage;
use crate::discovery::{DiscoveryError, discover_fixtures};
use crate::report::{FixtureResult, GapList, RunReport, RunReporter, identify_gaps, write_results};
use crate::runner::workdir;
use crate::runner::{ProcessExecutor, SystemExecutor, TestRunner};

/// Run-level failures.
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    #[error(transparent)]
    #[diagnostic(
        code(nixgen_check::discovery),
        help("pass the CMake source directory that contains the test_* fixture directories")
    )]
    Discovery(#[from] DiscoveryError),

    #[error("failed to write results to '{path}': {source}")]
    #[diagnostic(code(nixgen_check::persist), help("check that the results directory exists and is writable"))]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One entry per discovered fixture, in discovery order
    pub results: Vec<FixtureResult>,
    pub report: RunReport,
    pub gaps: GapList,
}

impl RunOutcome {
    pub fn all_passed(&self) -> bool {
        self.report.all_passed()
    }

    pub fn save_results(&self, path: &Path) -> Result<(), RunError> {
        write_results(path, &self.results).map_err(|source| RunError::Persist {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub struct Validator<E: ProcessExecutor = SystemExecutor, C: SyntaxChecker = NixInstantiateChecker> {
    config: ValidatorConfig,
    runner: TestRunner<E>,
    artifacts: ArtifactValidator<C>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            runner: TestRunner::new(config.clone()),
            artifacts: ArtifactValidator::new(config.clone()),
            config,
        }
    }
}

impl<E: ProcessExecutor, C: SyntaxChecker> Validator<E, C> {
    /// Build a validator around a custom executor and syntax checker.
    pub fn with_parts(config: ValidatorConfig, executor: E, checker: C) -> Self {
        Self {
            runner: TestRunner::with_executor(config.clone(), executor),
            artifacts: ArtifactValidator::with_checker(config.clone(), checker),
            config,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every fixture under the configured root, strictly one after another.
    #[tracing::instrument(skip_all, fields(root = %self.config.root.display()))]
    pub fn run(&self, reporter: &mut dyn RunReporter) -> Result<RunOutcome, RunError> {
        let fixtures = discover_fixtures(&self.config)?;
        if fixtures.is_empty() {
            tracing::warn!("no fixtures matching '{}*' found", self.config.fixture_prefix);
        }
        reporter.on_discovery_complete(&fixtures);

        let cwd_before = workdir::current_dir().ok();

        let mut results = Vec::with_capacity(fixtures.len());
        for fixture in &fixtures {
            reporter.on_fixture_start(fixture);
            let execution = self.runner.run(fixture);
            let validation = self.artifacts.validate(fixture);
            let result = FixtureResult {
                path: fixture.dir.clone(),
                execution,
                validation,
            };
            reporter.on_fixture_complete(&result);
            results.push(result);
        }

        if workdir::current_dir().ok() != cwd_before {
            tracing::error!("working directory changed during the run");
        }

        let coverage = analyze_coverage(&fixtures);
        let names: Vec<&str> = fixtures.iter().map(|f| f.name.as_str()).collect();
        let gaps = identify_gaps(&coverage, &names);
        let report = RunReport::build(&results, coverage);
        tracing::info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            "run complete"
        );
        reporter.on_run_complete(&report, &gaps);

        Ok(RunOutcome { results, report, gaps })
    }
}
