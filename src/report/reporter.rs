//! Progress reporting
//!
//! The pipeline calls a [`RunReporter`] as it goes; implement the trait to change how progress and the final
//! report are shown.

use std::io::{self, Write};

use crate::discovery::Fixture;

use super::{FixtureResult, GapList, RunReport};

/// Hooks called during a run.
pub trait RunReporter {
    /// Called once with the full, ordered fixture list
    fn on_discovery_complete(&mut self, _fixtures: &[Fixture]) {}

    /// Called before a fixture is executed
    fn on_fixture_start(&mut self, fixture: &Fixture);

    /// Called after a fixture has been executed and validated
    fn on_fixture_complete(&mut self, result: &FixtureResult);

    /// Called once after every fixture is done
    fn on_run_complete(&mut self, _report: &RunReport, _gaps: &GapList) {}
}

/// Plain-text reporter: immediate per-fixture status, then the full report.
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
    pub verbose: bool,
}

impl Default for ConsoleReporter<io::Stdout> {
    fn default() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, verbose: false }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        // Console output is best effort; a closed stdout must not abort the run.
        let _ = writeln!(self.out, "{}", text);
    }
}

impl<W: Write> RunReporter for ConsoleReporter<W> {
    fn on_discovery_complete(&mut self, fixtures: &[Fixture]) {
        self.emit(&format!("Found {} test directories", fixtures.len()));
        self.emit(&"=".repeat(60));
    }

    fn on_fixture_start(&mut self, fixture: &Fixture) {
        self.emit(&format!("\nRunning test: {}", fixture.name));
        self.emit(&"-".repeat(40));
    }

    fn on_fixture_complete(&mut self, result: &FixtureResult) {
        let status = if result.passed() { "✅ PASS" } else { "❌ FAIL" };
        self.emit(&format!("Status: {}", status));

        if !result.execution.success() {
            let error = result.execution.error.as_deref().unwrap_or("no diagnostic");
            self.emit(&format!("Execution failed: {}", error.trim_end()));
        }
        if !result.validation.valid() {
            self.emit(&format!("Nix validation issues: {}", result.validation.messages().join(", ")));
        }
        if self.verbose && !result.execution.stdout.is_empty() {
            self.emit(result.execution.stdout.trim_end());
        }
    }

    fn on_run_complete(&mut self, report: &RunReport, gaps: &GapList) {
        self.emit(&format!("\n\n{}", report.render()));
        if !gaps.is_empty() {
            self.emit(&format!("\n\n{}", gaps.render()));
        }
    }
}
