//! Run aggregation and reporting
//!
//! ## Modules
//!
//! - `gaps` - critical-feature and scenario gap analysis
//! - `reporter` - progress hooks and the console reporter
//! - `results` - the persisted per-fixture JSON document

pub mod gaps;
pub mod reporter;
pub mod results;

use std::path::PathBuf;

use nixgen_core::features::{self, FeatureId};

use crate::artifact::ValidationOutcome;
use crate::coverage::CoverageMap;
use crate::runner::ExecutionOutcome;

pub use gaps::{Gap, GapList, identify_gaps};
pub use reporter::{ConsoleReporter, RunReporter};
pub use results::{FixtureRecord, write_results};

/// Everything produced for one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureResult {
    pub path: PathBuf,
    pub execution: ExecutionOutcome,
    pub validation: ValidationOutcome,
}

impl FixtureResult {
    pub fn name(&self) -> &str {
        &self.execution.fixture
    }

    /// Passing needs both a successful execution and a valid artifact.
    pub fn passed(&self) -> bool {
        self.execution.success() && self.validation.valid()
    }
}

/// Diagnostics for one failing fixture, each labeled by where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub fixture: String,
    /// Set when execution failed
    pub execution_error: Option<String>,
    /// Non-empty when validation failed
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    AddTests(FeatureId),
    FixFailingTests,
    ValidateGeneration,
}

impl Recommendation {
    pub fn text(&self) -> String {
        match self {
            Recommendation::AddTests(id) => format!("Add tests for {}", features::as_str(*id)),
            Recommendation::FixFailingTests => "Fix failing tests before proceeding".to_string(),
            Recommendation::ValidateGeneration => "Validate Nix derivation generation".to_string(),
        }
    }
}

/// Aggregate view of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub coverage: CoverageMap,
    pub failures: Vec<FailureDetail>,
    pub recommendations: Vec<Recommendation>,
}

impl RunReport {
    pub fn build(results: &[FixtureResult], coverage: CoverageMap) -> Self {
        let failures: Vec<FailureDetail> = results
            .iter()
            .filter(|r| !r.passed())
            .map(|r| FailureDetail {
                fixture: r.name().to_string(),
                execution_error: (!r.execution.success())
                    .then(|| r.execution.error.clone().unwrap_or_else(|| "no diagnostic".to_string())),
                issues: r.validation.messages(),
            })
            .collect();

        let mut recommendations: Vec<Recommendation> = coverage
            .empty_features()
            .into_iter()
            .map(Recommendation::AddTests)
            .collect();
        if !failures.is_empty() {
            recommendations.push(Recommendation::FixFailingTests);
            recommendations.push(Recommendation::ValidateGeneration);
        }

        Self {
            total: results.len(),
            passed: results.len() - failures.len(),
            failed: failures.len(),
            coverage,
            failures,
            recommendations,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Percentage of passing fixtures; 0.0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<String> = vec![
            "CMake Nix Generator Test Report".to_string(),
            "=".repeat(50),
            format!("Total Tests: {}", self.total),
            format!("Passed: {}", self.passed),
            format!("Failed: {}", self.failed),
            format!("Success Rate: {:.1}%", self.success_rate()),
            String::new(),
            "Feature Coverage Analysis".to_string(),
            "-".repeat(30),
        ];

        for (id, fixtures) in self.coverage.iter() {
            let name = features::as_str(id);
            if fixtures.is_empty() {
                lines.push(format!("❌ {}: No tests found", name));
            } else {
                lines.push(format!("✅ {}: {} tests ({})", name, fixtures.len(), fixtures.join(", ")));
            }
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failed Tests Details".to_string());
            lines.push("-".repeat(25));
            for failure in &self.failures {
                lines.push(String::new());
                lines.push(format!("❌ {}:", failure.fixture));
                if let Some(error) = &failure.execution_error {
                    lines.push(format!("   Execution Error: {}", error.trim_end()));
                }
                if !failure.issues.is_empty() {
                    lines.push(format!("   Nix Issues: {}", failure.issues.join(", ")));
                }
            }
        }

        lines.push(String::new());
        lines.push("Recommendations".to_string());
        lines.push("-".repeat(15));

        let (coverage, actions): (Vec<&Recommendation>, Vec<&Recommendation>) = self
            .recommendations
            .iter()
            .partition(|r| matches!(r, Recommendation::AddTests(_)));
        if !coverage.is_empty() {
            lines.push("Missing Test Coverage:".to_string());
            lines.extend(coverage.iter().map(|r| format!("  - {}", r.text())));
        }
        if !actions.is_empty() {
            if !coverage.is_empty() {
                lines.push(String::new());
            }
            lines.push("Immediate Actions Required:".to_string());
            lines.extend(actions.iter().map(|r| format!("  - {}", r.text())));
        }
        if self.recommendations.is_empty() {
            lines.push("  - None".to_string());
        }

        lines.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactIssue;
    use crate::runner::ExecutionStatus;

    fn result(name: &str, status: ExecutionStatus, error: Option<&str>, issues: Vec<ArtifactIssue>) -> FixtureResult {
        FixtureResult {
            path: PathBuf::from("/suite").join(name),
            execution: ExecutionOutcome {
                fixture: name.to_string(),
                status,
                stdout: String::new(),
                error: error.map(str::to_string),
            },
            validation: ValidationOutcome {
                fixture: name.to_string(),
                artifact: None,
                issues,
            },
        }
    }

    #[test]
    fn test_passed_needs_execution_and_validation() {
        let ok = result("test_ok", ExecutionStatus::Succeeded, None, vec![]);
        let invalid = result(
            "test_invalid",
            ExecutionStatus::Succeeded,
            None,
            vec![ArtifactIssue::SyntaxError("bad".to_string())],
        );
        let broken = result("test_broken", ExecutionStatus::Failed, Some("boom"), vec![]);

        let report = RunReport::build(&[ok, invalid, broken], CoverageMap::new());
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total, report.passed + report.failed);

        assert_eq!(report.failures[0].execution_error, None);
        assert_eq!(report.failures[0].issues, vec!["Nix syntax error: bad"]);
        assert_eq!(report.failures[1].execution_error.as_deref(), Some("boom"));
        assert!(report.failures[1].issues.is_empty());
    }

    #[test]
    fn test_recommendation_priority() {
        let mut coverage = CoverageMap::new();
        for feature in nixgen_core::features::FEATURES {
            if feature.id != FeatureId::Subdirectories {
                coverage.record("test_all", &[feature.id]);
            }
        }
        let failing = result("test_all", ExecutionStatus::TimedOut, Some("Test timed out after 300 seconds"), vec![]);

        let report = RunReport::build(&[failing], coverage);
        assert_eq!(
            report.recommendations,
            vec![
                Recommendation::AddTests(FeatureId::Subdirectories),
                Recommendation::FixFailingTests,
                Recommendation::ValidateGeneration,
            ]
        );
    }

    #[test]
    fn test_empty_run() {
        let report = RunReport::build(&[], CoverageMap::new());
        assert!(report.all_passed());
        assert_eq!(report.success_rate(), 0.0);
        assert!(report.render().contains("Success Rate: 0.0%"));
        assert!(!report.render().contains("Failed Tests Details"));
    }

    #[test]
    fn test_rate_has_one_decimal() {
        let results = vec![
            result("test_a", ExecutionStatus::Succeeded, None, vec![]),
            result("test_b", ExecutionStatus::Failed, Some("x"), vec![]),
            result("test_c", ExecutionStatus::Succeeded, None, vec![]),
        ];
        let report = RunReport::build(&results, CoverageMap::new());
        assert!(report.render().contains("Success Rate: 66.7%"));
    }
}
