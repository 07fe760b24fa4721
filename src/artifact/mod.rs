//! Artifact validation
//!
//! Locates a fixture's generated build descriptor and checks it. Structural rules come from
//! [`nixgen_core::artifact`]; the grammar check is delegated to a [`SyntaxChecker`].
//!
//! Validation is independent of execution: it runs for every fixture, including ones whose build failed, since a
//! descriptor may survive from an earlier partial run.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod syntax;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use nixgen_core::artifact::{self as rules, StructuralCheckId};

use crate::config::ValidatorConfig;
use crate::discovery::Fixture;

pub use syntax::{NixInstantiateChecker, SyntaxChecker, SyntaxVerdict};

/// One problem found with a fixture's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactIssue {
    /// No descriptor at any lookup location
    Missing { descriptor: String },
    Unreadable(String),
    Structural(StructuralCheckId),
    SyntaxError(String),
    /// The checker could not be run; distinct from a rejection
    CheckerUnavailable { checker: String, reason: String },
}

impl fmt::Display for ArtifactIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactIssue::Missing { descriptor } => write!(f, "No {} generated (artifact missing)", descriptor),
            ArtifactIssue::Unreadable(e) => write!(f, "Could not read Nix file: {}", e),
            ArtifactIssue::Structural(id) => write!(f, "{}", rules::issue_for(*id)),
            ArtifactIssue::SyntaxError(diagnostic) => write!(f, "Nix syntax error: {}", diagnostic),
            ArtifactIssue::CheckerUnavailable { checker, reason } => {
                write!(f, "Could not validate Nix syntax ({} not available): {}", checker, reason)
            }
        }
    }
}

/// Result of validating one fixture's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub fixture: String,
    /// Descriptor that was checked, if one was found
    pub artifact: Option<PathBuf>,
    pub issues: Vec<ArtifactIssue>,
}

impl ValidationOutcome {
    pub fn valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue texts in discovery order
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

pub struct ArtifactValidator<C: SyntaxChecker = NixInstantiateChecker> {
    config: ValidatorConfig,
    checker: C,
}

impl ArtifactValidator<NixInstantiateChecker> {
    pub fn new(config: ValidatorConfig) -> Self {
        let checker = NixInstantiateChecker::new(&config);
        Self { config, checker }
    }
}

impl<C: SyntaxChecker> ArtifactValidator<C> {
    pub fn with_checker(config: ValidatorConfig, checker: C) -> Self {
        Self { config, checker }
    }

    /// Validate the descriptor of one fixture.
    ///
    /// A missing descriptor yields exactly one issue and nothing else is checked. Otherwise every structural rule
    /// and the syntax check run, and each failure adds one issue.
    #[tracing::instrument(skip_all, fields(fixture = %fixture.name))]
    pub fn validate(&self, fixture: &Fixture) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            fixture: fixture.name.clone(),
            artifact: None,
            issues: Vec::new(),
        };

        let Some(path) = self
            .config
            .descriptor_candidates(&fixture.dir)
            .into_iter()
            .find(|p| p.is_file())
        else {
            outcome.issues.push(ArtifactIssue::Missing {
                descriptor: self.config.descriptor_file.clone(),
            });
            return outcome;
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                outcome.issues.push(ArtifactIssue::Unreadable(e.to_string()));
                outcome.artifact = Some(path);
                return outcome;
            }
        };

        outcome.issues.extend(
            rules::structural_defects(&content)
                .into_iter()
                .map(ArtifactIssue::Structural),
        );

        match self.checker.check(&path) {
            SyntaxVerdict::Valid => {}
            SyntaxVerdict::Invalid(diagnostic) => outcome.issues.push(ArtifactIssue::SyntaxError(diagnostic)),
            SyntaxVerdict::Unavailable(reason) => {
                tracing::debug!("syntax checker unavailable: {}", reason);
                outcome.issues.push(ArtifactIssue::CheckerUnavailable {
                    checker: self.checker.name().to_string(),
                    reason,
                });
            }
        }

        outcome.artifact = Some(path);
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::Path;

    const GOOD: &str = "# Generated by CMake Nix Generator\nwith import <nixpkgs> {};\nstdenv.mkDerivation {\n  name = \"app\";\n}\n";

    struct FixedChecker {
        verdict: SyntaxVerdict,
        calls: Cell<usize>,
    }

    impl FixedChecker {
        fn new(verdict: SyntaxVerdict) -> Self {
            Self {
                verdict,
                calls: Cell::new(0),
            }
        }
    }

    impl SyntaxChecker for FixedChecker {
        fn name(&self) -> &str {
            "nix-instantiate"
        }

        fn check(&self, _path: &Path) -> SyntaxVerdict {
            self.calls.set(self.calls.get() + 1);
            self.verdict.clone()
        }
    }

    fn fixture_with(root: &Path, descriptor: Option<(&str, &str)>) -> Fixture {
        let dir = root.join("test_a");
        fs::create_dir_all(&dir).unwrap();
        if let Some((rel, text)) = descriptor {
            let path = dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, text).unwrap();
        }
        Fixture::from_dir(dir, &ValidatorConfig::default())
    }

    #[test]
    fn test_missing_artifact_is_the_only_issue() {
        let root = tempfile::tempdir().unwrap();
        let fixture = fixture_with(root.path(), None);
        let checker = FixedChecker::new(SyntaxVerdict::Invalid("never asked".to_string()));

        let outcome = ArtifactValidator::with_checker(ValidatorConfig::default(), &checker).validate(&fixture);

        assert!(!outcome.valid());
        assert_eq!(outcome.messages(), vec!["No default.nix generated (artifact missing)"]);
        assert_eq!(checker.calls.get(), 0);
    }

    #[test]
    fn test_well_formed_artifact_is_valid() {
        let root = tempfile::tempdir().unwrap();
        let fixture = fixture_with(root.path(), Some(("default.nix", GOOD)));
        let checker = FixedChecker::new(SyntaxVerdict::Valid);

        let outcome = ArtifactValidator::with_checker(ValidatorConfig::default(), &checker).validate(&fixture);

        assert!(outcome.valid(), "{:?}", outcome.issues);
        assert_eq!(outcome.artifact, Some(fixture.dir.join("default.nix")));
    }

    #[test]
    fn test_nested_build_dir_is_second_choice() {
        let root = tempfile::tempdir().unwrap();
        let fixture = fixture_with(root.path(), Some(("build/default.nix", GOOD)));

        let outcome = ArtifactValidator::with_checker(ValidatorConfig::default(), FixedChecker::new(SyntaxVerdict::Valid))
            .validate(&fixture);

        assert!(outcome.valid());
        assert_eq!(outcome.artifact, Some(fixture.dir.join("build/default.nix")));
    }

    #[test]
    fn test_every_defect_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let fixture = fixture_with(root.path(), Some(("default.nix", "let x = \"\"\"a\"\"\"; in x")));
        let checker = FixedChecker::new(SyntaxVerdict::Invalid("unexpected '\"'".to_string()));

        let outcome = ArtifactValidator::with_checker(ValidatorConfig::default(), &checker).validate(&fixture);

        assert_eq!(
            outcome.messages(),
            vec![
                "Missing generator header comment",
                "Missing nixpkgs import",
                "Nix file doesn't end with closing brace",
                "No stdenv.mkDerivation found",
                "Potential string escaping issue with triple quotes",
                "Nix syntax error: unexpected '\"'",
            ]
        );
    }

    #[test]
    fn test_unavailable_checker_is_distinct_and_invalid() {
        let root = tempfile::tempdir().unwrap();
        let fixture = fixture_with(root.path(), Some(("default.nix", GOOD)));
        let checker = FixedChecker::new(SyntaxVerdict::Unavailable("No such file or directory".to_string()));

        let outcome = ArtifactValidator::with_checker(ValidatorConfig::default(), &checker).validate(&fixture);

        assert!(!outcome.valid());
        assert_eq!(
            outcome.issues,
            vec![ArtifactIssue::CheckerUnavailable {
                checker: "nix-instantiate".to_string(),
                reason: "No such file or directory".to_string(),
            }]
        );
        assert!(!matches!(outcome.issues[0], ArtifactIssue::SyntaxError(_)));
    }
}
