//! Coverage gap analysis
//!
//! Two independent checks: critical catalog features with an empty bucket, and scenario categories that no
//! fixture *name* mentions. The scenario check never looks at coverage, so a mixed-language fixture named
//! `test_interop` still leaves the mixed-language gap open.

use std::fmt;

use nixgen_core::features::{self, FeatureId};
use nixgen_core::scenarios::{self, ScenarioId};

use crate::coverage::CoverageMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    Feature(FeatureId),
    Scenario(ScenarioId),
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::Feature(id) => write!(f, "Missing {} tests", features::as_str(*id)),
            Gap::Scenario(id) => f.write_str(scenarios::gap_for(*id)),
        }
    }
}

/// Feature gaps first (catalog order), then scenario gaps (catalog order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapList {
    pub gaps: Vec<Gap>,
}

impl GapList {
    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Test Coverage Gaps\n");
        out.push_str(&"-".repeat(20));
        for gap in &self.gaps {
            out.push_str("\n- ");
            out.push_str(&gap.to_string());
        }
        out
    }
}

pub fn identify_gaps<S: AsRef<str>>(coverage: &CoverageMap, fixture_names: &[S]) -> GapList {
    let feature_gaps = features::critical_features()
        .filter(|id| coverage.fixtures_for(*id).is_empty())
        .map(Gap::Feature);
    let scenario_gaps = scenarios::missing_scenarios(fixture_names).into_iter().map(Gap::Scenario);

    GapList {
        gaps: feature_gaps.chain(scenario_gaps).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_suite_has_every_gap() {
        let gaps = identify_gaps::<&str>(&CoverageMap::new(), &[]);
        let text: Vec<String> = gaps.gaps.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            vec![
                "Missing external_libraries tests",
                "Missing compiler_detection tests",
                "Missing configuration_types tests",
                "Large project tests",
                "Error handling tests",
                "Mixed language tests",
                "Performance tests",
            ]
        );
    }

    #[test]
    fn test_scenarios_are_name_based() {
        let mut coverage = CoverageMap::new();
        coverage.record("test_interop", &[FeatureId::CompilerDetection]);
        let gaps = identify_gaps(&coverage, &["test_interop", "test_many_files", "test_invalid_cmake"]);

        assert!(!gaps.gaps.contains(&Gap::Feature(FeatureId::CompilerDetection)));
        assert!(gaps.gaps.contains(&Gap::Scenario(ScenarioId::MixedLanguage)));
        assert!(!gaps.gaps.contains(&Gap::Scenario(ScenarioId::LargeProjects)));
        assert!(!gaps.gaps.contains(&Gap::Scenario(ScenarioId::ErrorHandling)));
    }

    #[test]
    fn test_render() {
        let gaps = GapList {
            gaps: vec![Gap::Feature(FeatureId::ExternalLibraries), Gap::Scenario(ScenarioId::Performance)],
        };
        assert_eq!(
            gaps.render(),
            "Test Coverage Gaps\n--------------------\n- Missing external_libraries tests\n- Performance tests"
        );
    }
}
