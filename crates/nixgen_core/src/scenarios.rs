//! Scenario categories the fixture suite is expected to cover.
//!
//! Coverage here is decided purely by fixture *names*: a category is covered when some fixture name contains
//! one of its markers. This is deliberately coarse and independent of what coverage analysis found in the
//! configuration text.

/// Stable identifier for every scenario category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    LargeProjects,
    ErrorHandling,
    MixedLanguage,
    Performance,
}

/// Metadata for a scenario category.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioInfo {
    pub id: ScenarioId,
    /// Substrings that mark a fixture name as belonging to the category.
    pub markers: &'static [&'static str],
    /// Gap entry emitted when no fixture name matches.
    pub gap: &'static str,
}

/// Registry of scenario categories, in gap-report order.
pub const SCENARIOS: &[ScenarioInfo] = &[
    ScenarioInfo {
        id: ScenarioId::LargeProjects,
        markers: &["large", "many"],
        gap: "Large project tests",
    },
    ScenarioInfo {
        id: ScenarioId::ErrorHandling,
        markers: &["error", "invalid"],
        gap: "Error handling tests",
    },
    ScenarioInfo {
        id: ScenarioId::MixedLanguage,
        markers: &["mixed"],
        gap: "Mixed language tests",
    },
    ScenarioInfo {
        id: ScenarioId::Performance,
        markers: &["performance"],
        gap: "Performance tests",
    },
];

/// Check whether a single fixture name carries one of the category's markers.
pub fn name_matches(info: &ScenarioInfo, name: &str) -> bool {
    info.markers.iter().any(|marker| name.contains(marker))
}

/// Return the categories no fixture name covers, in table order.
///
/// ## Examples
/// ```rust
/// use nixgen_core::scenarios::{missing_scenarios, ScenarioId};
///
/// let missing = missing_scenarios(&["test_mixed_language", "test_performance_large"]);
/// assert_eq!(missing, vec![ScenarioId::ErrorHandling]);
/// ```
pub fn missing_scenarios<S: AsRef<str>>(names: &[S]) -> Vec<ScenarioId> {
    SCENARIOS
        .iter()
        .filter(|info| !names.iter().any(|name| name_matches(info, name.as_ref())))
        .map(|info| info.id)
        .collect()
}

/// Return the gap entry text for a category.
pub fn gap_for(id: ScenarioId) -> &'static str {
    SCENARIOS
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.gap)
        .unwrap_or("Unknown scenario tests")
}
