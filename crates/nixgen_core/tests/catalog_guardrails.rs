use std::collections::HashSet;

use nixgen_core::artifact::{self, STRUCTURAL_CHECKS};
use nixgen_core::features::{self, FEATURES, FeatureId, SourceListing};
use nixgen_core::scenarios::SCENARIOS;

#[test]
fn feature_table_order_matches_discriminants() {
    for (index, info) in FEATURES.iter().enumerate() {
        assert_eq!(
            info.id as usize, index,
            "feature {:?} sits at index {} but info_for indexes by discriminant",
            info.id, index
        );
        assert_eq!(features::info_for(info.id).canonical, info.canonical);
    }
}

#[test]
fn feature_names_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for info in FEATURES {
        assert!(seen.insert(info.canonical), "duplicate feature name {:?}", info.canonical);
        assert_eq!(features::from_str(info.canonical), Some(info.id));
        assert_eq!(features::as_str(info.id), info.canonical);
        assert!(!info.description.is_empty(), "feature {:?} lacks a description", info.id);
        assert!(
            info.canonical.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
            "feature name {:?} is not snake_case",
            info.canonical
        );
    }
}

#[test]
fn unknown_feature_name_is_rejected() {
    assert_eq!(features::from_str("executable"), None);
    assert_eq!(features::from_str(""), None);
}

#[test]
fn critical_features_are_catalog_members() {
    let critical: Vec<FeatureId> = features::critical_features().collect();
    assert!(!critical.is_empty());
    for id in critical {
        assert!(FEATURES.iter().any(|f| f.id == id && f.critical));
    }
}

#[test]
fn classification_only_yields_catalog_features() {
    let text = "add_executable(a a.c)\nadd_library(b SHARED b.c)\nadd_library(c c.c)\nfind_package(ZLIB)\n\
                add_subdirectory(sub)\nadd_custom_command(OUTPUT x)\ntarget_link_libraries(a b)\n\
                find_library(M m)\ntry_compile(R ${CMAKE_BINARY_DIR} t.c)\nset(CMAKE_BUILD_TYPE Release)";
    let listing = SourceListing { sources: 4, headers: 2 };
    let found = features::features_for(text, &listing);
    assert_eq!(found.len(), FEATURES.len(), "every feature should fire: {:?}", found);
}

#[test]
fn structural_issue_texts_unique() {
    let mut seen = HashSet::new();
    for check in STRUCTURAL_CHECKS {
        assert!(seen.insert(check.issue), "duplicate issue text {:?}", check.issue);
        assert_eq!(artifact::issue_for(check.id), check.issue);
    }
}

#[test]
fn scenario_markers_are_lowercase_and_nonempty() {
    for info in SCENARIOS {
        assert!(!info.markers.is_empty(), "scenario {:?} has no markers", info.id);
        for marker in info.markers {
            assert_eq!(*marker, marker.to_lowercase());
        }
    }
}
