//! Static coverage analysis
//!
//! Reads each fixture's `CMakeLists.txt` and immediate file listing and sorts the fixture into feature buckets
//! using the catalog in [`nixgen_core::features`]. Nothing here depends on whether a fixture was ever built.

use std::fs;
use std::path::Path;

use nixgen_core::features::{self, FEATURES, FeatureId, SourceListing};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::discovery::Fixture;

/// Feature bucket → fixture names, in catalog order.
///
/// Every catalog feature has a bucket (possibly empty); no other keys exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMap {
    buckets: Vec<(FeatureId, Vec<String>)>,
}

impl Default for CoverageMap {
    fn default() -> Self {
        Self {
            buckets: FEATURES.iter().map(|f| (f.id, Vec::new())).collect(),
        }
    }
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fixture` to the bucket of every listed feature.
    pub fn record(&mut self, fixture: &str, found: &[FeatureId]) {
        for (id, members) in &mut self.buckets {
            if found.contains(id) {
                members.push(fixture.to_string());
            }
        }
    }

    /// Fixtures in one bucket.
    pub fn fixtures_for(&self, id: FeatureId) -> &[String] {
        self.buckets
            .iter()
            .find(|(bucket, _)| *bucket == id)
            .map(|(_, members)| members.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate buckets in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &[String])> {
        self.buckets.iter().map(|(id, members)| (*id, members.as_slice()))
    }

    /// Features no fixture exercises, in catalog order.
    pub fn empty_features(&self) -> Vec<FeatureId> {
        self.iter()
            .filter(|(_, members)| members.is_empty())
            .map(|(id, _)| id)
            .collect()
    }
}

impl Serialize for CoverageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (id, members) in &self.buckets {
            map.serialize_entry(features::as_str(*id), members)?;
        }
        map.end()
    }
}

/// Classify every fixture into a fresh coverage map.
///
/// Fixtures without a build-configuration file are skipped; unreadable ones are skipped with a warning.
#[tracing::instrument(skip_all, fields(fixtures = fixtures.len()))]
pub fn analyze_coverage(fixtures: &[Fixture]) -> CoverageMap {
    let mut coverage = CoverageMap::new();

    for fixture in fixtures {
        if !fixture.config_path.is_file() {
            tracing::debug!(fixture = %fixture.name, "no build configuration, skipping coverage");
            continue;
        }
        // Configs may not be UTF-8; every keyword is ASCII, so a lossy decode classifies the same.
        let bytes = match fs::read(&fixture.config_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(fixture = %fixture.name, "could not analyze {}: {}", fixture.config_path.display(), e);
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let listing = source_listing(&fixture.dir);
        let found = features::features_for(&text, &listing);
        coverage.record(&fixture.name, &found);
    }

    coverage
}

/// Count sources and headers among the directory's immediate files.
pub fn source_listing(dir: &Path) -> SourceListing {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("could not list {}: {}", dir.display(), e);
            return SourceListing::default();
        }
    };

    let names = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.file_name().to_string_lossy().into_owned());
    SourceListing::from_file_names(names)
}
