//! Define the generator feature catalog used for coverage analysis.
//!
//! This module is the single source of truth for feature buckets: a stable identifier ([`FeatureId`]) plus a
//! const metadata table ([`FEATURES`]) holding each feature's canonical name, description, criticality and the
//! pure predicate that decides whether a fixture exercises it.
//!
//! ## Notes
//! - Predicates come in two flavors. [`FeatureRule::Config`] looks at normalized `CMakeLists.txt` text,
//!   [`FeatureRule::Sources`] looks at the counted file listing of the fixture directory.
//! - The table order is the report order. [`info_for`] indexes the table by discriminant, which the guardrail
//!   tests pin down.
//!
//! ## Examples
//! ```rust
//! use nixgen_core::features::{self, FeatureId};
//!
//! assert_eq!(features::from_str("find_package"), Some(FeatureId::FindPackage));
//! assert_eq!(features::as_str(FeatureId::FindPackage), "find_package");
//! assert!(features::info_for(FeatureId::CompilerDetection).critical);
//! ```

use crate::scan::{self, LibraryKind};

/// Stable identifier for every feature bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureId {
    BasicCompilation,
    HeaderDependencies,
    SharedLibraries,
    StaticLibraries,
    Executables,
    Subdirectories,
    FindPackage,
    CustomCommands,
    ExternalLibraries,
    CompilerDetection,
    TargetLinking,
    ConfigurationTypes,
    MultiFileProjects,
}

/// File extensions counted as compilable sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx"];

/// File extensions counted as headers.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx"];

/// Counted file listing of one fixture directory (immediate entries only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceListing {
    pub sources: usize,
    pub headers: usize,
}

impl SourceListing {
    /// Count sources and headers among plain file names.
    ///
    /// ## Examples
    /// ```rust
    /// use nixgen_core::features::SourceListing;
    ///
    /// let listing = SourceListing::from_file_names(["main.c", "util.cpp", "util.h", "README.md"]);
    /// assert_eq!(listing, SourceListing { sources: 2, headers: 1 });
    /// ```
    pub fn from_file_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut listing = SourceListing::default();
        for name in names {
            let Some((_, ext)) = name.as_ref().rsplit_once('.') else {
                continue;
            };
            if SOURCE_EXTENSIONS.contains(&ext) {
                listing.sources += 1;
            } else if HEADER_EXTENSIONS.contains(&ext) {
                listing.headers += 1;
            }
        }
        listing
    }
}

/// How a feature is detected.
#[derive(Debug, Clone, Copy)]
pub enum FeatureRule {
    /// Predicate over normalized configuration text.
    Config(fn(&str) -> bool),
    /// Predicate over the fixture's counted file listing.
    Sources(fn(&SourceListing) -> bool),
}

/// Metadata for a feature bucket.
#[derive(Debug, Clone, Copy)]
pub struct FeatureInfo {
    pub id: FeatureId,
    pub canonical: &'static str,
    pub description: &'static str,
    /// An empty bucket for a critical feature is reported as a coverage gap.
    pub critical: bool,
    pub rule: FeatureRule,
}

const fn info(
    id: FeatureId,
    canonical: &'static str,
    description: &'static str,
    critical: bool,
    rule: FeatureRule,
) -> FeatureInfo {
    FeatureInfo {
        id,
        canonical,
        description,
        critical,
        rule,
    }
}

/// Registry of all feature buckets, in report order.
pub const FEATURES: &[FeatureInfo] = &[
    info(
        FeatureId::BasicCompilation,
        "basic_compilation",
        "At least one compilable source next to the build configuration.",
        false,
        FeatureRule::Sources(|l| l.sources > 0),
    ),
    info(
        FeatureId::HeaderDependencies,
        "header_dependencies",
        "At least one header file next to the build configuration.",
        false,
        FeatureRule::Sources(|l| l.headers > 0),
    ),
    info(
        FeatureId::SharedLibraries,
        "shared_libraries",
        "An add_library call typed SHARED or MODULE.",
        false,
        FeatureRule::Config(declares_shared_library),
    ),
    info(
        FeatureId::StaticLibraries,
        "static_libraries",
        "An add_library call typed STATIC, or a built library with CMake's default type.",
        false,
        FeatureRule::Config(declares_static_library),
    ),
    info(
        FeatureId::Executables,
        "executables",
        "An add_executable call.",
        false,
        FeatureRule::Config(|t| t.contains("add_executable")),
    ),
    info(
        FeatureId::Subdirectories,
        "subdirectories",
        "Composition through add_subdirectory.",
        false,
        FeatureRule::Config(|t| t.contains("add_subdirectory")),
    ),
    info(
        FeatureId::FindPackage,
        "find_package",
        "External package lookup through find_package.",
        false,
        FeatureRule::Config(|t| t.contains("find_package")),
    ),
    info(
        FeatureId::CustomCommands,
        "custom_commands",
        "Custom build steps through add_custom_command or add_custom_target.",
        false,
        FeatureRule::Config(|t| t.contains("add_custom_command") || t.contains("add_custom_target")),
    ),
    info(
        FeatureId::ExternalLibraries,
        "external_libraries",
        "Prebuilt libraries pulled in through find_library, pkg-config or IMPORTED targets.",
        true,
        FeatureRule::Config(uses_external_library),
    ),
    info(
        FeatureId::CompilerDetection,
        "compiler_detection",
        "Compiler identification or flag probing.",
        true,
        FeatureRule::Config(probes_compiler),
    ),
    info(
        FeatureId::TargetLinking,
        "target_linking",
        "Link dependencies declared through target_link_libraries.",
        false,
        FeatureRule::Config(|t| t.contains("target_link_libraries")),
    ),
    info(
        FeatureId::ConfigurationTypes,
        "configuration_types",
        "Build types or per-configuration generator expressions.",
        true,
        FeatureRule::Config(|t| {
            t.contains("cmake_configuration_types") || t.contains("cmake_build_type") || t.contains("$<config:")
        }),
    ),
    info(
        FeatureId::MultiFileProjects,
        "multi_file_projects",
        "More than one compilable source next to the build configuration.",
        false,
        FeatureRule::Sources(|l| l.sources > 1),
    ),
];

fn declares_shared_library(text: &str) -> bool {
    scan::library_declarations(text)
        .iter()
        .any(|d| matches!(d.kind, Some(LibraryKind::Shared | LibraryKind::Module)))
}

fn declares_static_library(text: &str) -> bool {
    scan::library_declarations(text)
        .iter()
        .any(|d| d.kind == Some(LibraryKind::Static) || (d.kind.is_none() && d.is_built()))
}

fn uses_external_library(text: &str) -> bool {
    text.contains("find_library")
        || text.contains("pkg_check_modules")
        || scan::library_declarations(text)
            .iter()
            .any(|d| d.kind == Some(LibraryKind::Imported))
}

const COMPILER_PROBES: &[&str] = &[
    "check_c_compiler_flag",
    "check_cxx_compiler_flag",
    "cmake_c_compiler_id",
    "cmake_cxx_compiler_id",
    "try_compile",
];

fn probes_compiler(text: &str) -> bool {
    COMPILER_PROBES.iter().any(|probe| text.contains(probe))
}

/// Return the canonical bucket name for a feature.
pub fn as_str(id: FeatureId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a feature.
pub fn info_for(id: FeatureId) -> &'static FeatureInfo {
    &FEATURES[id as usize]
}

/// Resolve a canonical bucket name.
pub fn from_str(name: &str) -> Option<FeatureId> {
    FEATURES.iter().find(|f| f.canonical == name).map(|f| f.id)
}

/// Iterate the features whose empty bucket counts as a coverage gap, in catalog order.
pub fn critical_features() -> impl Iterator<Item = FeatureId> {
    FEATURES.iter().filter(|f| f.critical).map(|f| f.id)
}

/// Evaluate one feature against already-normalized configuration text and a file listing.
pub fn matches(id: FeatureId, normalized: &str, listing: &SourceListing) -> bool {
    match info_for(id).rule {
        FeatureRule::Config(predicate) => predicate(normalized),
        FeatureRule::Sources(predicate) => predicate(listing),
    }
}

/// Classify a fixture: every feature it exercises, in catalog order.
///
/// `config_text` is taken raw and normalized here, so callers can pass file contents straight through.
pub fn features_for(config_text: &str, listing: &SourceListing) -> Vec<FeatureId> {
    let normalized = scan::normalize(config_text);
    FEATURES
        .iter()
        .filter(|f| matches(f.id, &normalized, listing))
        .map(|f| f.id)
        .collect()
}
