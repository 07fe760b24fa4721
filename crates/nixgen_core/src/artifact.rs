//! Structural rules for a generated `default.nix`.
//!
//! Each rule is a pure predicate over the file's text. Rules are independent: [`structural_defects`] evaluates
//! all of them and reports every failure, in table order.

/// Comment the generator writes as the first line of every descriptor.
pub const GENERATOR_HEADER: &str = "# Generated by CMake Nix Generator";

/// Bootstrap statement every descriptor must contain.
pub const NIXPKGS_IMPORT: &str = "with import <nixpkgs> {};";

/// Derivation constructor every descriptor must call.
pub const DERIVATION_CALL: &str = "stdenv.mkDerivation";

/// Python-style triple quote; its presence means a string was escaped for the wrong language.
pub const TRIPLE_QUOTE: &str = "\"\"\"";

/// Stable identifier for every structural rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralCheckId {
    GeneratorHeader,
    NixpkgsImport,
    ClosingBrace,
    Derivation,
    NoTripleQuotes,
}

/// Metadata for a structural rule.
#[derive(Debug, Clone, Copy)]
pub struct StructuralCheck {
    pub id: StructuralCheckId,
    /// User-facing issue text recorded when the rule fails.
    pub issue: &'static str,
    pub passes: fn(&str) -> bool,
}

/// Registry of structural rules, in evaluation order.
pub const STRUCTURAL_CHECKS: &[StructuralCheck] = &[
    StructuralCheck {
        id: StructuralCheckId::GeneratorHeader,
        issue: "Missing generator header comment",
        passes: |content| content.starts_with(GENERATOR_HEADER),
    },
    StructuralCheck {
        id: StructuralCheckId::NixpkgsImport,
        issue: "Missing nixpkgs import",
        passes: |content| content.contains(NIXPKGS_IMPORT),
    },
    StructuralCheck {
        id: StructuralCheckId::ClosingBrace,
        issue: "Nix file doesn't end with closing brace",
        passes: |content| content.trim().ends_with('}'),
    },
    StructuralCheck {
        id: StructuralCheckId::Derivation,
        issue: "No stdenv.mkDerivation found",
        passes: |content| content.contains(DERIVATION_CALL),
    },
    StructuralCheck {
        id: StructuralCheckId::NoTripleQuotes,
        issue: "Potential string escaping issue with triple quotes",
        passes: |content| !content.contains(TRIPLE_QUOTE),
    },
];

/// Return the issue text for a rule.
pub fn issue_for(id: StructuralCheckId) -> &'static str {
    STRUCTURAL_CHECKS
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.issue)
        .unwrap_or("Unknown structural check")
}

/// Evaluate every rule and return the failing ones, in table order.
///
/// ## Examples
/// ```rust
/// use nixgen_core::artifact::{structural_defects, StructuralCheckId};
///
/// let defects = structural_defects("{ }");
/// assert!(defects.contains(&StructuralCheckId::GeneratorHeader));
/// assert!(!defects.contains(&StructuralCheckId::ClosingBrace));
/// ```
pub fn structural_defects(content: &str) -> Vec<StructuralCheckId> {
    STRUCTURAL_CHECKS
        .iter()
        .filter(|check| !(check.passes)(content))
        .map(|check| check.id)
        .collect()
}
