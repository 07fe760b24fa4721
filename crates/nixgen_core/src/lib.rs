//! Provide the pure, deterministic vocabulary of the Nix generator test validator.
//!
//! This crate is the validator's "semantic core": it knows which generator features exist, how a fixture's
//! `CMakeLists.txt` text maps onto them, which structural rules a generated `default.nix` must satisfy, and which
//! scenario categories the fixture suite is expected to cover.
//!
//! ## Notes
//!
//! - **No IO**: nothing here touches the filesystem, spawns processes or reads the environment. Callers hand in
//!   text and file names; the root crate owns all side effects.
//! - Every catalog is a `const` table keyed by a stable id, so reports and JSON output always list entries in the
//!   same order.
//!
//! ## Examples
//! ```rust
//! use nixgen_core::features::{self, FeatureId, SourceListing};
//!
//! let listing = SourceListing::from_file_names(["main.c"]);
//! let found = features::features_for("add_executable(app main.c)", &listing);
//! assert!(found.contains(&FeatureId::Executables));
//! assert!(found.contains(&FeatureId::BasicCompilation));
//! ```

pub mod artifact;
pub mod features;
pub mod scan;
pub mod scenarios;
