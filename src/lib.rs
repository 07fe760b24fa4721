#![forbid(unsafe_code)]
//! Test-suite validator for the CMake Nix generator
//!
//! Discovers the generator's `test_*` fixture directories, builds each one, checks the generated `default.nix`,
//! and reports which generator features the suite covers.
//!
//! ## Pipeline
//!
//! - [`discovery`] - find fixture directories
//! - [`runner`] - build and run one fixture under a timeout
//! - [`artifact`] - structural and syntax checks on the generated descriptor
//! - [`coverage`] - classify fixtures by the generator features they exercise
//! - [`report`] - aggregate results, gaps, console output and the JSON results file
//! - [`pipeline`] - ties the stages together
//!
//! The feature catalog and every other pure rule live in the `nixgen_core` crate.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli`, `runner`, `artifact`
//!   and `pipeline` modules enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod discovery;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod version;

pub use config::ValidatorConfig;
pub use discovery::{Fixture, discover_fixtures};
pub use pipeline::{RunError, RunOutcome, Validator};
