//! Fixture discovery
//!
//! A fixture is an immediate subdirectory of the root whose name carries the configured prefix. Discovery
//! never recurses and returns fixtures sorted by name, so every later stage sees the same order.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ValidatorConfig;

/// Errors that make discovery impossible (the root itself is unusable).
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot resolve fixture root '{path}': {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read fixture root '{path}': {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One fixture directory, as found at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Directory name; unique within a run
    pub name: String,
    /// Absolute fixture directory
    pub dir: PathBuf,
    /// Build-configuration file (may not exist)
    pub config_path: PathBuf,
    /// Task-runner descriptor, if present
    pub task_runner: Option<PathBuf>,
    /// Shell-environment descriptor, if present
    pub shell_env: Option<PathBuf>,
    /// Prebuilt build descriptor, if present
    pub descriptor: Option<PathBuf>,
}

impl Fixture {
    /// Inspect a fixture directory and record which descriptors it carries.
    pub fn from_dir(dir: PathBuf, config: &ValidatorConfig) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let existing = |file: &str| Some(dir.join(file)).filter(|p| p.is_file());

        Self {
            config_path: dir.join(&config.config_file),
            task_runner: existing(&config.task_runner_file),
            shell_env: existing(&config.shell_file),
            descriptor: existing(&config.descriptor_file),
            name,
            dir,
        }
    }
}

/// Discover fixtures under `config.root`.
///
/// The root is canonicalized first, so fixture paths stay valid while the runner moves the working directory.
/// An empty result is not an error.
#[tracing::instrument(skip_all, fields(root = %config.root.display()))]
pub fn discover_fixtures(config: &ValidatorConfig) -> Result<Vec<Fixture>, DiscoveryError> {
    let root = fs::canonicalize(&config.root).map_err(|source| DiscoveryError::Root {
        path: config.root.clone(),
        source,
    })?;

    let mut dirs = fixture_dirs(&root, &config.fixture_prefix).map_err(|source| DiscoveryError::ReadRoot {
        path: root.clone(),
        source,
    })?;
    dirs.sort();

    let fixtures: Vec<Fixture> = dirs.into_iter().map(|dir| Fixture::from_dir(dir, config)).collect();
    tracing::debug!(count = fixtures.len(), "fixtures discovered");
    Ok(fixtures)
}

fn fixture_dirs(root: &Path, prefix: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(|n| n.starts_with(prefix)) {
            dirs.push(path);
        }
    }
    Ok(dirs)
}
