//! Invocation strategy selection
//!
//! Each fixture is built in exactly one way, picked once by a fixed priority:
//!
//! 1. `justfile` present: run the fixture's `run` recipe through the task runner, from the root
//! 2. `shell.nix` present: build inside the shell environment
//! 3. `default.nix` present: build it directly
//! 4. otherwise: generate `default.nix` with the generator, then build it
//!
//! Resolution is pure over the discovered [`Fixture`] plus the generator's existence, so it can be checked
//! without running anything.

use std::path::{Path, PathBuf};

use crate::config::ValidatorConfig;
use crate::discovery::Fixture;

use super::process::Invocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationStrategy {
    /// `just <fixture>::run`, run from the fixture root
    TaskRunner { root: PathBuf },
    /// `nix-shell --run "just dev"` in the fixture dir
    ShellEnvironment,
    /// `nix-build` on an existing `default.nix`
    PrebuiltDescriptor,
    /// Run the generator first, then `nix-build`
    GenerateThenBuild { generator: PathBuf },
}

impl InvocationStrategy {
    /// Pick the strategy for a fixture, or `None` when nothing could produce a build target.
    pub fn resolve(fixture: &Fixture, config: &ValidatorConfig) -> Option<Self> {
        if fixture.task_runner.is_some() {
            let root = fixture.dir.parent().unwrap_or(&fixture.dir).to_path_buf();
            return Some(Self::TaskRunner { root });
        }
        if fixture.shell_env.is_some() {
            return Some(Self::ShellEnvironment);
        }
        if fixture.descriptor.is_some() {
            return Some(Self::PrebuiltDescriptor);
        }

        // The generator runs from inside the fixture dir, so a relative path must be pinned first.
        let generator = config.generator_path();
        let generator = std::path::absolute(&generator).unwrap_or(generator);
        if generator.is_file() {
            Some(Self::GenerateThenBuild { generator })
        } else {
            tracing::debug!(fixture = %fixture.name, generator = %generator.display(), "generator not found");
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TaskRunner { .. } => "task-runner",
            Self::ShellEnvironment => "shell-environment",
            Self::PrebuiltDescriptor => "prebuilt-descriptor",
            Self::GenerateThenBuild { .. } => "generate-then-build",
        }
    }

    /// Directory the invocation runs in.
    pub fn working_dir<'a>(&'a self, fixture: &'a Fixture) -> &'a Path {
        match self {
            Self::TaskRunner { root } => root,
            _ => &fixture.dir,
        }
    }

    /// The generator step, if this strategy has one.
    pub fn generate_invocation(&self, config: &ValidatorConfig) -> Option<Invocation> {
        match self {
            Self::GenerateThenBuild { generator } => Some(Invocation::new(
                generator.clone(),
                config.generator_args.clone(),
                config.generator_timeout,
            )),
            _ => None,
        }
    }

    /// The build-and-run step.
    pub fn build_invocation(&self, fixture: &Fixture, config: &ValidatorConfig) -> Invocation {
        match self {
            Self::TaskRunner { .. } => Invocation::new(
                &config.task_runner,
                vec![format!("{}::run", fixture.name)],
                config.build_timeout,
            ),
            Self::ShellEnvironment => Invocation::new(
                &config.shell_tool,
                vec!["--run".to_string(), config.shell_command.clone()],
                config.build_timeout,
            ),
            Self::PrebuiltDescriptor | Self::GenerateThenBuild { .. } => {
                Invocation::new(&config.build_tool, Vec::new(), config.build_timeout)
            }
        }
    }
}
