//! Validator configuration
//!
//! Tool names, descriptor file names and timeouts follow the layout of the CMake source tree's Nix generator
//! fixtures. Everything is overridable through `with_*` builders; the CLI maps its flags onto those.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Validator configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Directory whose immediate subdirectories are the fixtures
    pub root: PathBuf,
    /// Directory-name prefix that marks a fixture
    pub fixture_prefix: String,
    /// Build-configuration file read by coverage analysis and the generator
    pub config_file: String,
    /// Per-fixture task-runner descriptor
    pub task_runner_file: String,
    /// Prebuilt shell-environment descriptor
    pub shell_file: String,
    /// Build descriptor produced by the generator
    pub descriptor_file: String,
    /// Nested build-output directory checked for the descriptor after the fixture dir
    pub build_subdir: String,
    /// Generator binary; `None` means `<root>/bin/cmake`
    pub generator: Option<PathBuf>,
    /// Arguments passed to the generator (fixture dir is the working directory)
    pub generator_args: Vec<String>,
    pub task_runner: String,
    pub shell_tool: String,
    /// Command run inside the shell environment
    pub shell_command: String,
    pub build_tool: String,
    pub syntax_checker: String,
    pub generator_timeout: Duration,
    pub build_timeout: Duration,
    pub syntax_timeout: Duration,
    /// Where the per-fixture JSON results are written
    pub results_path: PathBuf,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            fixture_prefix: "test_".to_string(),
            config_file: "CMakeLists.txt".to_string(),
            task_runner_file: "justfile".to_string(),
            shell_file: "shell.nix".to_string(),
            descriptor_file: "default.nix".to_string(),
            build_subdir: "build".to_string(),
            generator: None,
            generator_args: vec![
                "-G".to_string(),
                "Nix".to_string(),
                "-DCMAKE_MAKE_PROGRAM=nix-build".to_string(),
                ".".to_string(),
            ],
            task_runner: "just".to_string(),
            shell_tool: "nix-shell".to_string(),
            shell_command: "just dev".to_string(),
            build_tool: "nix-build".to_string(),
            syntax_checker: "nix-instantiate".to_string(),
            generator_timeout: Duration::from_secs(60),
            build_timeout: Duration::from_secs(300),
            syntax_timeout: Duration::from_secs(30),
            results_path: PathBuf::from("test_results.json"),
        }
    }
}

impl ValidatorConfig {
    /// Create a config for the given fixture root with default settings
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Set the fixture directory prefix
    pub fn with_fixture_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fixture_prefix = prefix.into();
        self
    }

    /// Set an explicit generator binary
    pub fn with_generator(mut self, generator: impl Into<PathBuf>) -> Self {
        self.generator = Some(generator.into());
        self
    }

    /// Set the generator timeout
    pub fn with_generator_timeout(mut self, timeout: Duration) -> Self {
        self.generator_timeout = timeout;
        self
    }

    /// Set the build/run timeout
    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }

    /// Set the syntax-checker timeout
    pub fn with_syntax_timeout(mut self, timeout: Duration) -> Self {
        self.syntax_timeout = timeout;
        self
    }

    /// Set the results file location
    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Set the syntax checker binary
    pub fn with_syntax_checker(mut self, program: impl Into<String>) -> Self {
        self.syntax_checker = program.into();
        self
    }

    /// Generator binary, resolved against `root` when not set explicitly.
    pub fn generator_path(&self) -> PathBuf {
        self.generator
            .clone()
            .unwrap_or_else(|| self.root.join("bin").join("cmake"))
    }

    /// Descriptor locations for a fixture, in lookup order.
    pub fn descriptor_candidates(&self, fixture_dir: &Path) -> [PathBuf; 2] {
        [
            fixture_dir.join(&self.descriptor_file),
            fixture_dir.join(&self.build_subdir).join(&self.descriptor_file),
        ]
    }
}
