//! Harness configuration and fixture naming.

use std::path::PathBuf;
use std::time::Duration;

use harness_exec::CommandSpec;
use regex::Regex;

/// Default directory holding fixtures and the wrapper script.
pub const DEFAULT_FIXTURES_DIR: &str = ".";

/// Default project directory handed to the build, relative to the fixtures directory.
pub const DEFAULT_PROJECT_DIR: &str = "..";

/// Default instrumentation wrapper, relative to the fixtures directory.
pub const DEFAULT_WRAPPER: &str = "./valgrind.sh";

/// Default build program, invoked as `make -C <project_dir>`.
pub const DEFAULT_BUILD_PROGRAM: &str = "make";

/// Default static-analysis wrapper around the build.
pub const DEFAULT_ANALYSIS_PROGRAM: &str = "scan-build";

/// Memory checker line that means nothing leaked and no errors occurred.
pub const DEFAULT_MEMORY_MARKER: &str = "ERROR SUMMARY: 0 errors from 0 contexts";

/// Static analyzer line that means the build is clean.
pub const DEFAULT_ANALYSIS_MARKER: &str = "No bugs found.";

/// Default per-fixture wall-clock ceiling in seconds.
pub const DEFAULT_TIMEOUT_SEC: u64 = 300;

/// Naming convention pairing fixture inputs with golden outputs.
///
/// `test-in-<id>.rkt` pairs with `test-out-<id>.txt` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureNaming {
    pub input_prefix: String,
    pub input_suffix: String,
    pub expected_prefix: String,
    pub expected_suffix: String,
}

impl Default for FixtureNaming {
    fn default() -> Self {
        Self {
            input_prefix: "test-in-".to_string(),
            input_suffix: ".rkt".to_string(),
            expected_prefix: "test-out-".to_string(),
            expected_suffix: ".txt".to_string(),
        }
    }
}

impl FixtureNaming {
    /// Anchored pattern whose single capture group is the fixture id.
    pub fn matcher(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(
            "^{}(.*){}$",
            regex::escape(&self.input_prefix),
            regex::escape(&self.input_suffix)
        ))
    }

    /// Golden output file name for a fixture id.
    pub fn expected_name(&self, id: &str) -> String {
        format!("{}{}{}", self.expected_prefix, id, self.expected_suffix)
    }
}

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory scanned for fixtures; also the working directory of every command.
    pub fixtures_dir: PathBuf,
    pub project_dir: PathBuf,
    pub wrapper: PathBuf,
    pub timeout: Option<Duration>,
    pub static_analysis: bool,
    pub memory_marker: String,
    pub analysis_marker: String,
    pub naming: FixtureNaming,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self {
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            project_dir: PathBuf::from(DEFAULT_PROJECT_DIR),
            wrapper: PathBuf::from(DEFAULT_WRAPPER),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SEC)),
            static_analysis: true,
            memory_marker: DEFAULT_MEMORY_MARKER.to_string(),
            analysis_marker: DEFAULT_ANALYSIS_MARKER.to_string(),
            naming: FixtureNaming::default(),
        }
    }

    /// Builder: set fixtures_dir.
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Builder: set project_dir.
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    /// Builder: set wrapper.
    pub fn with_wrapper(mut self, wrapper: impl Into<PathBuf>) -> Self {
        self.wrapper = wrapper.into();
        self
    }

    /// Builder: set timeout (`None` waits forever).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: enable or disable the static-analysis build.
    pub fn with_static_analysis(mut self, enabled: bool) -> Self {
        self.static_analysis = enabled;
        self
    }

    /// Builder: set memory_marker.
    pub fn with_memory_marker(mut self, marker: impl Into<String>) -> Self {
        self.memory_marker = marker.into();
        self
    }

    /// Builder: set naming.
    pub fn with_naming(mut self, naming: FixtureNaming) -> Self {
        self.naming = naming;
        self
    }

    /// `make -C <project_dir>`, run from the fixtures directory.
    pub fn build_command(&self) -> CommandSpec {
        CommandSpec::new(DEFAULT_BUILD_PROGRAM)
            .arg("-C")
            .arg(self.project_dir.to_string_lossy())
            .current_dir(&self.fixtures_dir)
    }

    /// `scan-build make -C <project_dir>`, if static analysis is enabled.
    pub fn analysis_command(&self) -> Option<CommandSpec> {
        if !self.static_analysis {
            return None;
        }
        Some(
            CommandSpec::new(DEFAULT_ANALYSIS_PROGRAM)
                .arg(DEFAULT_BUILD_PROGRAM)
                .arg("-C")
                .arg(self.project_dir.to_string_lossy())
                .current_dir(&self.fixtures_dir),
        )
    }

    /// The instrumentation wrapper each fixture is piped into.
    pub fn wrapper_command(&self) -> CommandSpec {
        CommandSpec::new(&self.wrapper)
            .current_dir(&self.fixtures_dir)
            .timeout(self.timeout)
    }
}
