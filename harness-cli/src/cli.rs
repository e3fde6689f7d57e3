//! CLI argument parsing for the harness.
//!
//! Every flag is optional: a bare `runtests` in the fixtures directory
//! rebuilds `..`, runs `./valgrind.sh` on each fixture and reports.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use harness_conformance::config::{
    HarnessConfig, DEFAULT_FIXTURES_DIR, DEFAULT_PROJECT_DIR, DEFAULT_TIMEOUT_SEC, DEFAULT_WRAPPER,
};
use thiserror::Error;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("timeout-sec must be at least 1, got {0} (use --no-timeout to disable)")]
    InvalidTimeout(u64),

    #[error("wrapper path must not be empty")]
    EmptyWrapper,
}

/// Regression harness: checks interpreter output against golden files under a memory checker.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "runtests")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory containing test-in-*.rkt / test-out-*.txt pairs and the wrapper.
    #[arg(short, long, default_value = DEFAULT_FIXTURES_DIR)]
    pub dir: PathBuf,

    /// Project directory passed to `make -C`, relative to --dir.
    #[arg(long, default_value = DEFAULT_PROJECT_DIR)]
    pub project_dir: PathBuf,

    /// Memory-checking wrapper each fixture is piped into, relative to --dir.
    #[arg(short, long, default_value = DEFAULT_WRAPPER)]
    pub wrapper: PathBuf,

    /// Kill a fixture run after this many seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SEC)]
    pub timeout_sec: u64,

    /// Wait for fixture runs indefinitely.
    #[arg(long, conflicts_with = "timeout_sec")]
    pub no_timeout: bool,

    /// Do not rebuild the interpreter before running fixtures.
    #[arg(long)]
    pub skip_build: bool,

    /// Skip the scan-build static analysis pass.
    #[arg(long)]
    pub no_static_analysis: bool,

    /// Abort before running fixtures if the build fails.
    #[arg(long)]
    pub stop_on_build_failure: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if !self.no_timeout && self.timeout_sec == 0 {
            return Err(CliError::InvalidTimeout(self.timeout_sec));
        }
        if self.wrapper.as_os_str().is_empty() {
            return Err(CliError::EmptyWrapper);
        }
        Ok(())
    }

    /// Effective per-fixture timeout.
    pub fn timeout(&self) -> Option<Duration> {
        if self.no_timeout {
            None
        } else {
            Some(Duration::from_secs(self.timeout_sec))
        }
    }

    /// Convert to a harness configuration.
    pub fn to_config(&self) -> HarnessConfig {
        HarnessConfig::new()
            .with_fixtures_dir(&self.dir)
            .with_project_dir(&self.project_dir)
            .with_wrapper(&self.wrapper)
            .with_timeout(self.timeout())
            .with_static_analysis(!self.no_static_analysis)
    }
}

/// Parse CLI arguments from an iterator (for testing).
pub fn parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
