//! Command orchestration.
//!
//! - `build` - rebuild the interpreter and run the static analyzer
//! - `run` - build, then execute and report every fixture

pub mod build;
pub mod run;

pub use build::execute_build;
pub use run::{execute_run, RunSummary};

use crate::cli::CliError;
use harness_conformance::LoadError;
use thiserror::Error;

/// Errors that stop a harness run.
///
/// Fixture failures are not errors; they are reported and counted.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("fixture error: {0}")]
    Fixtures(#[from] LoadError),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),

    #[error("build failed: {0}")]
    BuildFailed(String),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
