//! Memcheck harness CLI.
//!
//! This crate provides the `runtests` command: argument parsing, logging,
//! exit codes and the driver that ties build, fixture runs and reporting
//! together.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod logger;

pub use cli::{parse_from, Cli, CliError};
pub use commands::{execute_build, execute_run, CommandError, CommandResult, RunSummary};
pub use logger::{Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
