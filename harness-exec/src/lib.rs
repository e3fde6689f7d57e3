//! Process execution for the memcheck harness.
//!
//! This crate provides:
//! - `CommandSpec` describing a command line, working directory and timeout
//! - `ProcessRunner` trait for running a command with bytes on stdin
//! - `RealProcessRunner` that drains stdout and stderr concurrently
//! - `MockProcessRunner` with scripted responses for tests

pub mod command;
pub mod mock;
pub mod runner;

pub use command::CommandSpec;
pub use mock::{MockProcessRunner, RecordedCall};
pub use runner::{ExecError, ExitState, ProcessRunner, RealProcessRunner, RunOutput};
