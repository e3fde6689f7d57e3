//! Exit codes for the harness.
//!
//! A failing fixture is a distinct, non-zero outcome so CI can gate on it.

use crate::commands::{CommandError, RunSummary};

/// Exit code constants.
pub mod codes {
    /// Every fixture passed.
    pub const SUCCESS: i32 = 0;
    /// At least one fixture failed correctness or the memory check.
    pub const TESTS_FAILED: i32 = 1;
    /// Invalid arguments.
    pub const INVALID_ARGS: i32 = 2;
    /// A fixture could not be discovered or loaded (e.g. missing golden file).
    pub const FIXTURE_ERROR: i32 = 3;
    /// The report could not be written.
    pub const IO_ERROR: i32 = 4;
    /// The build failed and --stop-on-build-failure was given.
    pub const BUILD_FAILED: i32 = 5;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Fixtures(_) => codes::FIXTURE_ERROR,
        CommandError::Output(_) => codes::IO_ERROR,
        CommandError::BuildFailed(_) => codes::BUILD_FAILED,
    }
}

/// Map a completed run to an exit code.
pub fn summary_code(summary: &RunSummary) -> i32 {
    if summary.all_passed() {
        codes::SUCCESS
    } else {
        codes::TESTS_FAILED
    }
}
