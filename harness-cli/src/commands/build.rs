//! Build step orchestration.

use harness_conformance::{run_build, AnalysisOutcome, BuildOutcome, BuildReport, HarnessConfig};
use harness_exec::ProcessRunner;

use crate::logger::Logger;

/// Run the build trigger and log anything worth a human's attention.
///
/// Never fails: a broken build is logged and left to show up as fixture failures.
pub fn execute_build<R, L>(runner: &R, config: &HarnessConfig, logger: &L) -> BuildReport
where
    R: ProcessRunner + ?Sized,
    L: Logger + ?Sized,
{
    logger.verbose(&format!("Building: {}", config.build_command().display()));
    let report = run_build(runner, config);

    match &report.build {
        BuildOutcome::Succeeded => logger.verbose("Build succeeded"),
        BuildOutcome::Failed { state, output } => {
            logger.warn(&format!(
                "build {}; fixtures will run against whatever binary is on disk",
                state
            ));
            logger.info(output);
        }
        BuildOutcome::Unavailable(message) => {
            logger.warn(&format!("build could not be started: {}", message));
        }
    }

    match &report.analysis {
        None => logger.debug("Static analysis disabled"),
        Some(AnalysisOutcome::Clean) => logger.verbose("Static analysis found no bugs"),
        Some(AnalysisOutcome::Findings(output)) => {
            logger.info("Clang static analyzer thinks it found a bug.");
            logger.info(output);
        }
        Some(AnalysisOutcome::Unavailable(message)) => {
            logger.warn(&format!("static analysis skipped: {}", message));
        }
    }

    report
}
