//! Build trigger: rebuild the binary under test and run the static analyzer.
//!
//! Nothing here feeds into pass/fail. A broken build surfaces through the
//! returned report, and fixtures then fail on their own.

use harness_exec::{ExitState, ProcessRunner};

use crate::config::HarnessConfig;

/// Outcome of the plain build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    /// The build ran and reported failure; `output` is stdout followed by stderr.
    Failed { state: ExitState, output: String },
    /// The build command could not be launched.
    Unavailable(String),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded)
    }
}

/// Outcome of the static-analysis build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The analyzer printed its no-findings marker.
    Clean,
    /// Marker absent; holds the analyzer's full output.
    Findings(String),
    /// The analyzer could not be launched.
    Unavailable(String),
}

/// Everything the build trigger observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub build: BuildOutcome,
    /// `None` when static analysis is disabled.
    pub analysis: Option<AnalysisOutcome>,
}

/// Run the build once, then the static-analysis build if enabled.
pub fn run_build<R>(runner: &R, config: &HarnessConfig) -> BuildReport
where
    R: ProcessRunner + ?Sized,
{
    let build = match runner.run(&config.build_command(), &[]) {
        Ok(output) if output.state.success() => BuildOutcome::Succeeded,
        Ok(output) => BuildOutcome::Failed {
            state: output.state,
            output: output.combined_text(),
        },
        Err(e) => BuildOutcome::Unavailable(e.to_string()),
    };

    let analysis = config
        .analysis_command()
        .map(|command| match runner.run(&command, &[]) {
            Ok(output) => {
                let text = output.combined_text();
                if text.contains(&config.analysis_marker) {
                    AnalysisOutcome::Clean
                } else {
                    AnalysisOutcome::Findings(text)
                }
            }
            Err(e) => AnalysisOutcome::Unavailable(e.to_string()),
        });

    BuildReport { build, analysis }
}
