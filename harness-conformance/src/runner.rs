//! Conformance runner for executing one fixture under the memory checker.

use harness_exec::{ExitState, ProcessRunner, RunOutput};

use crate::compare::evaluate;
use crate::config::HarnessConfig;
use crate::types::{Fixture, Verdict};

/// What one fixture run produced and how it was judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureOutcome {
    pub output: RunOutput,
    pub verdict: Verdict,
}

/// Pipe the fixture through the instrumentation wrapper and judge the result.
///
/// A wrapper that cannot be launched is a failure of this fixture only: the
/// launch error stands in as the diagnostic text and stdout is empty.
pub fn run_fixture<R>(runner: &R, fixture: &Fixture, config: &HarnessConfig) -> FixtureOutcome
where
    R: ProcessRunner + ?Sized,
{
    let output = runner
        .run(&config.wrapper_command(), &fixture.input)
        .unwrap_or_else(|e| RunOutput::new(Vec::new(), e.to_string(), ExitState::Unknown));
    let verdict = evaluate(fixture, &output, &config.memory_marker);
    FixtureOutcome { output, verdict }
}
