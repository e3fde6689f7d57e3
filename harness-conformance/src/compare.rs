//! Output and diagnostic checks.

use harness_exec::RunOutput;

use crate::types::{ExpectedOutput, Fixture, Verdict};

/// Byte-for-byte comparison with no line-ending or whitespace normalization.
pub fn output_matches(actual: &[u8], expected: &ExpectedOutput) -> bool {
    actual == expected.bytes()
}

/// Whether the memory checker's diagnostics contain the success marker.
///
/// A plain substring search; the diagnostic format itself is not parsed.
pub fn memory_clean(diagnostics: &str, marker: &str) -> bool {
    diagnostics.contains(marker)
}

/// Judge one run. Both checks always run; a timed-out run fails both.
pub fn evaluate(fixture: &Fixture, output: &RunOutput, marker: &str) -> Verdict {
    let timed_out = output.state.timed_out();
    let correct = output_matches(&output.stdout, &fixture.expected) && !timed_out;
    let clean = memory_clean(&output.stderr, marker) && !timed_out;
    Verdict::new(&fixture.id, correct, clean)
}
