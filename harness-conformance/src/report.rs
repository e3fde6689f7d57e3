//! Result aggregation and console report rendering.

use std::io::{self, Write};

use crate::runner::FixtureOutcome;
use crate::types::{Fixture, Verdict};

/// Final line when every fixture passed.
pub const ALL_PASSED: &str = "All tests passed!";

/// Final line when any fixture failed.
pub const SOME_FAILED: &str = "At least one test failed.";

/// Aggregate over per-fixture verdicts.
///
/// Built by folding verdicts through [`Tally::record`]; an empty tally counts
/// as all passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    total: usize,
    failed: Vec<String>,
}

impl Tally {
    /// Fold one verdict into the aggregate.
    pub fn record(mut self, verdict: &Verdict) -> Self {
        self.total += 1;
        if !verdict.passed() {
            self.failed.push(verdict.fixture.clone());
        }
        self
    }

    /// Global verdict: true iff every recorded fixture passed.
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.total - self.failed.len()
    }

    /// Ids of failing fixtures, in the order they were recorded.
    pub fn failed_fixtures(&self) -> &[String] {
        &self.failed
    }
}

/// Render bytes as an escaped literal, e.g. `b'3\n'`.
///
/// Single quotes delimit the literal unless the bytes contain `'` and no `"`,
/// in which case double quotes are used and `'` is left bare.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &b in bytes {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'\\' => out.push_str("\\\\"),
            _ if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push(quote as char);
    out
}

/// Write the report block for one fixture.
///
/// Always one summary line; failures add byte and text dumps of the
/// output and, for memory failures, the full diagnostic text.
pub fn render_fixture<W: Write>(
    out: &mut W,
    fixture: &Fixture,
    outcome: &FixtureOutcome,
) -> io::Result<()> {
    let verdict = &outcome.verdict;
    let output = &outcome.output;

    writeln!(
        out,
        "Input: {} Expected output: {} Success: {}",
        fixture.input_name,
        fixture.expected.name(),
        verdict.passed()
    )?;

    if output.state.timed_out() {
        writeln!(out, "Timed out; process was killed.")?;
    }

    if !verdict.correct {
        writeln!(out, "Correctness error.")?;
        writeln!(out, "Process {}.", output.state)?;
        writeln!(out, "Actual output in bytes:")?;
        writeln!(out, "{}", escape_bytes(&output.stdout))?;
        writeln!(out, "Expected output in bytes:")?;
        writeln!(out, "{}", escape_bytes(fixture.expected.bytes()))?;
        writeln!(out)?;
        writeln!(out, "Actual output:")?;
        writeln!(out, "{}", String::from_utf8_lossy(&output.stdout))?;
        writeln!(out, "Expected output:")?;
        writeln!(out, "{}", fixture.expected.text())?;
    }

    if !verdict.memory_clean {
        writeln!(out, "Valgrind error.")?;
        writeln!(out, "Output:")?;
        writeln!(out, "{}", output.stderr)?;
    }

    Ok(())
}

/// Write the single final verdict line.
pub fn render_final<W: Write>(out: &mut W, tally: &Tally) -> io::Result<()> {
    if tally.all_passed() {
        writeln!(out, "{}", ALL_PASSED)
    } else {
        writeln!(out, "{}", SOME_FAILED)
    }
}
