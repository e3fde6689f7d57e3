//! Conformance types.

use std::borrow::Cow;

/// Golden output for one fixture.
///
/// Holds the raw bytes of a single read; the text view is decoded from
/// those same bytes so the byte comparison and the printed diff never drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedOutput {
    name: String,
    bytes: Vec<u8>,
}

impl ExpectedOutput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// File name of the golden artifact, e.g. `test-out-hello.txt`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy UTF-8 view for human-readable dumps.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// A discovered fixture ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Middle segment of the input file name, e.g. `hello`.
    pub id: String,
    /// Input file name, e.g. `test-in-hello.rkt`.
    pub input_name: String,
    /// Bytes fed to the binary under test on stdin.
    pub input: Vec<u8>,
    pub expected: ExpectedOutput,
}

/// Per-fixture verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub fixture: String,
    /// Stdout matched the golden bytes exactly.
    pub correct: bool,
    /// The memory checker reported zero errors.
    pub memory_clean: bool,
}

impl Verdict {
    pub fn new(fixture: impl Into<String>, correct: bool, memory_clean: bool) -> Self {
        Self {
            fixture: fixture.into(),
            correct,
            memory_clean,
        }
    }

    /// Combined verdict: correctness and memory safety.
    pub fn passed(&self) -> bool {
        self.correct && self.memory_clean
    }
}
