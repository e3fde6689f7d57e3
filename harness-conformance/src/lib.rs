//! Memcheck Conformance Harness
//!
//! This crate validates an external interpreter against golden fixtures,
//! checking both its output and its memory hygiene.
//!
//! # Overview
//!
//! 1. Rebuild the interpreter (and optionally run a static analyzer)
//! 2. Discover fixture/golden-output pairs in a directory
//! 3. Pipe each fixture through the memory-checking wrapper
//! 4. Compare stdout to the golden file byte-for-byte and look for the
//!    checker's zero-errors marker
//! 5. Report each fixture and the aggregate verdict
//!
//! # Fixtures
//!
//! A fixture is a pair of files in the fixtures directory:
//!
//! - `test-in-<id>.rkt` - bytes fed to the interpreter on stdin
//! - `test-out-<id>.txt` - exact bytes the interpreter must print

pub mod build_step;
pub mod compare;
pub mod config;
pub mod loader;
pub mod report;
pub mod runner;
pub mod types;

pub use build_step::{run_build, AnalysisOutcome, BuildOutcome, BuildReport};
pub use compare::{evaluate, memory_clean, output_matches};
pub use config::{FixtureNaming, HarnessConfig};
pub use loader::{scan_fixtures, FixtureScan, LoadError};
pub use report::{escape_bytes, render_final, render_fixture, Tally};
pub use runner::{run_fixture, FixtureOutcome};
pub use types::{ExpectedOutput, Fixture, Verdict};
