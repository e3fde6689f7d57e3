//! Scripted process runner for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::command::CommandSpec;
use crate::runner::{ExecError, ProcessRunner, RunOutput};

/// A call observed by `MockProcessRunner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: CommandSpec,
    pub stdin: Vec<u8>,
}

/// Mock runner that answers from scripted outputs instead of spawning.
///
/// Responses are looked up by program name and stdin payload first, then by
/// program name alone. Unknown programs fail like a missing executable.
#[derive(Debug, Default)]
pub struct MockProcessRunner {
    by_program: HashMap<String, RunOutput>,
    by_input: HashMap<(String, Vec<u8>), RunOutput>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: answer every run of `program` with `output`.
    pub fn with_output(mut self, program: &str, output: RunOutput) -> Self {
        self.by_program.insert(program.to_string(), output);
        self
    }

    /// Builder: answer runs of `program` fed exactly `input` with `output`.
    pub fn with_input_output(mut self, program: &str, input: &[u8], output: RunOutput) -> Self {
        self.by_input
            .insert((program.to_string(), input.to_vec()), output);
        self
    }

    /// All calls in the order they were made.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().unwrap().clone()
    }

    /// Command lines of all calls, as rendered by `CommandSpec::display`.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.command.display()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

impl ProcessRunner for MockProcessRunner {
    fn run(&self, command: &CommandSpec, stdin: &[u8]) -> Result<RunOutput, ExecError> {
        self.calls.write().unwrap().push(RecordedCall {
            command: command.clone(),
            stdin: stdin.to_vec(),
        });

        let program = command.program_name();
        if let Some(output) = self.by_input.get(&(program.clone(), stdin.to_vec())) {
            return Ok(output.clone());
        }
        if let Some(output) = self.by_program.get(&program) {
            return Ok(output.clone());
        }
        Err(ExecError::Spawn {
            program,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no scripted output"),
        })
    }
}
