//! Process runner trait and the real implementation.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::command::CommandSpec;

/// How often a child with a deadline is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How long pipes get to reach end of file after a kill.
const KILL_GRACE: Duration = Duration::from_millis(200);

/// Errors from launching or waiting on a process.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture {stream} of `{program}`")]
    Capture {
        program: String,
        stream: &'static str,
    },
}

/// How a process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// Exited normally with a status code.
    Code(i32),
    /// Terminated by a signal.
    Signal(i32),
    /// Killed by the runner after exceeding its timeout.
    TimedOut,
    /// The platform reported neither a code nor a signal.
    Unknown,
}

impl ExitState {
    /// Classify a `std::process::ExitStatus`.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitState::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitState::Signal(signal);
            }
        }
        ExitState::Unknown
    }

    pub fn success(&self) -> bool {
        matches!(self, ExitState::Code(0))
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, ExitState::TimedOut)
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Code(code) => write!(f, "exited with code {}", code),
            ExitState::Signal(signal) => write!(f, "killed by signal {}", signal),
            ExitState::TimedOut => write!(f, "timed out"),
            ExitState::Unknown => write!(f, "unknown exit status"),
        }
    }
}

/// Everything captured from one process execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Raw standard output bytes.
    pub stdout: Vec<u8>,
    /// Standard error decoded as UTF-8, invalid sequences replaced.
    pub stderr: String,
    pub state: ExitState,
}

impl RunOutput {
    pub fn new(stdout: impl Into<Vec<u8>>, stderr: impl Into<String>, state: ExitState) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            state,
        }
    }

    /// Build from raw pipe contents, decoding stderr lossily.
    pub fn from_capture(stdout: Vec<u8>, stderr: &[u8], state: ExitState) -> Self {
        Self {
            stdout,
            stderr: String::from_utf8_lossy(stderr).into_owned(),
            state,
        }
    }

    /// Stdout (decoded lossily) followed by stderr.
    pub fn combined_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        text.push_str(&self.stderr);
        text
    }
}

/// Trait for executing an external command with a given stdin payload.
pub trait ProcessRunner: Send + Sync {
    /// Run `command` to completion (or timeout), feeding `stdin` to it.
    fn run(&self, command: &CommandSpec, stdin: &[u8]) -> Result<RunOutput, ExecError>;
}

/// Runner backed by `std::process` and one thread per pipe.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealProcessRunner;

impl RealProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for RealProcessRunner {
    fn run(&self, command: &CommandSpec, stdin: &[u8]) -> Result<RunOutput, ExecError> {
        let program = command.program_name();

        let mut cmd = command.to_command();
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdin_pipe = child.stdin.take().ok_or_else(|| ExecError::Capture {
            program: program.clone(),
            stream: "stdin",
        })?;
        let stdout_pipe = child.stdout.take().ok_or_else(|| ExecError::Capture {
            program: program.clone(),
            stream: "stdout",
        })?;
        let stderr_pipe = child.stderr.take().ok_or_else(|| ExecError::Capture {
            program: program.clone(),
            stream: "stderr",
        })?;

        let writer = spawn_writer(stdin_pipe, stdin.to_vec());
        let stdout_drain = Drain::spawn(stdout_pipe);
        let stderr_drain = Drain::spawn(stderr_pipe);

        let deadline = command.timeout_duration().map(|t| Instant::now() + t);
        let mut state =
            wait_until(&mut child, deadline).map_err(|source| ExecError::Wait { program, source })?;

        // Processes the child left behind can hold the pipes open after it exits,
        // so draining is bounded by the same deadline.
        let drain_deadline = if state.timed_out() {
            Some(Instant::now() + KILL_GRACE)
        } else {
            deadline
        };
        if !finish_all(&stdout_drain, &stderr_drain, &writer, drain_deadline) && !state.timed_out() {
            signal_group(child.id());
            state = ExitState::TimedOut;
            finish_all(
                &stdout_drain,
                &stderr_drain,
                &writer,
                Some(Instant::now() + KILL_GRACE),
            );
        }

        Ok(RunOutput::from_capture(
            stdout_drain.take(),
            &stderr_drain.take(),
            state,
        ))
    }
}

/// A pipe being read to the end on its own thread.
///
/// Bytes land in a shared buffer as they arrive, so whatever was read before
/// the deadline survives even if the pipe never reaches end of file.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(mut pipe: R) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let shared = Arc::clone(&buf);
        thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => lock(&shared).extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = tx.send(());
        });
        Self { buf, done }
    }

    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *lock(&self.buf))
    }
}

fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Feed stdin on its own thread; the receiver fires once the pipe is closed.
fn spawn_writer<W: Write + Send + 'static>(mut pipe: W, input: Vec<u8>) -> Receiver<()> {
    let (tx, done) = mpsc::channel();
    thread::spawn(move || {
        // The child may exit before consuming its input; a broken pipe is not an error here.
        let _ = pipe.write_all(&input);
        drop(pipe);
        let _ = tx.send(());
    });
    done
}

/// Wait for a helper thread to signal completion, up to `deadline`.
fn finished(done: &Receiver<()>, deadline: Option<Instant>) -> bool {
    let result = match deadline {
        None => done.recv().map_err(|_| RecvTimeoutError::Disconnected),
        Some(deadline) => done.recv_timeout(deadline.saturating_duration_since(Instant::now())),
    };
    !matches!(result, Err(RecvTimeoutError::Timeout))
}

/// True when both output pipes hit end of file and stdin was fully handed over.
fn finish_all(
    stdout: &Drain,
    stderr: &Drain,
    writer: &Receiver<()>,
    deadline: Option<Instant>,
) -> bool {
    let results = [
        finished(&stdout.done, deadline),
        finished(&stderr.done, deadline),
        finished(writer, deadline),
    ];
    results.iter().all(|&ok| ok)
}

/// Wait for the child, killing its process group once `deadline` passes.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> std::io::Result<ExitState> {
    let Some(deadline) = deadline else {
        return child.wait().map(ExitState::from_status);
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(ExitState::from_status(status));
        }
        if Instant::now() >= deadline {
            signal_group(child.id());
            let _ = child.kill();
            child.wait()?;
            return Ok(ExitState::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn signal_group(leader: u32) {
    // The child leads its own group (process_group(0)), so pgid == pid.
    let pgid = leader as libc::pid_t;
    // SAFETY: kill(2) has no memory-safety preconditions; a stale pgid only yields ESRCH.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn signal_group(_leader: u32) {}
