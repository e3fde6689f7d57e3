//! Harness binary.
//!
//! Entry point for the `runtests` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use harness_cli::exit::{exit_code, summary_code};
use harness_cli::{execute_run, Cli, StderrLogger, Verbosity};
use harness_exec::RealProcessRunner;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = StderrLogger::new(Verbosity::from_count(cli.verbose));
    let runner = RealProcessRunner::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match execute_run(&cli, &runner, &logger, &mut out) {
        Ok(summary) => ExitCode::from(summary_code(&summary) as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}
