//! Harness driver: build once, then run, judge and report every fixture.

use std::io::Write;

use harness_conformance::{
    render_final, render_fixture, run_fixture, scan_fixtures, BuildReport, Tally,
};
use harness_exec::ProcessRunner;

use crate::cli::Cli;
use crate::logger::Logger;

use super::build::execute_build;
use super::{CommandError, CommandResult};

/// Result of a harness run.
#[derive(Debug)]
pub struct RunSummary {
    /// `None` when the build was skipped.
    pub build: Option<BuildReport>,
    pub tally: Tally,
}

impl RunSummary {
    /// Global verdict over every fixture.
    pub fn all_passed(&self) -> bool {
        self.tally.all_passed()
    }
}

/// Execute the harness.
///
/// Fixtures run one at a time in discovery order, strictly after the build.
/// The report goes to `out`; diagnostics go to `logger`. Fixture failures
/// are folded into the returned tally, while a fixture that cannot be
/// loaded (such as one without a golden file) aborts the run.
pub fn execute_run<R, L, W>(
    args: &Cli,
    runner: &R,
    logger: &L,
    out: &mut W,
) -> CommandResult<RunSummary>
where
    R: ProcessRunner + ?Sized,
    L: Logger + ?Sized,
    W: Write,
{
    args.validate()?;
    let config = args.to_config();

    let build = if args.skip_build {
        logger.verbose("Skipping build");
        None
    } else {
        let report = execute_build(runner, &config, logger);
        if args.stop_on_build_failure && !report.build.is_success() {
            return Err(CommandError::BuildFailed(config.build_command().display()));
        }
        Some(report)
    };

    let mut fixtures = scan_fixtures(&config.fixtures_dir, &config.naming)?;
    logger.verbose(&format!(
        "Found {} fixture(s) in {}",
        fixtures.remaining(),
        config.fixtures_dir.display()
    ));

    let wrapper = config.wrapper_command().display();
    let tally = fixtures.try_fold(Tally::default(), |tally, fixture| -> CommandResult<Tally> {
        let fixture = fixture?;
        logger.debug(&format!("Running {} < {}", wrapper, fixture.input_name));

        let outcome = run_fixture(runner, &fixture, &config);
        render_fixture(&mut *out, &fixture, &outcome)?;
        Ok(tally.record(&outcome.verdict))
    })?;

    render_final(&mut *out, &tally)?;
    out.flush()?;

    logger.verbose(&format!(
        "{} of {} fixture(s) passed",
        tally.passed(),
        tally.total()
    ));

    Ok(RunSummary { build, tally })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_from;
    use crate::logger::{MockLogger, NullLogger};
    use harness_conformance::{BuildOutcome, LoadError};
    use harness_exec::{ExitState, MockProcessRunner, RunOutput};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const CLEAN: &str = "==9== ERROR SUMMARY: 0 errors from 0 contexts (suppressed: 0 from 0)\n";
    const LEAKY: &str = "==9== ERROR SUMMARY: 3 errors from 2 contexts (suppressed: 0 from 0)\n";

    fn add_fixture(dir: &Path, id: &str, input: &[u8], expected: &[u8]) {
        fs::write(dir.join(format!("test-in-{}.rkt", id)), input).unwrap();
        fs::write(dir.join(format!("test-out-{}.txt", id)), expected).unwrap();
    }

    fn args(dir: &Path, extra: &[&str]) -> Cli {
        let mut argv = vec!["runtests", "--dir", dir.to_str().unwrap()];
        argv.extend_from_slice(extra);
        parse_from(argv).unwrap()
    }

    fn built() -> MockProcessRunner {
        MockProcessRunner::new()
            .with_output("make", RunOutput::new(Vec::new(), "", ExitState::Code(0)))
            .with_output(
                "scan-build",
                RunOutput::new(b"scan-build: No bugs found.\n".to_vec(), "", ExitState::Code(0)),
            )
    }

    fn wrapper_output(stdout: &[u8], stderr: &str) -> RunOutput {
        RunOutput::new(stdout.to_vec(), stderr, ExitState::Code(0))
    }

    fn run(args: &Cli, runner: &MockProcessRunner) -> (CommandResult<RunSummary>, String) {
        let mut out = Vec::new();
        let result = execute_run(args, runner, &NullLogger, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    // ===========================================
    // Scenarios
    // ===========================================

    #[test]
    fn test_hello_passes() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "hello", b"\"hello\"\n", b"\"hello\"\n");
        let runner = built().with_input_output(
            "./valgrind.sh",
            b"\"hello\"\n",
            wrapper_output(b"\"hello\"\n", CLEAN),
        );

        let (result, report) = run(&args(temp.path(), &[]), &runner);
        let summary = result.unwrap();

        assert!(summary.all_passed());
        assert_eq!(
            report,
            "Input: test-in-hello.rkt Expected output: test-out-hello.txt Success: true\n\
             All tests passed!\n"
        );
    }

    #[test]
    fn test_build_runs_once_before_fixtures() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a", b"1", b"1");
        add_fixture(temp.path(), "b", b"2", b"2");
        let runner = built().with_output("./valgrind.sh", wrapper_output(b"", CLEAN));

        run(&args(temp.path(), &[]), &runner).0.unwrap();

        let programs: Vec<String> = runner
            .calls()
            .iter()
            .map(|c| c.command.program_name())
            .collect();
        assert_eq!(
            programs,
            vec!["make", "scan-build", "./valgrind.sh", "./valgrind.sh"]
        );
    }

    #[test]
    fn test_extra_trailing_byte_fails() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "hello", b"\"hello\"\n", b"\"hello\"\n");
        let runner =
            built().with_output("./valgrind.sh", wrapper_output(b"\"hello\"\n\n", CLEAN));

        let (result, report) = run(&args(temp.path(), &[]), &runner);

        assert!(!result.unwrap().all_passed());
        assert!(report.contains("Success: false"));
        assert!(report.contains("Correctness error."));
        assert!(report.contains("b'\"hello\"\\n\\n'"));
        assert!(report.contains("b'\"hello\"\\n'"));
        assert!(report.ends_with("At least one test failed.\n"));
    }

    #[test]
    fn test_memory_errors_fail_correct_output() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "hello", b"x", b"ok\n");
        let runner = built().with_output("./valgrind.sh", wrapper_output(b"ok\n", LEAKY));

        let (result, report) = run(&args(temp.path(), &[]), &runner);
        let summary = result.unwrap();

        assert!(!summary.all_passed());
        assert!(!report.contains("Correctness error."));
        assert!(report.contains("Valgrind error."));
        assert!(report.contains("3 errors from 2 contexts"));
    }

    #[test]
    fn test_one_pass_one_fail() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a-good", b"good", b"G\n");
        add_fixture(temp.path(), "b-bad", b"bad", b"B\n");
        let runner = built()
            .with_input_output("./valgrind.sh", b"good", wrapper_output(b"G\n", CLEAN))
            .with_input_output("./valgrind.sh", b"bad", wrapper_output(b"X\n", CLEAN));

        let (result, report) = run(&args(temp.path(), &[]), &runner);
        let summary = result.unwrap();

        assert!(!summary.all_passed());
        assert_eq!(summary.tally.total(), 2);
        assert_eq!(summary.tally.failed_fixtures(), &["b-bad".to_string()]);

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines[0],
            "Input: test-in-a-good.rkt Expected output: test-out-a-good.txt Success: true"
        );
        assert_eq!(
            lines[1],
            "Input: test-in-b-bad.rkt Expected output: test-out-b-bad.txt Success: false"
        );
        assert_eq!(lines.last(), Some(&"At least one test failed."));
    }

    #[test]
    fn test_no_fixtures_passes_vacuously() {
        let temp = TempDir::new().unwrap();
        let (result, report) = run(&args(temp.path(), &[]), &built());
        let summary = result.unwrap();
        assert!(summary.all_passed());
        assert_eq!(summary.tally.total(), 0);
        assert_eq!(report, "All tests passed!\n");
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a", b"1", b"1");
        add_fixture(temp.path(), "b", b"2", b"2");
        let runner = built()
            .with_input_output("./valgrind.sh", b"1", wrapper_output(b"1", CLEAN))
            .with_input_output("./valgrind.sh", b"2", wrapper_output(b"3", CLEAN));
        let cli = args(temp.path(), &[]);

        let (first, first_report) = run(&cli, &runner);
        let (second, second_report) = run(&cli, &runner);

        assert_eq!(first.unwrap().tally, second.unwrap().tally);
        assert_eq!(first_report, second_report);
    }

    // ===========================================
    // Configuration errors
    // ===========================================

    #[test]
    fn test_missing_expected_output_aborts_loudly() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("test-in-orphan.rkt"), b"1").unwrap();

        let (result, _) = run(&args(temp.path(), &[]), &built());

        match result {
            Err(CommandError::Fixtures(LoadError::MissingExpected { input, expected })) => {
                assert_eq!(input, "test-in-orphan.rkt");
                assert_eq!(expected, "test-out-orphan.txt");
            }
            other => panic!("expected missing-expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_args_rejected_before_build() {
        let temp = TempDir::new().unwrap();
        let runner = built();
        let (result, _) = run(&args(temp.path(), &["--timeout-sec", "0"]), &runner);
        assert!(matches!(result, Err(CommandError::InvalidArgument(_))));
        assert_eq!(runner.call_count(), 0);
    }

    // ===========================================
    // Build policy
    // ===========================================

    #[test]
    fn test_failed_build_still_runs_fixtures() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a", b"1", b"1");
        let runner = MockProcessRunner::new()
            .with_output(
                "make",
                RunOutput::new(Vec::new(), "make: *** [all] Error 1\n", ExitState::Code(2)),
            )
            .with_output("./valgrind.sh", wrapper_output(b"", "valgrind: ./interpreter: No such file"));
        let logger = MockLogger::new();
        let mut out = Vec::new();

        let summary = execute_run(
            &args(temp.path(), &["--no-static-analysis"]),
            &runner,
            &logger,
            &mut out,
        )
        .unwrap();

        assert!(!summary.all_passed());
        assert!(matches!(
            summary.build.unwrap().build,
            BuildOutcome::Failed { .. }
        ));
        assert!(logger.contains("make: *** [all] Error 1"));
    }

    #[test]
    fn test_stop_on_build_failure_skips_fixtures() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a", b"1", b"1");
        let runner = MockProcessRunner::new()
            .with_output("make", RunOutput::new(Vec::new(), "", ExitState::Code(2)))
            .with_output("./valgrind.sh", wrapper_output(b"1", CLEAN));

        let (result, report) = run(
            &args(temp.path(), &["--no-static-analysis", "--stop-on-build-failure"]),
            &runner,
        );

        assert!(matches!(result, Err(CommandError::BuildFailed(_))));
        assert!(report.is_empty());
        assert_eq!(runner.command_lines(), vec!["make -C .."]);
    }

    #[test]
    fn test_skip_build() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a", b"1", b"1");
        let runner = MockProcessRunner::new().with_output("./valgrind.sh", wrapper_output(b"1", CLEAN));

        let (result, _) = run(&args(temp.path(), &["--skip-build"]), &runner);
        let summary = result.unwrap();

        assert!(summary.build.is_none());
        assert!(summary.all_passed());
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_unlaunchable_wrapper_fails_each_fixture_without_aborting() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a", b"1", b"1");
        add_fixture(temp.path(), "b", b"2", b"2");

        let (result, report) = run(&args(temp.path(), &["--skip-build"]), &MockProcessRunner::new());
        let summary = result.unwrap();

        assert_eq!(summary.tally.total(), 2);
        assert!(!summary.all_passed());
        assert_eq!(report.matches("Valgrind error.").count(), 2);
        assert!(report.contains("failed to spawn `./valgrind.sh`"));
    }

    #[test]
    fn test_verbose_counts_are_logged() {
        let temp = TempDir::new().unwrap();
        add_fixture(temp.path(), "a", b"1", b"1");
        let runner = MockProcessRunner::new().with_output("./valgrind.sh", wrapper_output(b"1", CLEAN));
        let logger = MockLogger::new();
        let mut out = Vec::new();

        execute_run(&args(temp.path(), &["--skip-build"]), &runner, &logger, &mut out).unwrap();

        assert!(logger.contains("Found 1 fixture(s)"));
        assert!(logger.contains("1 of 1 fixture(s) passed"));
        assert!(logger.contains("Running ./valgrind.sh < test-in-a.rkt"));
    }
}
