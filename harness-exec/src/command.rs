//! Command line description.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// A command to execute: program, arguments, working directory and an
/// optional wall-clock ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl CommandSpec {
    /// Create a command with no arguments that runs in the caller's directory.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
        }
    }

    /// Builder: append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Builder: append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Builder: run the command inside `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Builder: kill the command if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout
    }

    /// Program name as text, used as the lookup key for scripted runners
    /// and in error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Render the command line for logs, e.g. `scan-build make -C ..`.
    pub fn display(&self) -> String {
        let mut line = self.program_name();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Build a `std::process::Command` with program, arguments and directory set.
    ///
    /// A relative program path containing a separator (`./valgrind.sh`) is
    /// resolved against the working directory up front, since `Command`
    /// leaves that case platform specific.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(self.resolved_program());
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }

    fn resolved_program(&self) -> PathBuf {
        match &self.current_dir {
            Some(dir) if self.program.is_relative() && self.program.components().count() > 1 => {
                let joined = dir.join(&self.program);
                std::env::current_dir()
                    .map(|cwd| cwd.join(&joined))
                    .unwrap_or(joined)
            }
            _ => self.program.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_args_in_order() {
        let spec = CommandSpec::new("make").arg("-C").arg("..");
        assert_eq!(spec.arguments(), &["-C".to_string(), "..".to_string()]);
        assert_eq!(spec.display(), "make -C ..");
    }

    #[test]
    fn test_args_extends() {
        let spec = CommandSpec::new("scan-build").args(["make", "-C", ".."]);
        assert_eq!(spec.display(), "scan-build make -C ..");
    }

    #[test]
    fn test_defaults() {
        let spec = CommandSpec::new("./valgrind.sh");
        assert!(spec.working_dir().is_none());
        assert!(spec.timeout_duration().is_none());
        assert_eq!(spec.program_name(), "./valgrind.sh");
    }

    #[test]
    fn test_timeout_builder() {
        let spec = CommandSpec::new("x").timeout(Some(Duration::from_secs(3)));
        assert_eq!(spec.timeout_duration(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_bare_program_is_not_resolved() {
        let spec = CommandSpec::new("make").current_dir("/tmp");
        assert_eq!(spec.resolved_program(), PathBuf::from("make"));
    }

    #[test]
    fn test_relative_script_resolved_against_working_dir() {
        let spec = CommandSpec::new("./valgrind.sh").current_dir("/opt/tests");
        assert_eq!(
            spec.resolved_program(),
            PathBuf::from("/opt/tests/./valgrind.sh")
        );
    }

    #[test]
    fn test_relative_script_without_dir_is_left_alone() {
        let spec = CommandSpec::new("./valgrind.sh");
        assert_eq!(spec.resolved_program(), PathBuf::from("./valgrind.sh"));
    }
}
