//! Process launching
//!
//! Every engine operation is one blocking process call: arguments and
//! optional standard input in, exit status and captured output back.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into [`EngineError::Failed`]
    pub fn check(self, program: &Path) -> EngineResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(EngineError::Failed {
                program: program.display().to_string(),
                status: self.status,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs external programs
pub trait ProcessRunner {
    /// Run `program` to completion; a non-zero exit is not an error here
    fn run(&self, program: &Path, args: &[&str], stdin: Option<&str>) -> EngineResult<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str], stdin: Option<&str>) -> EngineResult<ProcessOutput> {
        debug!("Running {} {:?}", program.display(), args);
        let launch_error = |source| EngineError::Launch {
            program: program.display().to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch_error)?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).map_err(launch_error)?;
        }

        let output = child.wait_with_output().map_err(launch_error)?;
        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_keeps_output_on_failure() {
        let err = ProcessOutput::failed(1, "syntax error")
            .check(Path::new("/usr/bin/osascript"))
            .unwrap_err();
        match err {
            EngineError::Failed { status, stderr, .. } => {
                assert_eq!(status, Some(1));
                assert_eq!(stderr, "syntax error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failure_message_names_program() {
        let err = ProcessOutput::failed(2, "boom\n")
            .check(Path::new("/usr/bin/osascript"))
            .unwrap_err();
        assert_eq!(err.to_string(), "/usr/bin/osascript exited with status 2: boom");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_pipes_stdin() {
        let output = SystemRunner
            .run(Path::new("/bin/cat"), &[], Some("hello"))
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello");
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let err = SystemRunner
            .run(Path::new("/nonexistent/program"), &[], None)
            .unwrap_err();
        assert!(matches!(err, EngineError::Launch { .. }));
    }
}
