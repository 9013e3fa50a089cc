//! External process execution behind a trait so the compiler can be driven by
//! fakes in tests.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// What a process attempt needs: program, arguments, working directory, and a
/// wall-clock bound.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last non-empty lines of combined output, for log messages.
    pub fn tail(&self, lines: usize) -> String {
        let combined: Vec<&str> = self
            .stdout
            .lines()
            .chain(self.stderr.lines())
            .filter(|l| !l.trim().is_empty())
            .collect();
        let start = combined.len().saturating_sub(lines);
        combined[start..].join("\n")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exceeded {}s and was killed", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs the process to completion, capturing stdout and stderr. A process that
    /// outlives `spec.timeout` is killed and reported as `TimedOut`.
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError>;
}

/// Production runner backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        debug!(program = %spec.program, args = ?spec.args, cwd = %spec.cwd.display(), "Spawning process");

        let child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future (timeout or cancelled request) kills the child.
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ProcessOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(source)) => Err(ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            }),
            Err(_) => Err(ProcessError::TimedOut {
                program: spec.program.clone(),
                timeout: spec.timeout,
            }),
        }
    }
}
