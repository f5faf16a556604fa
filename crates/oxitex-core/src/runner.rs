//! Command execution seam.
//!
//! All external processes go through the [`CommandRunner`] trait so the
//! orchestration logic in [`crate::compile`] can be exercised in tests with a
//! scripted runner instead of a real TeX installation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// A fully specified external command: what to run, where, and for how long.
///
/// The working directory is always explicit. Nothing in this crate ever
/// changes the calling process's own current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name, resolved against `PATH` at spawn time.
    pub program: String,
    pub args: Vec<String>,
    /// Directory the child starts in.
    pub workdir: PathBuf,
    /// Wall-clock budget. The child is killed when it elapses.
    pub timeout: Duration,
}

/// What a finished child process left behind.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, with -1 standing in for signal-terminated children.
    pub code: i32,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Why a command produced no [`CapturedOutput`].
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The child outlived its budget and was killed.
    #[error("command timed out after {}s: {program}", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    /// The child could not be spawned or its output could not be collected.
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for spawning external commands.
///
/// Production code uses [`TokioCommandRunner`]; tests substitute a scripted
/// implementation that records invocations and replays canned outputs.
#[async_trait]
pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    /// Runs the command to completion, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// [`RunnerError::Timeout`] when the budget elapses (the child is killed
    /// first), [`RunnerError::Io`] when the spawn or collection fails.
    async fn run(&self, invocation: &Invocation) -> Result<CapturedOutput, RunnerError>;
}

/// Default [`CommandRunner`] backed by [`tokio::process::Command`].
#[derive(Debug)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CapturedOutput, RunnerError> {
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunnerError::Io {
                program: invocation.program.clone(),
                source: e,
            })?;

        // wait_with_output consumes the child. When the timeout fires first,
        // the dropped future takes the child with it and kill_on_drop reaps
        // the process instead of leaving it running.
        match timeout(invocation.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CapturedOutput {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                code: output.status.code().unwrap_or(-1),
            }),
            Ok(Err(e)) => Err(RunnerError::Io {
                program: invocation.program.clone(),
                source: e,
            }),
            Err(_) => Err(RunnerError::Timeout {
                program: invocation.program.clone(),
                timeout: invocation.timeout,
            }),
        }
    }
}

/// A scripted runner for tests: spawns nothing, records every invocation,
/// and replays outcomes in the order they were pushed.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outcomes: std::sync::Mutex<std::collections::VecDeque<Scripted>>,
    calls: std::sync::Mutex<Vec<Invocation>>,
}

#[cfg(test)]
#[derive(Debug)]
enum Scripted {
    Output(CapturedOutput),
    Timeout,
    Io(String),
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, stdout: &str, stderr: &str, code: i32) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Scripted::Output(CapturedOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                code,
            }));
    }

    pub fn push_timeout(&self) {
        self.outcomes.lock().unwrap().push_back(Scripted::Timeout);
    }

    pub fn push_io_failure(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Scripted::Io(message.to_string()));
    }

    /// Every invocation seen so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CapturedOutput, RunnerError> {
        self.calls.lock().unwrap().push(invocation.clone());
        let next = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted outcome left for {:?}", invocation.program));
        match next {
            Scripted::Output(output) => Ok(output),
            Scripted::Timeout => Err(RunnerError::Timeout {
                program: invocation.program.clone(),
                timeout: invocation.timeout,
            }),
            Scripted::Io(message) => Err(RunnerError::Io {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, message),
            }),
        }
    }
}
