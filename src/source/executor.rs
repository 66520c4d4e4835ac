//! Running `git config` queries.

use super::error::ExecError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Runs a configuration query and returns its standard output.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, args: &[String]) -> Result<String, ExecError>;
}

#[async_trait]
impl<F> QueryExecutor for F
where
    F: Fn(&[String]) -> Result<String, ExecError> + Send + Sync,
{
    async fn execute(&self, args: &[String]) -> Result<String, ExecError> {
        self(args)
    }
}

/// Executor spawning the `git` binary.
///
/// The child is killed when the returned future is dropped or the timeout
/// elapses.
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: PathBuf,
    timeout: Option<Duration>,
    current_dir: Option<PathBuf>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
            timeout: None,
            current_dir: None,
        }
    }
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run another binary instead of `git`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

#[async_trait]
impl QueryExecutor for GitCommand {
    async fn execute(&self, args: &[String]) -> Result<String, ExecError> {
        let mut command = Command::new(&self.program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        debug!(program = %self.program.display(), ?args, "running config query");

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| ExecError::Timeout(limit))??,
            None => command.output().await?,
        };

        interpret(output)
    }
}

/// Map a finished process to its output.
///
/// `git config --get-regexp` exits with 1 when nothing matched, which is an
/// empty result rather than a failure.
pub(crate) fn interpret(output: Output) -> Result<String, ExecError> {
    if output.status.success() {
        return Ok(String::from_utf8(output.stdout)?);
    }
    if output.status.code() == Some(1) {
        return Ok(String::new());
    }
    Err(ExecError::Failed {
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
    })
}
