//! Process primitive for invoking git.
//!
//! Everything above this module consumes `(stdout, stderr, exit_code)`
//! triples; nothing else spawns processes.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Captured output of a finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl CommandOutput {
    /// Build an output record (mostly useful in tests and mocks).
    #[must_use]
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Whether the process exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr, used as `raw_output` on result records.
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }

    /// The most useful single error text in this output.
    ///
    /// Prefers the first `error:`/`fatal:` line, then stderr, then stdout.
    #[must_use]
    pub fn error_message(&self) -> String {
        let flagged = self
            .stderr
            .lines()
            .chain(self.stdout.lines())
            .map(str::trim)
            .find(|l| l.starts_with("fatal:") || l.starts_with("error:"));
        if let Some(line) = flagged {
            return line.to_string();
        }

        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        if !stderr.is_empty() {
            stderr.to_string()
        } else if !stdout.is_empty() {
            stdout.to_string()
        } else {
            format!("command failed with exit code {}", self.exit_code)
        }
    }
}

/// Runs git and captures what it printed.
///
/// Implementations must fail with [`Error::Timeout`] rather than return
/// partial output when `timeout` expires, and must not leave the child
/// running.
pub trait CommandRunner: Send + Sync {
    /// Run git with `args` in `cwd`.
    fn run(
        &self,
        args: &[&str],
        cwd: &Path,
        timeout: Duration,
    ) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// Runs the real git executable through `tokio::process`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    /// Use `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific executable.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this runner spawns.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for GitCli {
    async fn run(&self, args: &[&str], cwd: &Path, timeout: Duration) -> Result<CommandOutput> {
        let command = args.join(" ");
        tracing::debug!(cwd = %cwd.display(), %command, "running git");

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(cwd)
            // English output keeps the prose scrapers in `outcome` stable
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_EDITOR", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| Error::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(%command, timeout_secs = timeout.as_secs(), "git timed out");
                return Err(Error::Timeout { command, timeout });
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(%command, exit_code, "git finished");

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }
}
