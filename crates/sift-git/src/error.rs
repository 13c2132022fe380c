//! Error types for sift-git.

use std::time::Duration;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the git boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// Repository has no working directory.
    #[error("bare repositories are not supported")]
    BareRepository,

    /// The git executable could not be started.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The invocation did not finish in time and was killed.
    #[error("`git {command}` timed out after {}s", .timeout.as_secs())]
    Timeout {
        /// Space-joined arguments.
        command: String,
        /// Timeout that expired.
        timeout: Duration,
    },

    /// Non-zero exit without a recognized domain meaning.
    #[error("`git {command}` failed (exit code {code}): {message}")]
    CommandFailed {
        /// Space-joined arguments.
        command: String,
        /// Process exit code.
        code: i32,
        /// Best error line from the output.
        message: String,
    },

    /// Blame output was incoherent for the whole file.
    #[error("cannot blame {path}: {reason}")]
    FileNotBlamable {
        /// Path that was blamed.
        path: String,
        /// Why the output was rejected.
        reason: String,
    },

    /// The requested action does not exist for this operation.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error (repository discovery).
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}

impl Error {
    /// Returns true for failures of the process primitive itself.
    #[must_use]
    pub const fn is_process_error(&self) -> bool {
        matches!(
            self,
            Self::Spawn { .. } | Self::Timeout { .. } | Self::CommandFailed { .. }
        )
    }
}
