//! Error types for sift-core.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sift-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Conflicted paths remain, so the operation cannot proceed.
    #[error("unresolved conflicts in: {}", .0.join(", "))]
    UnresolvedConflicts(Vec<String>),

    /// The remote refused our credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote refused a ref update.
    #[error("rejected by remote: {0}")]
    Rejected(String),

    /// Git reported a failure with no more specific meaning.
    #[error("{operation} failed: {message}")]
    OperationFailed {
        /// Command that failed.
        operation: String,
        /// Best error line from git.
        message: String,
    },

    /// Continue/abort/skip with nothing in progress.
    #[error("no merge, rebase, cherry-pick or revert in progress")]
    NoOperationInProgress,

    /// A resolution action ran but git still reports the path as conflicted.
    #[error("{path} is still conflicted after {action}")]
    ResolutionFailed {
        /// Path that was being resolved.
        path: String,
        /// Action that was applied.
        action: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Git boundary error.
    #[error("git error: {0}")]
    Git(#[from] sift_git::Error),
}

impl Error {
    /// Whether the error leaves conflicts for the user to settle.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::UnresolvedConflicts(_))
    }
}
