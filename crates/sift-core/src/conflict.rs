//! Conflict resolution.

use std::fmt;

use serde::Serialize;
use sift_git::{ConflictSide, GitOps};

use crate::error::{Error, Result};

/// How a conflicted path was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionAction {
    /// Keep our side (index stage 2).
    AcceptCurrent,
    /// Take their side (index stage 3).
    AcceptIncoming,
    /// Stage the working-tree file as edited.
    MarkResolved,
}

impl fmt::Display for ResolutionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AcceptCurrent => "accept-current",
            Self::AcceptIncoming => "accept-incoming",
            Self::MarkResolved => "mark-resolved",
        })
    }
}

/// Result of one resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutcome {
    pub path: String,
    pub action: ResolutionAction,
    /// False when the path was already resolved and nothing ran.
    pub was_conflicted: bool,
}

/// Settles conflicted paths one at a time and checks that git agrees.
pub struct ConflictResolver<'a, G: GitOps> {
    git: &'a G,
}

impl<'a, G: GitOps> ConflictResolver<'a, G> {
    #[must_use]
    pub const fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Keep our version of `path`.
    ///
    /// # Errors
    /// Returns [`Error::ResolutionFailed`] if git still reports the path as
    /// conflicted afterwards.
    pub async fn accept_current(&self, path: &str) -> Result<ResolutionOutcome> {
        self.resolve(path, ResolutionAction::AcceptCurrent).await
    }

    /// Take their version of `path`.
    ///
    /// # Errors
    /// Returns [`Error::ResolutionFailed`] if git still reports the path as
    /// conflicted afterwards.
    pub async fn accept_incoming(&self, path: &str) -> Result<ResolutionOutcome> {
        self.resolve(path, ResolutionAction::AcceptIncoming).await
    }

    /// Stage the hand-edited working-tree version of `path`.
    ///
    /// # Errors
    /// Returns [`Error::ResolutionFailed`] if git still reports the path as
    /// conflicted afterwards.
    pub async fn mark_resolved(&self, path: &str) -> Result<ResolutionOutcome> {
        self.resolve(path, ResolutionAction::MarkResolved).await
    }

    /// Apply `action` to each path in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first resolution error.
    pub async fn resolve_all<S: AsRef<str>>(
        &self,
        paths: &[S],
        action: ResolutionAction,
    ) -> Result<Vec<ResolutionOutcome>> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(self.resolve(path.as_ref(), action).await?);
        }
        Ok(outcomes)
    }

    async fn resolve(&self, path: &str, action: ResolutionAction) -> Result<ResolutionOutcome> {
        if !self.git.status(false).await?.is_conflicted(path) {
            tracing::debug!(path, %action, "path not conflicted, nothing to do");
            return Ok(ResolutionOutcome {
                path: path.to_string(),
                action,
                was_conflicted: false,
            });
        }

        match action {
            ResolutionAction::AcceptCurrent => {
                self.git
                    .checkout_conflict_side(path, ConflictSide::Ours)
                    .await?;
            }
            ResolutionAction::AcceptIncoming => {
                self.git
                    .checkout_conflict_side(path, ConflictSide::Theirs)
                    .await?;
            }
            ResolutionAction::MarkResolved => self.git.stage(path).await?,
        }

        if self.git.status(false).await?.is_conflicted(path) {
            return Err(Error::ResolutionFailed {
                path: path.to_string(),
                action: action.to_string(),
            });
        }

        tracing::info!(path, %action, "resolved conflict");
        Ok(ResolutionOutcome {
            path: path.to_string(),
            action,
            was_conflicted: true,
        })
    }
}
