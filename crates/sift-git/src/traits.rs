//! Trait abstractions for git operations.
//!
//! Capabilities are split by concern so consumers can depend on only what
//! they use; [`GitOps`] bundles them all. Every method is async because each
//! one awaits a git process.

use std::future::Future;
use std::path::Path;

use crate::blame::BlameLine;
use crate::diff::{Diff, DiffOptions};
use crate::integrate::{ConflictSide, PushOptions, ResetMode};
use crate::outcome::{
    CherryPickResult, FetchResult, MergeResult, OperationKind, PullResult, PushResult,
    RebaseResult, ResetResult, RevertResult, StepAction, StepResult,
};
use crate::repository::Repository;
use crate::runner::CommandRunner;
use crate::status::StatusSnapshot;
use crate::Result;

/// Where a repository lives on disk.
pub trait RepositoryContext: Send + Sync {
    /// Root of the working tree.
    fn workdir(&self) -> &Path;

    /// Directory holding operation marker files.
    fn git_dir(&self) -> &Path;
}

/// Working-tree status.
#[allow(clippy::missing_errors_doc)]
pub trait StatusOps: RepositoryContext {
    /// Parse the current status.
    fn status(&self, include_ignored: bool) -> impl Future<Output = Result<StatusSnapshot>> + Send;
}

/// Diffs.
#[allow(clippy::missing_errors_doc)]
pub trait DiffOps: RepositoryContext {
    /// Parse the diff selected by `options`.
    fn diff(&self, options: &DiffOptions) -> impl Future<Output = Result<Diff>> + Send;
}

/// Line attribution.
#[allow(clippy::missing_errors_doc)]
pub trait BlameOps: RepositoryContext {
    /// Blame `path`; fails as a whole on incoherent output.
    fn blame(&self, path: &str) -> impl Future<Output = Result<Vec<BlameLine>>> + Send;
}

/// Commands that talk to a remote.
#[allow(clippy::missing_errors_doc)]
pub trait RemoteOps: RepositoryContext {
    /// Fetch one remote, or all when `None`.
    fn fetch(
        &self,
        remote: Option<&str>,
        prune: bool,
    ) -> impl Future<Output = Result<FetchResult>> + Send;

    /// Pull into the current branch.
    fn pull(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        rebase: bool,
    ) -> impl Future<Output = Result<PullResult>> + Send;

    /// Push refs.
    fn push(&self, options: &PushOptions) -> impl Future<Output = Result<PushResult>> + Send;
}

/// Commands that rewrite history and the sequencer steps that resume them.
#[allow(clippy::missing_errors_doc)]
pub trait MergeOps: RepositoryContext {
    fn merge(&self, rev: &str, no_ff: bool) -> impl Future<Output = Result<MergeResult>> + Send;

    fn rebase(&self, upstream: &str) -> impl Future<Output = Result<RebaseResult>> + Send;

    fn cherry_pick(&self, commit: &str) -> impl Future<Output = Result<CherryPickResult>> + Send;

    fn revert(&self, commit: &str) -> impl Future<Output = Result<RevertResult>> + Send;

    fn reset(
        &self,
        target: &str,
        mode: ResetMode,
    ) -> impl Future<Output = Result<ResetResult>> + Send;

    /// `--continue`, `--skip` or `--abort` on a stopped operation.
    fn step(
        &self,
        operation: OperationKind,
        action: StepAction,
    ) -> impl Future<Output = Result<StepResult>> + Send;
}

/// Index updates used to settle conflicts.
#[allow(clippy::missing_errors_doc)]
pub trait IndexOps: RepositoryContext {
    /// Stage the working-tree version of `path`.
    fn stage(&self, path: &str) -> impl Future<Output = Result<()>> + Send;

    /// Take one side's version of a conflicted `path` and stage it.
    fn checkout_conflict_side(
        &self,
        path: &str,
        side: ConflictSide,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Every git capability.
pub trait GitOps: StatusOps + DiffOps + BlameOps + RemoteOps + MergeOps + IndexOps {}

impl<T> GitOps for T where T: StatusOps + DiffOps + BlameOps + RemoteOps + MergeOps + IndexOps {}

// === Repository implementation ===

impl<R: CommandRunner> RepositoryContext for Repository<R> {
    fn workdir(&self) -> &Path {
        Self::workdir(self)
    }

    fn git_dir(&self) -> &Path {
        Self::git_dir(self)
    }
}

impl<R: CommandRunner> StatusOps for Repository<R> {
    async fn status(&self, include_ignored: bool) -> Result<StatusSnapshot> {
        Self::status(self, include_ignored).await
    }
}

impl<R: CommandRunner> DiffOps for Repository<R> {
    async fn diff(&self, options: &DiffOptions) -> Result<Diff> {
        Self::diff(self, options).await
    }
}

impl<R: CommandRunner> BlameOps for Repository<R> {
    async fn blame(&self, path: &str) -> Result<Vec<BlameLine>> {
        Self::blame(self, path).await
    }
}

impl<R: CommandRunner> RemoteOps for Repository<R> {
    async fn fetch(&self, remote: Option<&str>, prune: bool) -> Result<FetchResult> {
        Self::fetch(self, remote, prune).await
    }

    async fn pull(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        rebase: bool,
    ) -> Result<PullResult> {
        Self::pull(self, remote, branch, rebase).await
    }

    async fn push(&self, options: &PushOptions) -> Result<PushResult> {
        Self::push(self, options).await
    }
}

impl<R: CommandRunner> MergeOps for Repository<R> {
    async fn merge(&self, rev: &str, no_ff: bool) -> Result<MergeResult> {
        Self::merge(self, rev, no_ff).await
    }

    async fn rebase(&self, upstream: &str) -> Result<RebaseResult> {
        Self::rebase(self, upstream).await
    }

    async fn cherry_pick(&self, commit: &str) -> Result<CherryPickResult> {
        Self::cherry_pick(self, commit).await
    }

    async fn revert(&self, commit: &str) -> Result<RevertResult> {
        Self::revert(self, commit).await
    }

    async fn reset(&self, target: &str, mode: ResetMode) -> Result<ResetResult> {
        Self::reset(self, target, mode).await
    }

    async fn step(&self, operation: OperationKind, action: StepAction) -> Result<StepResult> {
        Self::step(self, operation, action).await
    }
}

impl<R: CommandRunner> IndexOps for Repository<R> {
    async fn stage(&self, path: &str) -> Result<()> {
        Self::stage(self, path).await
    }

    async fn checkout_conflict_side(&self, path: &str, side: ConflictSide) -> Result<()> {
        Self::checkout_conflict_side(self, path, side).await
    }
}
