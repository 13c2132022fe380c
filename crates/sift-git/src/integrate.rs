//! Mutating commands: remote sync, history integration, index updates.
//!
//! Each command returns a result record even when git fails; only failures
//! of the process primitive itself surface as `Err`.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::outcome::{
    CherryPickResult, FetchResult, MergeResult, OperationKind, PullResult, PushResult,
    RebaseResult, ResetResult, RevertResult, StepAction, StepResult,
};
use crate::repository::Repository;
use crate::runner::CommandRunner;

/// Which side of a conflict to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictSide {
    /// The branch being merged into (stage 2).
    Ours,
    /// The branch being merged in (stage 3).
    Theirs,
}

impl ConflictSide {
    /// Index stage holding this side's version.
    #[must_use]
    pub const fn stage(self) -> u8 {
        match self {
            Self::Ours => 2,
            Self::Theirs => 3,
        }
    }

    const fn flag(self) -> &'static str {
        match self {
            Self::Ours => "--ours",
            Self::Theirs => "--theirs",
        }
    }
}

/// How far `git reset` rewinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResetMode {
    Soft,
    #[default]
    Mixed,
    Hard,
}

impl ResetMode {
    const fn flag(self) -> &'static str {
        match self {
            Self::Soft => "--soft",
            Self::Mixed => "--mixed",
            Self::Hard => "--hard",
        }
    }
}

/// Options for `git push`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOptions {
    /// Remote name; git's default when `None`.
    pub remote: Option<String>,
    /// Refspec or branch; git's default when `None`.
    pub refspec: Option<String>,
    /// Overwrite the remote ref if it still matches our tracking ref.
    pub force_with_lease: bool,
    /// Record the pushed branch as upstream.
    pub set_upstream: bool,
}

impl<R: CommandRunner> Repository<R> {
    // === Remote operations ===

    /// Fetch from `remote`, or from every remote when `None`.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn fetch(&self, remote: Option<&str>, prune: bool) -> Result<FetchResult> {
        let mut args = vec!["fetch", remote.unwrap_or("--all")];
        if prune {
            args.push("--prune");
        }
        let output = self.git_remote(&args).await?;
        Ok(FetchResult::from_output(&output))
    }

    /// Pull the upstream of the current branch.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn pull(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        rebase: bool,
    ) -> Result<PullResult> {
        let mut args = vec![
            "pull",
            "--no-edit",
            if rebase { "--rebase" } else { "--no-rebase" },
        ];
        args.extend(remote);
        args.extend(branch);
        let output = self.git_remote(&args).await?;
        Ok(PullResult::from_output(&output))
    }

    /// Push according to `options`.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn push(&self, options: &PushOptions) -> Result<PushResult> {
        let mut args = vec!["push"];
        if options.force_with_lease {
            args.push("--force-with-lease");
        }
        if options.set_upstream {
            args.push("--set-upstream");
        }
        args.extend(options.remote.as_deref());
        args.extend(options.refspec.as_deref());
        let output = self.git_remote(&args).await?;
        Ok(PushResult::from_output(&output))
    }

    // === History integration ===

    /// Merge `rev` into the current branch.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn merge(&self, rev: &str, no_ff: bool) -> Result<MergeResult> {
        let mut args = vec!["merge", "--no-edit"];
        if no_ff {
            args.push("--no-ff");
        }
        args.push(rev);
        let output = self.git(&args).await?;
        Ok(MergeResult::from_output(&output))
    }

    /// Rebase the current branch onto `upstream`.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn rebase(&self, upstream: &str) -> Result<RebaseResult> {
        let output = self.git(&["rebase", upstream]).await?;
        Ok(RebaseResult::from_output(&output))
    }

    /// Apply the change introduced by `commit`.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn cherry_pick(&self, commit: &str) -> Result<CherryPickResult> {
        let output = self.git(&["cherry-pick", commit]).await?;
        Ok(CherryPickResult::from_output(&output))
    }

    /// Create a commit undoing `commit`.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn revert(&self, commit: &str) -> Result<RevertResult> {
        let output = self.git(&["revert", "--no-edit", commit]).await?;
        Ok(RevertResult::from_output(&output))
    }

    /// Move `HEAD` to `target`.
    ///
    /// # Errors
    /// Returns error only if git cannot be run or times out.
    pub async fn reset(&self, target: &str, mode: ResetMode) -> Result<ResetResult> {
        let output = self.git(&["reset", mode.flag(), target]).await?;
        Ok(ResetResult::from_output(&output))
    }

    /// Continue, skip or abort a stopped operation.
    ///
    /// # Errors
    /// Returns [`Error::Unsupported`] for `merge --skip`, or an error if git
    /// cannot be run.
    pub async fn step(&self, operation: OperationKind, action: StepAction) -> Result<StepResult> {
        if operation == OperationKind::Merge && action == StepAction::Skip {
            return Err(Error::Unsupported("a merge cannot be skipped".to_string()));
        }
        let output = self.git(&[operation.command(), action.flag()]).await?;
        Ok(StepResult::from_output(operation, action, &output))
    }

    // === Index ===

    /// Stage the working-tree version of `path`.
    ///
    /// # Errors
    /// Returns error if git exits non-zero.
    pub async fn stage(&self, path: &str) -> Result<()> {
        self.git_checked(&["add", "--", path]).await?;
        Ok(())
    }

    /// Remove `path` from the index and working tree.
    ///
    /// # Errors
    /// Returns error if git exits non-zero.
    pub async fn remove(&self, path: &str) -> Result<()> {
        self.git_checked(&["rm", "--quiet", "--", path]).await?;
        Ok(())
    }

    /// Replace a conflicted `path` with one side's version and stage it.
    ///
    /// When that side has no stage (it deleted the file) the path is removed.
    ///
    /// # Errors
    /// Returns error if any git step exits non-zero.
    pub async fn checkout_conflict_side(&self, path: &str, side: ConflictSide) -> Result<()> {
        let stages = self.unmerged_stages(path).await?;
        if !stages.iter().any(|s| s.stage == side.stage()) {
            tracing::debug!(path, ?side, "side deleted the path, removing");
            return self.remove(path).await;
        }

        self.git_checked(&["checkout", side.flag(), "--", path]).await?;
        self.stage(path).await
    }
}
