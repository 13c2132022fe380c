//! Operation state tracking.
//!
//! Git leaves marker files in the git dir while a merge, rebase, cherry-pick
//! or revert is stopped. The tracker reads those markers and the current
//! status on every call and holds nothing between calls, so it can never
//! disagree with the repository.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use sift_git::{ConflictedFile, GitOps, OperationKind, StepAction, StepResult};

use crate::error::{Error, Result};

/// Which long-running operation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(
    tag = "state",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum OperationState {
    /// Nothing in progress.
    None,

    /// A merge stopped, usually on conflicts.
    MergeInProgress { conflict_count: usize },

    /// A rebase stopped at step `current` of `total`.
    RebaseInProgress { current: u32, total: u32 },

    CherryPickInProgress,

    RevertInProgress,
}

impl OperationState {
    /// The operation that continue/abort/skip would drive.
    #[must_use]
    pub const fn kind(&self) -> Option<OperationKind> {
        match self {
            Self::None => None,
            Self::MergeInProgress { .. } => Some(OperationKind::Merge),
            Self::RebaseInProgress { .. } => Some(OperationKind::Rebase),
            Self::CherryPickInProgress => Some(OperationKind::CherryPick),
            Self::RevertInProgress => Some(OperationKind::Revert),
        }
    }

    /// Whether any operation is in progress.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("no operation in progress"),
            Self::MergeInProgress { conflict_count } => {
                write!(f, "merge in progress ({conflict_count} conflicted)")
            }
            Self::RebaseInProgress { current, total } => {
                write!(f, "rebase in progress ({current}/{total})")
            }
            Self::CherryPickInProgress => f.write_str("cherry-pick in progress"),
            Self::RevertInProgress => f.write_str("revert in progress"),
        }
    }
}

/// State plus the conflicted paths and any marker inconsistencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSnapshot {
    pub state: OperationState,
    pub conflicted_files: Vec<ConflictedFile>,
    pub warnings: Vec<String>,
}

/// A marker file git leaves behind for a stopped operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Rebase { current: u32, total: u32 },
    Merge,
    CherryPick,
    Revert,
}

impl Marker {
    const fn name(self) -> &'static str {
        match self {
            Self::Rebase { .. } => "rebase",
            Self::Merge => "MERGE_HEAD",
            Self::CherryPick => "CHERRY_PICK_HEAD",
            Self::Revert => "REVERT_HEAD",
        }
    }
}

/// Markers present in `git_dir`, highest priority first.
fn detect_markers(git_dir: &Path) -> Vec<Marker> {
    let mut markers = Vec::new();

    let merge_dir = git_dir.join("rebase-merge");
    let apply_dir = git_dir.join("rebase-apply");
    if merge_dir.is_dir() {
        markers.push(Marker::Rebase {
            current: read_counter(&merge_dir, "msgnum"),
            total: read_counter(&merge_dir, "end"),
        });
    } else if apply_dir.is_dir() {
        markers.push(Marker::Rebase {
            current: read_counter(&apply_dir, "next"),
            total: read_counter(&apply_dir, "last"),
        });
    }

    if git_dir.join("MERGE_HEAD").exists() {
        markers.push(Marker::Merge);
    }
    if git_dir.join("CHERRY_PICK_HEAD").exists() {
        markers.push(Marker::CherryPick);
    }
    if git_dir.join("REVERT_HEAD").exists() {
        markers.push(Marker::Revert);
    }

    markers
}

/// A progress counter file; missing or garbled reads as 0.
fn read_counter(dir: &Path, name: &str) -> u32 {
    fs::read_to_string(dir.join(name))
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

/// Reads operation state and drives continue/abort/skip.
pub struct OperationTracker<'a, G: GitOps> {
    git: &'a G,
}

impl<'a, G: GitOps> OperationTracker<'a, G> {
    /// Create a tracker over a repository.
    #[must_use]
    pub const fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Current state, recomputed from disk.
    ///
    /// # Errors
    /// Returns error if status cannot be read.
    pub async fn state(&self) -> Result<OperationState> {
        Ok(self.snapshot().await?.state)
    }

    /// Paths git currently reports as unmerged, whatever the state.
    ///
    /// # Errors
    /// Returns error if status cannot be read.
    pub async fn conflicted_files(&self) -> Result<Vec<ConflictedFile>> {
        Ok(self.git.status(false).await?.conflicted())
    }

    /// State, conflicted files and marker warnings in one read.
    ///
    /// # Errors
    /// Returns error if status cannot be read.
    pub async fn snapshot(&self) -> Result<OperationSnapshot> {
        let markers = detect_markers(self.git.git_dir());
        let conflicted_files = self.conflicted_files().await?;

        let mut warnings = Vec::new();
        if markers.len() > 1 {
            let names: Vec<_> = markers.iter().map(|m| m.name()).collect();
            let message = format!(
                "several operations marked in progress ({}); reporting {}",
                names.join(", "),
                names[0]
            );
            tracing::warn!(markers = ?names, "{message}");
            warnings.push(message);
        }

        let state = match markers.first() {
            None => OperationState::None,
            Some(Marker::Rebase { current, total }) => OperationState::RebaseInProgress {
                current: *current,
                total: *total,
            },
            Some(Marker::Merge) => OperationState::MergeInProgress {
                conflict_count: conflicted_files.len(),
            },
            Some(Marker::CherryPick) => OperationState::CherryPickInProgress,
            Some(Marker::Revert) => OperationState::RevertInProgress,
        };
        tracing::debug!(%state, conflicts = conflicted_files.len(), "operation state");

        Ok(OperationSnapshot {
            state,
            conflicted_files,
            warnings,
        })
    }

    /// Resume the stopped operation once every conflict is settled.
    ///
    /// # Errors
    /// Returns [`Error::NoOperationInProgress`] when idle and
    /// [`Error::UnresolvedConflicts`] while unmerged paths remain.
    pub async fn continue_operation(&self) -> Result<StepResult> {
        let snapshot = self.snapshot().await?;
        let kind = snapshot.state.kind().ok_or(Error::NoOperationInProgress)?;

        if !snapshot.conflicted_files.is_empty() {
            return Err(Error::UnresolvedConflicts(
                snapshot
                    .conflicted_files
                    .into_iter()
                    .map(|c| c.path)
                    .collect(),
            ));
        }

        self.step(kind, StepAction::Continue).await
    }

    /// Abandon the stopped operation and restore the pre-operation state.
    ///
    /// # Errors
    /// Returns [`Error::NoOperationInProgress`] when idle.
    pub async fn abort_operation(&self) -> Result<StepResult> {
        let kind = self.state().await?.kind().ok_or(Error::NoOperationInProgress)?;
        self.step(kind, StepAction::Abort).await
    }

    /// Drop the current commit of a rebase, cherry-pick or revert.
    ///
    /// # Errors
    /// Returns [`Error::NoOperationInProgress`] when idle, and an unsupported
    /// git error for a merge.
    pub async fn skip_operation(&self) -> Result<StepResult> {
        let kind = self.state().await?.kind().ok_or(Error::NoOperationInProgress)?;
        if kind == OperationKind::Merge {
            return Err(sift_git::Error::Unsupported("a merge cannot be skipped".into()).into());
        }
        self.step(kind, StepAction::Skip).await
    }

    async fn step(&self, kind: OperationKind, action: StepAction) -> Result<StepResult> {
        tracing::info!(operation = %kind, action = action.flag(), "stepping operation");
        let result = self.git.step(kind, action).await?;
        if result.has_conflicts {
            tracing::info!(
                operation = %kind,
                conflicts = result.conflicts.len(),
                "operation stopped on new conflicts"
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_mocks::MockGitOps;
    use sift_git::ConflictType;

    #[test]
    fn test_no_markers() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(detect_markers(temp.path()).is_empty());
    }

    #[test]
    fn test_rebase_merge_progress() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("rebase-merge");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("msgnum"), "2\n").unwrap();
        fs::write(dir.join("end"), "5\n").unwrap();

        assert_eq!(
            detect_markers(temp.path()),
            vec![Marker::Rebase {
                current: 2,
                total: 5
            }]
        );
    }

    #[test]
    fn test_rebase_apply_progress() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("rebase-apply");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("next"), "1").unwrap();
        fs::write(dir.join("last"), "3").unwrap();

        assert_eq!(
            detect_markers(temp.path()),
            vec![Marker::Rebase {
                current: 1,
                total: 3
            }]
        );
    }

    #[test]
    fn test_garbled_counter_reads_zero() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("rebase-merge");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("msgnum"), "two").unwrap();

        assert_eq!(
            detect_markers(temp.path()),
            vec![Marker::Rebase {
                current: 0,
                total: 0
            }]
        );
    }

    #[test]
    fn test_state_kind_and_display() {
        assert_eq!(OperationState::None.kind(), None);
        assert!(!OperationState::None.is_in_progress());
        assert_eq!(
            OperationState::RebaseInProgress { current: 1, total: 4 }.kind(),
            Some(OperationKind::Rebase)
        );
        assert_eq!(
            OperationState::MergeInProgress { conflict_count: 2 }.to_string(),
            "merge in progress (2 conflicted)"
        );
    }

    #[tokio::test]
    async fn test_idle_snapshot() {
        let mock = MockGitOps::new();
        let snapshot = OperationTracker::new(&mock).snapshot().await.unwrap();
        assert_eq!(snapshot.state, OperationState::None);
        assert!(snapshot.conflicted_files.is_empty());
        assert!(snapshot.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_merge_counts_conflicts_from_status() {
        let mock = MockGitOps::new()
            .with_marker("MERGE_HEAD")
            .with_conflict("a.rs", ConflictType::Content)
            .with_conflict("b.rs", ConflictType::BothAdded);

        let tracker = OperationTracker::new(&mock);
        assert_eq!(
            tracker.state().await.unwrap(),
            OperationState::MergeInProgress { conflict_count: 2 }
        );

        // Resolving outside the tracker is picked up on the next read
        mock.clear_conflict("a.rs");
        assert_eq!(
            tracker.state().await.unwrap(),
            OperationState::MergeInProgress { conflict_count: 1 }
        );
    }

    #[tokio::test]
    async fn test_multiple_markers_warn_and_follow_priority() {
        let mock = MockGitOps::new()
            .with_marker("MERGE_HEAD")
            .with_marker("CHERRY_PICK_HEAD");

        let snapshot = OperationTracker::new(&mock).snapshot().await.unwrap();
        assert_eq!(
            snapshot.state,
            OperationState::MergeInProgress { conflict_count: 0 }
        );
        assert_eq!(snapshot.warnings.len(), 1);
        assert!(snapshot.warnings[0].contains("CHERRY_PICK_HEAD"));
    }

    #[tokio::test]
    async fn test_rebase_outranks_merge() {
        let mock = MockGitOps::new()
            .with_marker("MERGE_HEAD")
            .with_marker("rebase-merge/");

        let state = OperationTracker::new(&mock).state().await.unwrap();
        assert!(matches!(state, OperationState::RebaseInProgress { .. }));
    }

    #[tokio::test]
    async fn test_continue_refuses_with_conflicts() {
        let mock = MockGitOps::new()
            .with_marker("CHERRY_PICK_HEAD")
            .with_conflict("a.rs", ConflictType::Content);

        let err = OperationTracker::new(&mock)
            .continue_operation()
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(err, Error::UnresolvedConflicts(ref paths) if paths == &["a.rs"]));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_continue_after_resolution() {
        let mock = MockGitOps::new().with_marker("REVERT_HEAD");

        let result = OperationTracker::new(&mock)
            .continue_operation()
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.operation, OperationKind::Revert);
        assert_eq!(mock.calls(), vec!["revert --continue"]);
    }

    #[tokio::test]
    async fn test_continue_can_stop_again() {
        let mock = MockGitOps::new()
            .with_marker("rebase-merge/")
            .with_output(sift_git::CommandOutput::new(
                "CONFLICT (content): Merge conflict in b.rs\n",
                "error: could not apply 1234567... second\n",
                1,
            ));

        let result = OperationTracker::new(&mock)
            .continue_operation()
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.has_conflicts);
        assert_eq!(result.conflicts[0].path, "b.rs");
    }

    #[tokio::test]
    async fn test_abort_ignores_conflicts() {
        let mock = MockGitOps::new()
            .with_marker("MERGE_HEAD")
            .with_conflict("a.rs", ConflictType::Content);

        OperationTracker::new(&mock).abort_operation().await.unwrap();
        assert_eq!(mock.calls(), vec!["merge --abort"]);
    }

    #[tokio::test]
    async fn test_idle_steps_fail() {
        let mock = MockGitOps::new();
        let tracker = OperationTracker::new(&mock);

        assert!(matches!(
            tracker.continue_operation().await,
            Err(Error::NoOperationInProgress)
        ));
        assert!(matches!(
            tracker.abort_operation().await,
            Err(Error::NoOperationInProgress)
        ));
        assert!(matches!(
            tracker.skip_operation().await,
            Err(Error::NoOperationInProgress)
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_merge_cannot_be_skipped() {
        let mock = MockGitOps::new().with_marker("MERGE_HEAD");
        let err = OperationTracker::new(&mock)
            .skip_operation()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Git(sift_git::Error::Unsupported(_))));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skip_rebase_step() {
        let mock = MockGitOps::new().with_marker("rebase-apply/");
        OperationTracker::new(&mock).skip_operation().await.unwrap();
        assert_eq!(mock.calls(), vec!["rebase --skip"]);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = OperationSnapshot {
            state: OperationState::RebaseInProgress { current: 1, total: 2 },
            conflicted_files: vec![],
            warnings: vec![],
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"]["state"], "rebaseInProgress");
        assert_eq!(json["state"]["total"], 2);
        assert!(json["conflictedFiles"].as_array().unwrap().is_empty());
    }
}
