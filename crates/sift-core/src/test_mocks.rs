//! Mock implementation of the git capability traits.
//!
//! Keeps a status snapshot in memory and a real temporary git dir so marker
//! files can be laid down for the operation tracker.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sift_git::traits::{
    BlameOps, DiffOps, IndexOps, MergeOps, RemoteOps, RepositoryContext, StatusOps,
};
use sift_git::{
    BlameLine, ChangeKind, CherryPickResult, CommandOutput, ConflictSide, ConflictType, Diff,
    DiffOptions, FetchResult, FileStatusEntry, MergeResult, OperationKind, PullResult,
    PushOptions, PushResult, RebaseResult, ResetMode, ResetResult, Result as GitResult,
    RevertResult, StatusSnapshot, StepAction, StepResult,
};
use tempfile::TempDir;

/// In-memory repository for testing tracker and resolver logic.
pub struct MockGitOps {
    git_dir: TempDir,
    workdir: PathBuf,
    status: Mutex<StatusSnapshot>,
    calls: Mutex<Vec<String>>,
    /// Paths that stay conflicted whatever is done to them.
    stuck: Vec<String>,
    /// What every mutating command prints.
    output: CommandOutput,
}

impl Default for MockGitOps {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::unwrap_used)]
impl MockGitOps {
    pub fn new() -> Self {
        let git_dir = TempDir::new().unwrap();
        let workdir = git_dir.path().to_path_buf();
        Self {
            git_dir,
            workdir,
            status: Mutex::new(StatusSnapshot::default()),
            calls: Mutex::new(Vec::new()),
            stuck: Vec::new(),
            output: CommandOutput::default(),
        }
    }

    /// Create a marker file, or a directory when `name` ends in `/`.
    pub fn with_marker(self, name: &str) -> Self {
        let path = self.git_dir.path().join(name.trim_end_matches('/'));
        if name.ends_with('/') {
            fs::create_dir_all(path).unwrap();
        } else {
            fs::write(path, "0000000000000000000000000000000000000000\n").unwrap();
        }
        self
    }

    pub fn with_conflict(self, path: &str, conflict_type: ConflictType) -> Self {
        self.status.lock().unwrap().entries.push(FileStatusEntry {
            path: path.to_string(),
            old_path: None,
            change_kind: ChangeKind::Modified,
            is_staged: false,
            is_conflicted: true,
            conflict_type: Some(conflict_type),
        });
        self
    }

    pub fn with_stuck_path(mut self, path: &str) -> Self {
        self.stuck.push(path.to_string());
        self
    }

    pub fn with_output(mut self, output: CommandOutput) -> Self {
        self.output = output;
        self
    }

    /// Settle `path` as if resolved by hand.
    pub fn clear_conflict(&self, path: &str) {
        self.status
            .lock()
            .unwrap()
            .entries
            .retain(|e| !(e.is_conflicted && e.path == path));
    }

    /// Commands issued so far, formatted like git arguments.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn settle(&self, path: &str) {
        if !self.stuck.iter().any(|p| p == path) {
            self.clear_conflict(path);
        }
    }
}

impl RepositoryContext for MockGitOps {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn git_dir(&self) -> &Path {
        self.git_dir.path()
    }
}

#[allow(clippy::unwrap_used)]
impl StatusOps for MockGitOps {
    async fn status(&self, _include_ignored: bool) -> GitResult<StatusSnapshot> {
        Ok(self.status.lock().unwrap().clone())
    }
}

impl DiffOps for MockGitOps {
    async fn diff(&self, _options: &DiffOptions) -> GitResult<Diff> {
        Ok(Diff::default())
    }
}

impl BlameOps for MockGitOps {
    async fn blame(&self, _path: &str) -> GitResult<Vec<BlameLine>> {
        Ok(Vec::new())
    }
}

impl RemoteOps for MockGitOps {
    async fn fetch(&self, _remote: Option<&str>, _prune: bool) -> GitResult<FetchResult> {
        self.record("fetch".into());
        Ok(FetchResult::from_output(&self.output))
    }

    async fn pull(
        &self,
        _remote: Option<&str>,
        _branch: Option<&str>,
        _rebase: bool,
    ) -> GitResult<PullResult> {
        self.record("pull".into());
        Ok(PullResult::from_output(&self.output))
    }

    async fn push(&self, _options: &PushOptions) -> GitResult<PushResult> {
        self.record("push".into());
        Ok(PushResult::from_output(&self.output))
    }
}

impl MergeOps for MockGitOps {
    async fn merge(&self, rev: &str, _no_ff: bool) -> GitResult<MergeResult> {
        self.record(format!("merge {rev}"));
        Ok(MergeResult::from_output(&self.output))
    }

    async fn rebase(&self, upstream: &str) -> GitResult<RebaseResult> {
        self.record(format!("rebase {upstream}"));
        Ok(RebaseResult::from_output(&self.output))
    }

    async fn cherry_pick(&self, commit: &str) -> GitResult<CherryPickResult> {
        self.record(format!("cherry-pick {commit}"));
        Ok(CherryPickResult::from_output(&self.output))
    }

    async fn revert(&self, commit: &str) -> GitResult<RevertResult> {
        self.record(format!("revert {commit}"));
        Ok(RevertResult::from_output(&self.output))
    }

    async fn reset(&self, target: &str, _mode: ResetMode) -> GitResult<ResetResult> {
        self.record(format!("reset {target}"));
        Ok(ResetResult::from_output(&self.output))
    }

    async fn step(&self, operation: OperationKind, action: StepAction) -> GitResult<StepResult> {
        self.record(format!("{} {}", operation.command(), action.flag()));
        Ok(StepResult::from_output(operation, action, &self.output))
    }
}

impl IndexOps for MockGitOps {
    async fn stage(&self, path: &str) -> GitResult<()> {
        self.record(format!("add {path}"));
        self.settle(path);
        Ok(())
    }

    async fn checkout_conflict_side(&self, path: &str, side: ConflictSide) -> GitResult<()> {
        let side = match side {
            ConflictSide::Ours => "--ours",
            ConflictSide::Theirs => "--theirs",
        };
        self.record(format!("checkout {side} {path}"));
        self.settle(path);
        Ok(())
    }
}
