//! Typed outcomes of mutating git commands.
//!
//! Every builder takes the captured [`CommandOutput`] and never fails:
//! a non-zero exit becomes `success = false` plus an error message, and
//! missing summaries leave counters at zero.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::runner::CommandOutput;
use crate::status::{ConflictType, ConflictedFile};

/// Stderr fragments meaning the remote refused a ref update.
const REJECTION_MARKERS: &[&str] = &[
    "non-fast-forward",
    "stale info",
    "[rejected]",
    "fetch first",
    "[remote rejected]",
];

/// Lowercased stderr fragments meaning credentials were missing or wrong.
const AUTH_MARKERS: &[&str] = &[
    "authentication failed",
    "permission denied",
    "could not read username",
    "terminal prompts disabled",
    "invalid username or password",
];

/// A resumable multi-step git operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Merge,
    Rebase,
    CherryPick,
    Revert,
}

impl OperationKind {
    /// The git subcommand driving this operation.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Rebase => "rebase",
            Self::CherryPick => "cherry-pick",
            Self::Revert => "revert",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// What to do with a stopped operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StepAction {
    Continue,
    Skip,
    Abort,
}

impl StepAction {
    /// The git flag for this action.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Continue => "--continue",
            Self::Skip => "--skip",
            Self::Abort => "--abort",
        }
    }
}

/// Common read access across result records.
pub trait OperationOutcome {
    /// The command did what was asked.
    fn succeeded(&self) -> bool;

    /// The best error line when it did not.
    fn error_message(&self) -> Option<&str>;

    /// Stdout followed by stderr.
    fn raw_output(&self) -> &str;

    /// Conflicts reported by the command.
    fn conflicts(&self) -> &[ConflictedFile] {
        &[]
    }

    /// The remote refused a ref update.
    fn rejected(&self) -> bool {
        false
    }

    /// Credentials were missing or wrong.
    fn auth_failed(&self) -> bool {
        false
    }

    /// Paths of [`Self::conflicts`].
    fn conflicting_files(&self) -> Vec<&str> {
        self.conflicts().iter().map(|c| c.path.as_str()).collect()
    }
}

/// `N files changed, M insertions(+), K deletions(-)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

/// Parse the first numeric change summary in `text`; zeros when absent.
#[must_use]
pub fn parse_change_summary(text: &str) -> ChangeSummary {
    let mut summary = ChangeSummary::default();
    let Some(line) = text
        .lines()
        .find(|l| l.contains(" changed") && l.contains("file"))
    else {
        return summary;
    };

    for part in line.split(',') {
        let part = part.trim();
        let Some(n) = part
            .split_whitespace()
            .next()
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        if part.contains("file") {
            summary.files_changed = n;
        } else if part.contains("insertion") {
            summary.insertions = n;
        } else if part.contains("deletion") {
            summary.deletions = n;
        }
    }
    summary
}

/// Extract conflicted paths from `CONFLICT (<reason>): ...` lines.
#[must_use]
pub fn parse_conflicts(text: &str) -> Vec<ConflictedFile> {
    let mut seen = HashSet::new();
    text.lines()
        .filter_map(|line| parse_conflict_line(line.trim()))
        .filter(|c| seen.insert(c.path.clone()))
        .collect()
}

fn parse_conflict_line(line: &str) -> Option<ConflictedFile> {
    let rest = line.strip_prefix("CONFLICT (")?;
    let (reason, description) = rest.split_once("): ")?;

    let (path, conflict_type) = match reason {
        "modify/delete" => {
            let (path, tail) = description.split_once(" deleted in ")?;
            let kind = if tail.starts_with("HEAD ") {
                ConflictType::DeletedModified
            } else {
                ConflictType::ModifiedDeleted
            };
            (path, kind)
        }
        "rename/rename" => {
            let path = description
                .split_once(" renamed to ")
                .map(|(p, _)| p)
                .or_else(|| {
                    description
                        .strip_prefix("Rename ")
                        .and_then(|d| d.split_once("->"))
                        .map(|(p, _)| p)
                })?;
            (path, ConflictType::RenameRename)
        }
        "rename/delete" => {
            let (_, tail) = description.split_once(" renamed to ")?;
            let (renamed, deleted_in) = tail.rsplit_once(", but deleted in ")?;
            let (path, _) = renamed.rsplit_once(" in ")?;
            let kind = if deleted_in.starts_with("HEAD") {
                ConflictType::DeletedModified
            } else {
                ConflictType::ModifiedDeleted
            };
            (path, kind)
        }
        "file/directory" | "directory/file" => {
            (moved_aside_path(description)?, ConflictType::Content)
        }
        "add/add" => (conflicted_path(description)?, ConflictType::BothAdded),
        _ => (conflicted_path(description)?, ConflictType::Content),
    };

    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    Some(ConflictedFile {
        path: path.to_string(),
        conflict_type,
    })
}

fn conflicted_path(description: &str) -> Option<&str> {
    if let Some(path) = description.strip_prefix("Merge conflict in ") {
        return Some(path);
    }
    let (_, path) = description.rsplit_once(" in ")?;
    Some(path.trim_end_matches('.'))
}

/// Where git parked the file that a directory displaced.
fn moved_aside_path(description: &str) -> Option<&str> {
    if let Some((_, tail)) = description.split_once("; moving it to ") {
        return tail.strip_suffix(" instead.").or(Some(tail));
    }
    let (_, path) = description.rsplit_once(" as ")?;
    Some(path.trim_end_matches('.'))
}

fn has_rejection(output: &CommandOutput) -> bool {
    !output.success() && REJECTION_MARKERS.iter().any(|m| output.stderr.contains(m))
}

fn has_auth_failure(output: &CommandOutput) -> bool {
    let stderr = output.stderr.to_lowercase();
    AUTH_MARKERS.iter().any(|m| stderr.contains(m))
}

fn contains_any(output: &CommandOutput, needles: &[&str]) -> bool {
    needles
        .iter()
        .any(|n| output.stdout.contains(n) || output.stderr.contains(n))
}

/// Shared assessment of a command's output.
struct Assessment {
    success: bool,
    conflicts: Vec<ConflictedFile>,
    error_message: Option<String>,
    raw_output: String,
}

impl Assessment {
    fn of(output: &CommandOutput) -> Self {
        let mut conflicts = parse_conflicts(&output.stdout);
        for extra in parse_conflicts(&output.stderr) {
            if !conflicts.iter().any(|c| c.path == extra.path) {
                conflicts.push(extra);
            }
        }

        let success = output.success() && conflicts.is_empty();
        let error_message = if success {
            None
        } else if output.success() {
            Some(format!("{} conflicted file(s)", conflicts.len()))
        } else {
            Some(output.error_message())
        };

        Self {
            success,
            conflicts,
            error_message,
            raw_output: output.combined(),
        }
    }
}

macro_rules! impl_outcome {
    (@conflicts) => {
        fn conflicts(&self) -> &[ConflictedFile] {
            &self.conflicts
        }
    };
    (@remote) => {
        fn rejected(&self) -> bool {
            self.was_rejected
        }

        fn auth_failed(&self) -> bool {
            self.authentication_failed
        }
    };
    ($ty:ty $(, $capability:ident)*) => {
        impl OperationOutcome for $ty {
            fn succeeded(&self) -> bool {
                self.success
            }

            fn error_message(&self) -> Option<&str> {
                self.error_message.as_deref()
            }

            fn raw_output(&self) -> &str {
                &self.raw_output
            }

            $(impl_outcome!(@$capability);)*
        }
    };
}

/// Outcome of `git fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub success: bool,
    /// Existing refs that moved.
    pub updated_refs: u32,
    /// Branches and tags seen for the first time.
    pub new_refs: u32,
    /// Remote-tracking refs deleted by `--prune`.
    pub pruned_refs: u32,
    pub was_rejected: bool,
    pub authentication_failed: bool,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl FetchResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        let mut result = Self {
            success: base.success,
            updated_refs: 0,
            new_refs: 0,
            pruned_refs: 0,
            was_rejected: has_rejection(output),
            authentication_failed: has_auth_failure(output),
            error_message: base.error_message,
            raw_output: base.raw_output,
        };

        for line in output.stderr.lines().chain(output.stdout.lines()) {
            let line = line.trim_start();
            if !line.contains("->") {
                continue;
            }
            if line.starts_with("* [new") {
                result.new_refs += 1;
            } else if line.starts_with("- [deleted]") {
                result.pruned_refs += 1;
            } else if line.contains("..") && !line.starts_with('!') {
                result.updated_refs += 1;
            }
        }
        result
    }
}

impl_outcome!(FetchResult, remote);

/// Outcome of `git pull`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResult {
    pub success: bool,
    pub is_fast_forward: bool,
    pub is_up_to_date: bool,
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictedFile>,
    pub was_rejected: bool,
    pub authentication_failed: bool,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl PullResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        let summary = parse_change_summary(&output.stdout);
        Self {
            success: base.success,
            is_fast_forward: contains_any(output, &["Fast-forward"]),
            is_up_to_date: is_up_to_date(output),
            files_changed: summary.files_changed,
            insertions: summary.insertions,
            deletions: summary.deletions,
            has_conflicts: !base.conflicts.is_empty(),
            conflicts: base.conflicts,
            was_rejected: has_rejection(output),
            authentication_failed: has_auth_failure(output),
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(PullResult, conflicts, remote);

/// Outcome of `git push`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResult {
    pub success: bool,
    /// Refs the remote accepted.
    pub pushed_refs: u32,
    pub is_up_to_date: bool,
    pub was_rejected: bool,
    pub authentication_failed: bool,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl PushResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        let pushed_refs = output
            .stderr
            .lines()
            .chain(output.stdout.lines())
            .map(str::trim_start)
            .filter(|l| l.contains("->") && !l.starts_with('!'))
            .filter(|l| l.starts_with("* [new") || l.contains(".."))
            .count();

        Self {
            success: base.success,
            pushed_refs: u32::try_from(pushed_refs).unwrap_or(u32::MAX),
            is_up_to_date: contains_any(output, &["Everything up-to-date"]),
            was_rejected: has_rejection(output),
            authentication_failed: has_auth_failure(output),
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(PushResult, remote);

/// Outcome of `git merge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub success: bool,
    pub is_fast_forward: bool,
    pub is_up_to_date: bool,
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictedFile>,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl MergeResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        let summary = parse_change_summary(&output.stdout);
        Self {
            success: base.success,
            is_fast_forward: contains_any(output, &["Fast-forward"]),
            is_up_to_date: is_up_to_date(output),
            files_changed: summary.files_changed,
            insertions: summary.insertions,
            deletions: summary.deletions,
            has_conflicts: !base.conflicts.is_empty(),
            conflicts: base.conflicts,
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(MergeResult, conflicts);

/// Outcome of starting `git rebase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebaseResult {
    pub success: bool,
    pub is_up_to_date: bool,
    /// Step the rebase stopped at, from `(k/n)`.
    pub current_step: Option<u32>,
    pub total_steps: Option<u32>,
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictedFile>,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl RebaseResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        let progress = parse_progress(&output.stdout).or_else(|| parse_progress(&output.stderr));
        Self {
            success: base.success,
            is_up_to_date: contains_any(output, &["is up to date"]),
            current_step: progress.map(|(k, _)| k),
            total_steps: progress.map(|(_, n)| n),
            has_conflicts: !base.conflicts.is_empty(),
            conflicts: base.conflicts,
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(RebaseResult, conflicts);

/// Outcome of `git cherry-pick`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CherryPickResult {
    pub success: bool,
    /// Abbreviated hash of the created commit.
    pub commit_hash: Option<String>,
    /// The pick introduced no changes.
    pub is_empty: bool,
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictedFile>,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl CherryPickResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        Self {
            success: base.success,
            commit_hash: parse_created_commit(&output.stdout),
            is_empty: contains_any(
                output,
                &["cherry-pick is now empty", "nothing to commit", "nothing added to commit"],
            ),
            has_conflicts: !base.conflicts.is_empty(),
            conflicts: base.conflicts,
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(CherryPickResult, conflicts);

/// Outcome of `git revert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertResult {
    pub success: bool,
    /// Abbreviated hash of the revert commit.
    pub commit_hash: Option<String>,
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictedFile>,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl RevertResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        Self {
            success: base.success,
            commit_hash: parse_created_commit(&output.stdout),
            has_conflicts: !base.conflicts.is_empty(),
            conflicts: base.conflicts,
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(RevertResult, conflicts);

/// Outcome of `git reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResult {
    pub success: bool,
    /// Commit from `HEAD is now at <hash> ...` (hard resets).
    pub head: Option<String>,
    /// Paths listed under `Unstaged changes after reset:`.
    pub unstaged_paths: Vec<String>,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl ResetResult {
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let base = Assessment::of(output);
        let head = output
            .stdout
            .lines()
            .find_map(|l| l.strip_prefix("HEAD is now at "))
            .and_then(|rest| rest.split_whitespace().next())
            .map(String::from);

        let unstaged_paths = output
            .stdout
            .lines()
            .skip_while(|l| !l.starts_with("Unstaged changes after reset"))
            .skip(1)
            .filter_map(|l| l.split_once('\t').map(|(_, path)| path.to_string()))
            .collect();

        Self {
            success: base.success,
            head,
            unstaged_paths,
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(ResetResult);

/// Outcome of `--continue`, `--skip` or `--abort` on a stopped operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub operation: OperationKind,
    pub action: StepAction,
    pub success: bool,
    /// The operation stopped again on new conflicts.
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictedFile>,
    pub error_message: Option<String>,
    pub raw_output: String,
}

impl StepResult {
    #[must_use]
    pub fn from_output(
        operation: OperationKind,
        action: StepAction,
        output: &CommandOutput,
    ) -> Self {
        let base = Assessment::of(output);
        Self {
            operation,
            action,
            success: base.success,
            has_conflicts: !base.conflicts.is_empty(),
            conflicts: base.conflicts,
            error_message: base.error_message,
            raw_output: base.raw_output,
        }
    }
}

impl_outcome!(StepResult, conflicts);

fn is_up_to_date(output: &CommandOutput) -> bool {
    contains_any(output, &["Already up to date", "Already up-to-date"])
}

/// The last `(k/n)` progress marker in `text`.
fn parse_progress(text: &str) -> Option<(u32, u32)> {
    text.match_indices('(')
        .filter_map(|(idx, _)| {
            let inner = text[idx + 1..].split_once(')')?.0;
            let (k, n) = inner.split_once('/')?;
            Some((k.parse().ok()?, n.parse().ok()?))
        })
        .last()
}

/// Hash from a `[branch abc1234] message` commit line.
fn parse_created_commit(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let inner = line.strip_prefix('[')?.split_once(']')?.0;
        let hash = inner.split_whitespace().last()?;
        (hash.len() >= 7 && hash.chars().all(|c| c.is_ascii_hexdigit())).then(|| hash.to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_conflict_scenario() {
        let output = CommandOutput::new(
            "Auto-merging a.txt\nCONFLICT (content): Merge conflict in a.txt\nAutomatic merge failed; fix conflicts and then commit the result.\n",
            "",
            1,
        );
        let result = MergeResult::from_output(&output);
        assert!(!result.success);
        assert!(result.has_conflicts);
        assert_eq!(result.conflicting_files(), vec!["a.txt"]);
        assert_eq!(result.conflicts[0].conflict_type, ConflictType::Content);
        assert!(result.error_message.is_some());
    }

    #[test]
    fn test_rename_delete_reports_renamed_path() {
        let output = CommandOutput::new(
            "CONFLICT (rename/delete): a.txt renamed to b.txt in HEAD, but deleted in feature.\nAutomatic merge failed; fix conflicts and then commit the result.\n",
            "",
            1,
        );
        let result = MergeResult::from_output(&output);
        assert_eq!(result.conflicting_files(), vec!["b.txt"]);
        assert_eq!(
            result.conflicts[0].conflict_type,
            ConflictType::ModifiedDeleted
        );
    }

    #[test]
    fn test_conflicts_fail_even_with_zero_exit() {
        let output = CommandOutput::new("CONFLICT (content): Merge conflict in b.rs\n", "", 0);
        let result = MergeResult::from_output(&output);
        assert!(!result.success);
        assert!(result.has_conflicts);
    }

    #[test]
    fn test_merge_success_summary() {
        let output = CommandOutput::new(
            "Updating abc1234..def5678\nFast-forward\n src/lib.rs | 4 +++-\n 2 files changed, 3 insertions(+), 1 deletion(-)\n",
            "",
            0,
        );
        let result = MergeResult::from_output(&output);
        assert!(result.success);
        assert!(result.is_fast_forward);
        assert_eq!(
            (result.files_changed, result.insertions, result.deletions),
            (2, 3, 1)
        );
        assert!(result.error_message.is_none());
    }

    #[test]
    fn test_missing_summary_defaults_to_zero() {
        assert_eq!(parse_change_summary("Already up to date.\n"), ChangeSummary::default());
        assert_eq!(
            parse_change_summary(" 1 file changed, 1 insertion(+)"),
            ChangeSummary {
                files_changed: 1,
                insertions: 1,
                deletions: 0
            }
        );
    }

    #[test]
    fn test_conflict_descriptions() {
        let text = "\
CONFLICT (modify/delete): gone.txt deleted in feature and modified in HEAD.  Version HEAD of gone.txt left in tree.
CONFLICT (modify/delete): mine.txt deleted in HEAD and modified in feature.  Version feature of mine.txt left in tree.
CONFLICT (add/add): Merge conflict in new.txt
CONFLICT (rename/rename): a.txt renamed to b.txt in HEAD and to c.txt in feature.
CONFLICT (content): Merge conflict in new.txt
CONFLICT (content): Merge conflict in docs/log in 2024.txt
CONFLICT (rename/delete): old.txt renamed to kept.txt in HEAD, but deleted in feature.
CONFLICT (rename/delete): src.txt renamed to dst.txt in feature, but deleted in HEAD.
CONFLICT (file/directory): directory in the way of x from HEAD; moving it to x~HEAD instead.
CONFLICT (directory/file): There is a directory with name y in feature. Adding y as y~HEAD
";
        let conflicts = parse_conflicts(text);
        let rows: Vec<_> = conflicts
            .iter()
            .map(|c| (c.path.as_str(), c.conflict_type))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("gone.txt", ConflictType::ModifiedDeleted),
                ("mine.txt", ConflictType::DeletedModified),
                ("new.txt", ConflictType::BothAdded),
                ("a.txt", ConflictType::RenameRename),
                ("docs/log in 2024.txt", ConflictType::Content),
                ("kept.txt", ConflictType::ModifiedDeleted),
                ("dst.txt", ConflictType::DeletedModified),
                ("x~HEAD", ConflictType::Content),
                ("y~HEAD", ConflictType::Content),
            ]
        );
    }

    #[test]
    fn test_push_rejected_scenario() {
        let output = CommandOutput::new(
            "",
            "To github.com:org/repo.git\n ! [rejected]        main -> main (non-fast-forward)\nerror: failed to push some refs\n",
            1,
        );
        let result = PushResult::from_output(&output);
        assert!(result.was_rejected);
        assert!(result.rejected());
        assert!(!result.success);
        assert_eq!(result.pushed_refs, 0);
        assert_eq!(
            result.error_message.as_deref(),
            Some("error: failed to push some refs")
        );
    }

    #[test]
    fn test_rejection_requires_failure_exit() {
        let output = CommandOutput::new("", "hint: stale info cached\n", 0);
        assert!(!PushResult::from_output(&output).was_rejected);
    }

    #[test]
    fn test_push_success() {
        let output = CommandOutput::new(
            "",
            "To example.com:repo.git\n   abc1234..def5678  main -> main\n * [new branch]      topic -> topic\n",
            0,
        );
        let result = PushResult::from_output(&output);
        assert!(result.success);
        assert_eq!(result.pushed_refs, 2);
    }

    #[test]
    fn test_authentication_failure() {
        let output = CommandOutput::new(
            "",
            "fatal: could not read Username for 'https://github.com': terminal prompts disabled\n",
            128,
        );
        let fetch = FetchResult::from_output(&output);
        assert!(fetch.authentication_failed);
        assert!(!fetch.success);
        assert!(PullResult::from_output(&output).auth_failed());
    }

    #[test]
    fn test_fetch_ref_counts() {
        let output = CommandOutput::new(
            "",
            "From example.com:repo\n   abc1234..def5678  main       -> origin/main\n * [new branch]      topic      -> origin/topic\n * [new tag]         v1.0       -> v1.0\n - [deleted]         (none)     -> origin/old\n",
            0,
        );
        let result = FetchResult::from_output(&output);
        assert_eq!(
            (result.updated_refs, result.new_refs, result.pruned_refs),
            (1, 2, 1)
        );
    }

    #[test]
    fn test_rebase_progress() {
        let output = CommandOutput::new(
            "",
            "Rebasing (1/3)\rRebasing (2/3)\nCONFLICT (content): Merge conflict in lib.rs\nerror: could not apply abc1234... change\n",
            1,
        );
        let result = RebaseResult::from_output(&output);
        assert_eq!((result.current_step, result.total_steps), (Some(2), Some(3)));
        assert!(result.has_conflicts);
        assert_eq!(result.error_message.as_deref(), Some("error: could not apply abc1234... change"));
    }

    #[test]
    fn test_cherry_pick_commit_and_empty() {
        let picked = CherryPickResult::from_output(&CommandOutput::new(
            "[main 1a2b3c4] Fix parser\n Date: Mon Jan 1 00:00:00 2024 +0000\n 1 file changed, 1 insertion(+)\n",
            "",
            0,
        ));
        assert!(picked.success);
        assert_eq!(picked.commit_hash.as_deref(), Some("1a2b3c4"));
        assert!(!picked.is_empty);

        let empty = CherryPickResult::from_output(&CommandOutput::new(
            "On branch main\nnothing to commit, working tree clean\n",
            "The previous cherry-pick is now empty, possibly due to conflict resolution.\n",
            1,
        ));
        assert!(empty.is_empty);
        assert!(!empty.success);
    }

    #[test]
    fn test_revert_detached_head() {
        let result = RevertResult::from_output(&CommandOutput::new(
            "[detached HEAD 9f8e7d6] Revert \"Fix parser\"\n",
            "",
            0,
        ));
        assert_eq!(result.commit_hash.as_deref(), Some("9f8e7d6"));
    }

    #[test]
    fn test_reset_output() {
        let mixed = ResetResult::from_output(&CommandOutput::new(
            "Unstaged changes after reset:\nM\tsrc/lib.rs\nD\told.rs\n",
            "",
            0,
        ));
        assert_eq!(mixed.unstaged_paths, vec!["src/lib.rs", "old.rs"]);
        assert_eq!(mixed.head, None);

        let hard = ResetResult::from_output(&CommandOutput::new(
            "HEAD is now at abc1234 Initial commit\n",
            "",
            0,
        ));
        assert_eq!(hard.head.as_deref(), Some("abc1234"));
    }

    #[test]
    fn test_step_result_carries_kind() {
        let result = StepResult::from_output(
            OperationKind::Rebase,
            StepAction::Continue,
            &CommandOutput::new("", "fatal: No rebase in progress?\n", 128),
        );
        assert_eq!(result.operation, OperationKind::Rebase);
        assert!(!result.succeeded());
        assert_eq!(
            result.error_message(),
            Some("fatal: No rebase in progress?")
        );
    }
}
