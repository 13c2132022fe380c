//! # sift-git
//!
//! Git boundary for Sift: runs the `git` executable and turns its text
//! output (diffs, porcelain status, porcelain blame, command summaries)
//! into typed values.

mod blame;
mod diff;
mod error;
mod integrate;
mod line;
mod outcome;
mod quote;
mod repository;
mod runner;
mod status;
pub mod traits;

pub use blame::{BlameLine, parse_blame_porcelain};
pub use diff::{Diff, DiffLine, DiffOptions, DiffWarning, FileDiff, Hunk};
pub use error::{Error, Result};
pub use integrate::{ConflictSide, PushOptions, ResetMode};
pub use line::{ClassifiedLine, DiffLineKind, classify};
pub use outcome::{
    ChangeSummary, CherryPickResult, FetchResult, MergeResult, OperationKind, OperationOutcome,
    PullResult, PushResult, RebaseResult, ResetResult, RevertResult, StepAction, StepResult,
    parse_change_summary, parse_conflicts,
};
pub use repository::{DEFAULT_REMOTE_TIMEOUT, DEFAULT_TIMEOUT, Repository};
pub use runner::{CommandOutput, CommandRunner, GitCli};
pub use status::{
    BranchStatus, ChangeKind, ConflictType, ConflictedFile, FileStatusEntry, StatusSnapshot,
    UnmergedStage, parse_status, parse_status_z, parse_unmerged_stages,
};
pub use traits::{
    BlameOps, DiffOps, GitOps, IndexOps, MergeOps, RemoteOps, RepositoryContext, StatusOps,
};
