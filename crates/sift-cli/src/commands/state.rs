//! `sift state`, `continue`, `abort` and `skip` commands.

use anyhow::Result;
use sift_core::{OperationSnapshot, OperationTracker};
use sift_git::{StepAction, StepResult};

use super::utils::{self, GlobalArgs};
use crate::output;

/// Show the operation in progress.
pub async fn run(global: &GlobalArgs, json: bool) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let snapshot = OperationTracker::new(&repo).snapshot().await?;

    if json {
        return utils::print_json(&snapshot);
    }

    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &OperationSnapshot) {
    for warning in &snapshot.warnings {
        output::warn(warning);
    }

    output::detail(&output::state_line(&snapshot.state));

    if !snapshot.conflicted_files.is_empty() {
        output::info("Conflicting files:");
        for file in &snapshot.conflicted_files {
            output::detail(&format!("  → {} ({})", file.path, file.conflict_type.label()));
        }
    }

    if snapshot.state.is_in_progress() {
        if snapshot.conflicted_files.is_empty() {
            output::info("Run `sift continue` to proceed, or `sift abort` to give up");
        } else {
            output::info("Resolve with `sift resolve ours|theirs|mark <path>`");
        }
    }
}

/// Continue the stopped operation.
pub async fn run_continue(global: &GlobalArgs) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = OperationTracker::new(&repo).continue_operation().await?;
    let result = utils::finish("continue", result)?;
    report(&result);
    Ok(())
}

/// Abort the stopped operation.
pub async fn run_abort(global: &GlobalArgs) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = OperationTracker::new(&repo).abort_operation().await?;
    let result = utils::finish("abort", result)?;
    report(&result);
    Ok(())
}

/// Skip the current commit of the stopped operation.
pub async fn run_skip(global: &GlobalArgs) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = OperationTracker::new(&repo).skip_operation().await?;
    let result = utils::finish("skip", result)?;
    report(&result);
    Ok(())
}

fn report(result: &StepResult) {
    let verb = match result.action {
        StepAction::Continue => "continued",
        StepAction::Skip => "skipped ahead",
        StepAction::Abort => "aborted",
    };
    output::success(&format!("{} {verb}", capitalize(result.operation.command())));
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
