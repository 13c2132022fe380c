//! `sift merge`, `rebase`, `cherry-pick`, `revert` and `reset` commands.

use anyhow::Result;
use sift_git::ResetMode;

use super::utils::{self, GlobalArgs};
use crate::output;

/// Merge `rev` into the current branch.
pub async fn merge(global: &GlobalArgs, rev: &str, no_ff: bool) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = utils::finish("merge", repo.merge(rev, no_ff).await?)?;

    if result.is_up_to_date {
        output::success("Already up to date");
    } else {
        let how = if result.is_fast_forward {
            "Fast-forwarded"
        } else {
            "Merged"
        };
        output::success(&format!(
            "{how} {rev}: {} file(s), +{} -{}",
            result.files_changed, result.insertions, result.deletions
        ));
    }
    Ok(())
}

/// Rebase the current branch onto `upstream`.
pub async fn rebase(global: &GlobalArgs, upstream: &str) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = repo.rebase(upstream).await?;

    if let (Some(current), Some(total)) = (result.current_step, result.total_steps) {
        output::info(&format!("Stopped at commit {current}/{total}"));
    }
    let result = utils::finish("rebase", result)?;

    if result.is_up_to_date {
        output::success("Already up to date");
    } else {
        output::success(&format!("Rebased onto {upstream}"));
    }
    Ok(())
}

/// Apply `commit` onto the current branch.
pub async fn cherry_pick(global: &GlobalArgs, commit: &str) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = utils::finish("cherry-pick", repo.cherry_pick(commit).await?)?;

    match &result.commit_hash {
        Some(hash) => output::success(&format!("Picked {commit} as {hash}")),
        None if result.is_empty => output::warn(&format!("{commit} introduced no changes")),
        None => output::success(&format!("Picked {commit}")),
    }
    Ok(())
}

/// Revert `commit`.
pub async fn revert(global: &GlobalArgs, commit: &str) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = utils::finish("revert", repo.revert(commit).await?)?;

    match &result.commit_hash {
        Some(hash) => output::success(&format!("Reverted {commit} in {hash}")),
        None => output::success(&format!("Reverted {commit}")),
    }
    Ok(())
}

/// Move HEAD to `target`.
pub async fn reset(global: &GlobalArgs, target: &str, mode: ResetMode) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = utils::finish("reset", repo.reset(target, mode).await?)?;

    match &result.head {
        Some(head) => output::success(&format!("HEAD is now at {head}")),
        None => output::success(&format!("Reset to {target}")),
    }
    if !result.unstaged_paths.is_empty() {
        output::info("Unstaged changes after reset:");
        for path in &result.unstaged_paths {
            output::detail(&format!("  → {path}"));
        }
    }
    Ok(())
}
