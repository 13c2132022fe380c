//! `sift fetch`, `pull` and `push` commands.

use anyhow::Result;
use sift_git::PushOptions;

use super::utils::{self, GlobalArgs};
use crate::output;

/// Fetch one remote or all of them.
pub async fn fetch(global: &GlobalArgs, remote: Option<&str>, prune: bool) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    output::info(&format!("Fetching {}...", remote.unwrap_or("all remotes")));

    let result = utils::finish("fetch", repo.fetch(remote, prune).await?)?;
    let total = result.new_refs + result.updated_refs + result.pruned_refs;
    if total == 0 {
        output::success("Already up to date");
    } else {
        output::success(&format!(
            "Fetched: {} new, {} updated, {} pruned",
            result.new_refs, result.updated_refs, result.pruned_refs
        ));
    }
    Ok(())
}

/// Pull into the current branch.
pub async fn pull(
    global: &GlobalArgs,
    remote: Option<&str>,
    branch: Option<&str>,
    rebase: bool,
) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = utils::finish("pull", repo.pull(remote, branch, rebase).await?)?;

    if result.is_up_to_date {
        output::success("Already up to date");
    } else {
        let how = if result.is_fast_forward {
            "fast-forward"
        } else if rebase {
            "rebase"
        } else {
            "merge"
        };
        output::success(&format!(
            "Pulled ({how}): {} file(s), +{} -{}",
            result.files_changed, result.insertions, result.deletions
        ));
    }
    Ok(())
}

/// Push refs to a remote.
pub async fn push(global: &GlobalArgs, options: &PushOptions) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let result = utils::finish("push", repo.push(options).await?)?;

    if result.is_up_to_date {
        output::success("Everything up to date");
    } else {
        output::success(&format!("Pushed {} ref(s)", result.pushed_refs));
    }
    Ok(())
}
