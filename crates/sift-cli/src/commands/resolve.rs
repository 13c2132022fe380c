//! `sift resolve` command - Settle conflicted paths.

use anyhow::{Context, Result, bail};
use inquire::MultiSelect;
use sift_core::{ConflictResolver, OperationTracker, ResolutionAction};

use super::ResolveAction;
use super::utils::{self, GlobalArgs};
use crate::output;

/// Run the resolve command.
pub async fn run(global: &GlobalArgs, action: ResolveAction, paths: Vec<String>) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;

    let paths = if paths.is_empty() {
        let conflicted = OperationTracker::new(&repo).conflicted_files().await?;
        if conflicted.is_empty() {
            output::info("No conflicted files");
            return Ok(());
        }
        let options: Vec<String> = conflicted.into_iter().map(|c| c.path).collect();
        let selected = MultiSelect::new("Select files to resolve:", options)
            .with_all_selected_by_default()
            .prompt()
            .context("Selection cancelled")?;
        if selected.is_empty() {
            bail!("No files selected");
        }
        selected
    } else {
        paths
    };

    let outcomes = ConflictResolver::new(&repo)
        .resolve_all(paths.as_slice(), action.into())
        .await?;

    for outcome in &outcomes {
        if outcome.was_conflicted {
            output::success(&format!("{} ({})", outcome.path, outcome.action));
        } else {
            output::info(&format!("{} was not conflicted", outcome.path));
        }
    }

    let remaining = OperationTracker::new(&repo).conflicted_files().await?;
    if remaining.is_empty() {
        output::info("All conflicts resolved - run `sift continue`");
    } else {
        output::info(&format!("{} conflicted file(s) remain", remaining.len()));
    }
    Ok(())
}

impl From<ResolveAction> for ResolutionAction {
    fn from(action: ResolveAction) -> Self {
        match action {
            ResolveAction::Ours => Self::AcceptCurrent,
            ResolveAction::Theirs => Self::AcceptIncoming,
            ResolveAction::Mark => Self::MarkResolved,
        }
    }
}
