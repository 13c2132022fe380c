//! `sift status` command - Display parsed working-tree status.

use anyhow::Result;
use colored::Colorize;
use sift_git::{BranchStatus, StatusSnapshot};

use super::utils::{self, GlobalArgs};
use crate::output;

/// Run the status command.
pub async fn run(global: &GlobalArgs, ignored: bool, json: bool) -> Result<()> {
    let (repo, config) = utils::open_repo_and_config(global)?;
    let snapshot = repo
        .status(ignored || config.status.include_ignored)
        .await?;

    if json {
        return utils::print_json(&snapshot);
    }

    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &StatusSnapshot) {
    if let Some(branch) = &snapshot.branch {
        output::detail(&branch_line(branch));
    }

    for warning in &snapshot.warnings {
        output::warn(warning);
    }

    if snapshot.is_clean() {
        output::success("Working tree clean");
        return;
    }

    output::hr();
    for entry in &snapshot.entries {
        let path = match &entry.old_path {
            Some(old) => format!("{old} -> {}", entry.path),
            None => entry.path.clone(),
        };
        let suffix = entry
            .conflict_type
            .map(|c| format!(" ({})", c.label()).red().to_string())
            .unwrap_or_default();
        output::detail(&format!("  {} {path}{suffix}", output::status_code(entry)));
    }
    output::hr();

    let conflicted = snapshot.conflicted();
    if !conflicted.is_empty() {
        output::warn(&format!("{} conflicted file(s)", conflicted.len()));
    }
}

/// `On main...origin/main [1↑ 2↓]` style heading.
fn branch_line(branch: &BranchStatus) -> String {
    let mut line = if branch.is_detached {
        format!("HEAD detached ({})", branch.head).yellow().to_string()
    } else {
        format!("On {}", branch.head.cyan().bold())
    };

    if let Some(upstream) = &branch.upstream {
        line.push_str(&format!(" ← {}", upstream.dimmed()));
    }

    match (branch.ahead, branch.behind) {
        (0, 0) => {}
        (ahead, 0) => line.push_str(&format!(" ({ahead}↑)")),
        (0, behind) => line.push_str(&format!(" ({behind}↓)").yellow().to_string()),
        (ahead, behind) => {
            line.push_str(&format!(" ({ahead}↑ {behind}↓)").yellow().to_string());
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(ahead: u32, behind: u32) -> BranchStatus {
        BranchStatus {
            head: "main".into(),
            upstream: Some("origin/main".into()),
            ahead,
            behind,
            is_detached: false,
        }
    }

    #[test]
    fn test_branch_line_tracking() {
        colored::control::set_override(false);

        assert_eq!(branch_line(&branch(0, 0)), "On main ← origin/main");
        assert_eq!(branch_line(&branch(2, 0)), "On main ← origin/main (2↑)");
        assert_eq!(
            branch_line(&branch(1, 3)),
            "On main ← origin/main (1↑ 3↓)"
        );
    }

    #[test]
    fn test_branch_line_detached() {
        colored::control::set_override(false);

        let detached = BranchStatus {
            head: "HEAD".into(),
            upstream: None,
            ahead: 0,
            behind: 0,
            is_detached: true,
        };
        assert!(branch_line(&detached).starts_with("HEAD detached"));
    }
}
