//! `sift blame` command - Show line attribution for a file.

use anyhow::{Context, Result};
use colored::Colorize;
use sift_git::BlameLine;

use super::utils::{self, GlobalArgs};
use crate::output;

/// Run the blame command.
pub async fn run(global: &GlobalArgs, path: &str, json: bool) -> Result<()> {
    let (repo, _config) = utils::open_repo_and_config(global)?;
    let lines = repo
        .blame(path)
        .await
        .with_context(|| format!("Cannot blame {path}"))?;

    if json {
        return utils::print_json(&lines);
    }

    let width = lines
        .iter()
        .map(|l| l.author.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    let number_width = lines.len().to_string().len();

    for line in &lines {
        output::essential(&format_line(line, width, number_width));
    }
    Ok(())
}

fn format_line(line: &BlameLine, author_width: usize, number_width: usize) -> String {
    let hash = output::short_hash(&line.commit_hash);
    let hash = if line.is_boundary {
        format!("^{hash}").dimmed()
    } else {
        hash.yellow()
    };
    let author: String = line.author.chars().take(author_width).collect();

    format!(
        "{hash} {author:<author_width$} {} {:>number_width$} │ {}",
        line.date.format("%Y-%m-%d").to_string().dimmed(),
        line.line_number,
        line.content,
    )
}
