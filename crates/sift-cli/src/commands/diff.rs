//! `sift diff` command - Display a parsed diff.

use anyhow::Result;
use colored::Colorize;
use sift_git::{Diff, DiffLineKind, FileDiff};

use super::utils::{self, GlobalArgs};
use crate::output;

/// Diff selection from the command line.
#[derive(Debug, Default)]
pub struct DiffArgs {
    pub staged: bool,
    pub commit: Option<String>,
    pub context: Option<u32>,
    pub ignore_space_change: bool,
    pub ignore_all_space: bool,
    pub path: Option<String>,
}

/// Run the diff command.
pub async fn run(global: &GlobalArgs, args: DiffArgs, json: bool) -> Result<()> {
    let (repo, config) = utils::open_repo_and_config(global)?;

    let mut options = config.diff_options();
    if args.context.is_some() {
        options.context_lines = args.context;
    }
    options.staged = args.staged;
    options.commit = args.commit;
    options.ignore_whitespace = args.ignore_space_change;
    options.ignore_all_whitespace = args.ignore_all_space;
    options.file_path = args.path;

    let diff = repo.diff(&options).await?;

    if json {
        return utils::print_json(&diff);
    }

    print_diff(&diff);
    Ok(())
}

fn print_diff(diff: &Diff) {
    for warning in &diff.warnings {
        output::warn(&format!("{}: {}", warning.path, warning.message));
    }

    if diff.is_empty() {
        output::info("No changes");
        return;
    }

    for file in &diff.files {
        output::detail(&file_heading(file).bold().to_string());
        for hunk in &file.hunks {
            output::detail(&output::diff_line(
                DiffLineKind::HunkHeader,
                &hunk.header_line(),
            ));
            for line in &hunk.lines {
                output::detail(&output::diff_line(line.kind, &line.content));
            }
        }
    }

    output::hr();
    output::detail(&format!(
        "{} file(s), {} {}",
        diff.files.len(),
        format!("+{}", diff.additions()).green(),
        format!("-{}", diff.deletions()).red()
    ));
}

fn file_heading(file: &FileDiff) -> String {
    let mut heading = if file.is_renamed() || file.is_copy {
        let verb = if file.is_copy { "copied" } else { "renamed" };
        let similarity = file
            .similarity
            .map(|s| format!(", {s}%"))
            .unwrap_or_default();
        format!("{} ({verb} from {}{similarity})", file.new_path, file.old_path)
    } else {
        file.path().to_string()
    };

    if file.is_new_file {
        heading.push_str(" (new)");
    } else if file.is_deleted_file {
        heading.push_str(" (deleted)");
    }
    if file.is_binary {
        heading.push_str(" [binary]");
    }
    heading
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn single_file(text: &str) -> FileDiff {
        let diff = Diff::parse(text);
        assert_eq!(diff.files.len(), 1);
        diff.files.into_iter().next().unwrap()
    }

    #[test]
    fn test_heading_for_rename() {
        let file = single_file(
            "diff --git a/old.rs b/new.rs\n\
             similarity index 90%\n\
             rename from old.rs\n\
             rename to new.rs\n",
        );
        assert_eq!(file_heading(&file), "new.rs (renamed from old.rs, 90%)");
    }

    #[test]
    fn test_heading_for_new_binary() {
        let file = single_file(
            "diff --git a/logo.png b/logo.png\n\
             new file mode 100644\n\
             index 0000000..1234567\n\
             Binary files /dev/null and b/logo.png differ\n",
        );
        assert_eq!(file_heading(&file), "logo.png (new) [binary]");
    }
}
