//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use sift_core::OperationState;
use sift_git::{ChangeKind, DiffLineKind, FileStatusEntry};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
///
/// Use for indented detail lines that accompany info or warn messages.
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
///
/// Use for results that should be available for piping, like JSON.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}

/// Two-letter code for a status row, colored by side.
#[must_use]
pub fn status_code(entry: &FileStatusEntry) -> String {
    if entry.is_conflicted {
        return "UU".red().bold().to_string();
    }

    let code = match entry.change_kind {
        ChangeKind::Modified => "M",
        ChangeKind::Added => "A",
        ChangeKind::Deleted => "D",
        ChangeKind::Renamed => "R",
        ChangeKind::Copied => "C",
        ChangeKind::Untracked => return "??".red().to_string(),
        ChangeKind::Ignored => return "!!".dimmed().to_string(),
    };

    if entry.is_staged {
        format!("{} ", code.green())
    } else {
        format!(" {}", code.red())
    }
}

/// A diff body line with its marker, colored by kind.
#[must_use]
pub fn diff_line(kind: DiffLineKind, content: &str) -> String {
    match kind {
        DiffLineKind::Addition => format!("+{content}").green().to_string(),
        DiffLineKind::Deletion => format!("-{content}").red().to_string(),
        DiffLineKind::Context => format!(" {content}"),
        DiffLineKind::HunkHeader => content.cyan().to_string(),
        DiffLineKind::NoNewlineMarker => content.dimmed().to_string(),
    }
}

/// Colored one-line summary of an operation state.
#[must_use]
pub fn state_line(state: &OperationState) -> String {
    match state {
        OperationState::None => state.to_string().green().to_string(),
        OperationState::MergeInProgress { conflict_count } if *conflict_count > 0 => {
            state.to_string().red().to_string()
        }
        OperationState::MergeInProgress { .. }
        | OperationState::RebaseInProgress { .. }
        | OperationState::CherryPickInProgress
        | OperationState::RevertInProgress => state.to_string().yellow().to_string(),
    }
}

/// Abbreviate a full object id for display.
#[must_use]
pub fn short_hash(hash: &str) -> &str {
    &hash[..8.min(hash.len())]
}
