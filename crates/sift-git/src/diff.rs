//! Unified diff parsing.
//!
//! Turns `git diff` / `git diff-tree -p` output into [`Diff`] values. The
//! parser is total: a hunk with malformed numbers is dropped and recorded in
//! [`Diff::warnings`], a body cut short is kept as-is with a warning, and the
//! rest of the text still parses.

use serde::Serialize;

use crate::line::{DiffLineKind, classify};
use crate::quote::{split_token, unquote};

/// One line inside a hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    /// Line type.
    pub kind: DiffLineKind,
    /// Text without the diff marker.
    pub content: String,
    /// Line number on the old side (context and deletions).
    pub old_line_number: Option<u32>,
    /// Line number on the new side (context and additions).
    pub new_line_number: Option<u32>,
    /// False when followed by `\ No newline at end of file`.
    pub has_trailing_newline: bool,
}

/// A contiguous region of changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// First line on the old side.
    pub old_start: u32,
    /// Number of old-side lines covered.
    pub old_count: u32,
    /// First line on the new side.
    pub new_start: u32,
    /// Number of new-side lines covered.
    pub new_count: u32,
    /// Section heading after the closing `@@`, usually a function signature.
    pub header: Option<String>,
    /// Lines in order, including no-newline markers.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Rebuild the `@@ -a,b +c,d @@ header` line.
    ///
    /// Follows git's convention of leaving out a count of exactly 1.
    #[must_use]
    pub fn header_line(&self) -> String {
        let mut line = format!(
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_count),
            format_range(self.new_start, self.new_count)
        );
        if let Some(header) = &self.header {
            line.push(' ');
            line.push_str(header);
        }
        line
    }

    /// Number of added lines.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.count(DiffLineKind::Addition)
    }

    /// Number of removed lines.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.count(DiffLineKind::Deletion)
    }

    fn count(&self, kind: DiffLineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

fn format_range(start: u32, count: u32) -> String {
    if count == 1 {
        start.to_string()
    } else {
        format!("{start},{count}")
    }
}

/// Changes to a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    /// Path before the change.
    pub old_path: String,
    /// Path after the change.
    pub new_path: String,
    /// Hunks in file order; empty for binary and mode-only changes.
    pub hunks: Vec<Hunk>,
    /// Content is binary, no hunks were produced.
    pub is_binary: bool,
    /// File was created.
    pub is_new_file: bool,
    /// File was removed.
    pub is_deleted_file: bool,
    /// New path is a copy of the old one.
    pub is_copy: bool,
    /// Mode of the file after the change.
    pub file_mode: Option<String>,
    /// Mode before the change, only set when the mode changed.
    pub old_mode: Option<String>,
    /// Rename/copy similarity percentage.
    pub similarity: Option<u8>,
}

impl FileDiff {
    fn new(old_path: String, new_path: String) -> Self {
        Self {
            old_path,
            new_path,
            hunks: Vec::new(),
            is_binary: false,
            is_new_file: false,
            is_deleted_file: false,
            is_copy: false,
            file_mode: None,
            old_mode: None,
            similarity: None,
        }
    }

    /// Whether the file moved without being created, deleted or copied.
    #[must_use]
    pub fn is_renamed(&self) -> bool {
        self.old_path != self.new_path
            && !self.is_new_file
            && !self.is_deleted_file
            && !self.is_copy
    }

    /// The path to show for this file.
    #[must_use]
    pub fn path(&self) -> &str {
        if self.is_deleted_file {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    /// Lines added across all hunks.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.hunks.iter().map(Hunk::additions).sum()
    }

    /// Lines removed across all hunks.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }
}

/// A problem absorbed while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffWarning {
    /// File the problem belongs to.
    pub path: String,
    /// 1-based line in the raw output.
    pub line: usize,
    /// What was wrong.
    pub message: String,
}

/// A parsed, possibly multi-file diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    /// Files in output order.
    pub files: Vec<FileDiff>,
    /// The text this diff was parsed from.
    pub raw_output: String,
    /// Hunks that were dropped and why.
    pub warnings: Vec<DiffWarning>,
}

impl Diff {
    /// Parse raw unified diff text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut parser = Parser::default();
        for (idx, line) in raw.split_terminator('\n').enumerate() {
            parser.feed(idx + 1, line);
        }
        parser.finish(raw)
    }

    /// Total added lines.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.files.iter().map(FileDiff::additions).sum()
    }

    /// Total removed lines.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.files.iter().map(FileDiff::deletions).sum()
    }

    /// Whether no file changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find a file by its old or new path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files
            .iter()
            .find(|f| f.new_path == path || f.old_path == path)
    }
}

/// Flags forwarded to the diff invocation.
///
/// The parser never reinterprets these; they only shape the git command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// `-U<n>`; git's default (3) when `None`.
    pub context_lines: Option<u32>,
    /// `-M` when true, `--no-renames` otherwise.
    pub detect_renames: bool,
    /// `-b`.
    pub ignore_whitespace: bool,
    /// `-w`; wins over `ignore_whitespace`.
    pub ignore_all_whitespace: bool,
    /// Compare index to HEAD (`--cached`).
    pub staged: bool,
    /// Show the changes introduced by this commit instead of the worktree.
    pub commit: Option<String>,
    /// Restrict to a single path.
    pub file_path: Option<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: None,
            detect_renames: true,
            ignore_whitespace: false,
            ignore_all_whitespace: false,
            staged: false,
            commit: None,
            file_path: None,
        }
    }
}

impl DiffOptions {
    /// Git arguments for these options.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = if self.commit.is_some() {
            ["diff-tree", "-p", "-r", "--root", "--no-commit-id"]
                .map(String::from)
                .to_vec()
        } else {
            vec!["diff".to_string()]
        };

        args.extend(
            ["--no-color", "--no-ext-diff", "--src-prefix=a/", "--dst-prefix=b/"].map(String::from),
        );

        if self.commit.is_none() && self.staged {
            args.push("--cached".into());
        }
        if let Some(n) = self.context_lines {
            args.push(format!("-U{n}"));
        }
        args.push(if self.detect_renames { "-M" } else { "--no-renames" }.into());
        if self.ignore_all_whitespace {
            args.push("-w".into());
        } else if self.ignore_whitespace {
            args.push("-b".into());
        }
        if let Some(commit) = &self.commit {
            args.push(commit.clone());
        }
        if let Some(path) = &self.file_path {
            args.push("--".into());
            args.push(path.clone());
        }
        args
    }
}

/// Parse a hunk header like `@@ -1,3 +1,4 @@ fn main()`.
///
/// Returns `(old_start, old_count, new_start, new_count, header)`.
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32, Option<String>)> {
    let rest = line.strip_prefix("@@ ")?;
    let (ranges, tail) = rest.split_once(" @@")?;

    let mut parts = ranges.split(' ');
    let (old_start, old_count) = parse_range(parts.next()?.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts.next()?.strip_prefix('+')?)?;
    if parts.next().is_some() {
        return None;
    }

    let header = tail
        .strip_prefix(' ')
        .filter(|h| !h.is_empty())
        .map(String::from);

    Some((old_start, old_count, new_start, new_count, header))
}

/// Parse a range like "1,3" or "1" into (start, count).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        // A bare start means a single line
        Some((s.parse().ok()?, 1))
    }
}

/// Extract `(old, new)` from the text after `diff --git `.
fn parse_git_header_paths(rest: &str) -> Option<(String, String)> {
    let (old, new) = if rest.starts_with('"') {
        let (old, remainder) = split_token(rest)?;
        (old, unquote(remainder))
    } else if let Some(idx) = rest.find(" \"") {
        (rest[..idx].to_string(), unquote(&rest[idx + 1..]))
    } else if let Some(same) = split_same_name(rest) {
        same
    } else {
        let idx = rest.find(" b/")?;
        (rest[..idx].to_string(), rest[idx + 1..].to_string())
    };

    Some((strip_side_prefix(&old, "a/"), strip_side_prefix(&new, "b/")))
}

/// Split `a/X b/X` where X may itself contain spaces.
fn split_same_name(rest: &str) -> Option<(String, String)> {
    if rest.len() % 2 == 0 {
        return None;
    }
    let half = rest.len() / 2;
    if !rest.is_char_boundary(half) || rest.as_bytes()[half] != b' ' {
        return None;
    }
    let (old, new) = (&rest[..half], &rest[half + 1..]);
    match (old.strip_prefix("a/"), new.strip_prefix("b/")) {
        (Some(a), Some(b)) if a == b => Some((old.to_string(), new.to_string())),
        _ => None,
    }
}

fn strip_side_prefix(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}

/// Path from a `--- ` / `+++ ` line; `None` for `/dev/null`.
fn parse_marker_path(raw: &str, prefix: &str) -> Option<String> {
    let raw = raw.trim_end_matches('\t');
    let path = unquote(raw);
    if path == "/dev/null" {
        return None;
    }
    Some(strip_side_prefix(&path, prefix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Skip {
    #[default]
    Nothing,
    UntilHunk,
    UntilFile,
}

#[derive(Debug)]
struct OpenHunk {
    hunk: Hunk,
    old_remaining: u32,
    new_remaining: u32,
    next_old: u32,
    next_new: u32,
}

impl OpenHunk {
    const fn is_complete(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }

    fn push(&mut self, kind: DiffLineKind, content: &str) -> bool {
        let (old, new) = match kind {
            DiffLineKind::Context if self.old_remaining > 0 && self.new_remaining > 0 => {
                self.old_remaining -= 1;
                self.new_remaining -= 1;
                (Some(self.next_old), Some(self.next_new))
            }
            DiffLineKind::Deletion if self.old_remaining > 0 => {
                self.old_remaining -= 1;
                (Some(self.next_old), None)
            }
            DiffLineKind::Addition if self.new_remaining > 0 => {
                self.new_remaining -= 1;
                (None, Some(self.next_new))
            }
            DiffLineKind::NoNewlineMarker => {
                if let Some(last) = self.hunk.lines.last_mut() {
                    last.has_trailing_newline = false;
                }
                (None, None)
            }
            _ => return false,
        };

        if old.is_some() {
            self.next_old += 1;
        }
        if new.is_some() {
            self.next_new += 1;
        }

        self.hunk.lines.push(DiffLine {
            kind,
            content: content.to_string(),
            old_line_number: old,
            new_line_number: new,
            has_trailing_newline: kind != DiffLineKind::NoNewlineMarker,
        });
        true
    }
}

#[derive(Debug, Default)]
struct Parser {
    files: Vec<FileDiff>,
    warnings: Vec<DiffWarning>,
    current: Option<FileDiff>,
    hunk: Option<OpenHunk>,
    skip: Skip,
}

impl Parser {
    fn feed(&mut self, lineno: usize, line: &str) {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            self.start_file(lineno, parse_git_header_paths(rest));
            return;
        }
        if let Some(rest) = line
            .strip_prefix("diff --cc ")
            .or_else(|| line.strip_prefix("diff --combined "))
        {
            let path = unquote(rest);
            self.start_file(lineno, Some((path.clone(), path)));
            return;
        }
        if self.current.is_none() {
            // Preamble such as commit headers
            return;
        }

        if self.hunk.is_some() && self.feed_hunk(lineno, line) {
            return;
        }

        match self.skip {
            Skip::UntilFile => return,
            Skip::UntilHunk if !line.starts_with("@@ ") => return,
            _ => self.skip = Skip::Nothing,
        }

        self.feed_header(lineno, line);
    }

    /// Returns true when the line was consumed by the open hunk.
    fn feed_hunk(&mut self, lineno: usize, line: &str) -> bool {
        let Some(open) = self.hunk.as_mut() else {
            return false;
        };

        let classified = classify(line);
        if open.is_complete() {
            if classified.kind == DiffLineKind::NoNewlineMarker {
                open.push(classified.kind, classified.content);
                return true;
            }
            self.close_hunk(lineno);
            return false;
        }

        if classified.kind == DiffLineKind::HunkHeader {
            self.close_hunk(lineno);
            return false;
        }

        if open.push(classified.kind, classified.content) {
            return true;
        }

        let header = open.hunk.header_line();
        self.warn(
            lineno,
            format!("{header}: more lines than its header declares; hunk dropped"),
        );
        self.hunk = None;
        self.skip = Skip::UntilHunk;
        true
    }

    fn feed_header(&mut self, lineno: usize, line: &str) {
        if line.starts_with("@@ ") {
            match parse_hunk_header(line) {
                Some((old_start, old_count, new_start, new_count, header)) => {
                    self.hunk = Some(OpenHunk {
                        hunk: Hunk {
                            old_start,
                            old_count,
                            new_start,
                            new_count,
                            header,
                            lines: Vec::new(),
                        },
                        old_remaining: old_count,
                        new_remaining: new_count,
                        next_old: old_start,
                        next_new: new_start,
                    });
                }
                None => {
                    self.warn(lineno, format!("malformed hunk header `{line}`; hunk dropped"));
                    self.skip = Skip::UntilHunk;
                }
            }
            return;
        }

        if line.starts_with("@@@") {
            self.warn(lineno, "combined diff hunks are not parsed".to_string());
            self.skip = Skip::UntilFile;
            return;
        }

        let Some(file) = self.current.as_mut() else {
            return;
        };

        if let Some(mode) = line.strip_prefix("new file mode ") {
            file.is_new_file = true;
            file.file_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("deleted file mode ") {
            file.is_deleted_file = true;
            file.file_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("old mode ") {
            file.old_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("new mode ") {
            file.file_mode = Some(mode.trim().to_string());
        } else if let Some(path) = line.strip_prefix("rename from ") {
            file.old_path = unquote(path);
        } else if let Some(path) = line.strip_prefix("rename to ") {
            file.new_path = unquote(path);
        } else if let Some(path) = line.strip_prefix("copy from ") {
            file.is_copy = true;
            file.old_path = unquote(path);
        } else if let Some(path) = line.strip_prefix("copy to ") {
            file.is_copy = true;
            file.new_path = unquote(path);
        } else if let Some(pct) = line.strip_prefix("similarity index ") {
            file.similarity = pct.trim_end_matches('%').parse().ok();
        } else if let Some(index) = line.strip_prefix("index ") {
            // `index abc..def 100644` carries the mode when it did not change
            if file.file_mode.is_none() {
                file.file_mode = index.split_whitespace().nth(1).map(String::from);
            }
        } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
            file.is_binary = true;
            self.skip = Skip::UntilFile;
        } else if let Some(path) = line.strip_prefix("--- ") {
            if let Some(path) = parse_marker_path(path, "a/") {
                file.old_path = path;
            }
        } else if let Some(path) = line.strip_prefix("+++ ") {
            if let Some(path) = parse_marker_path(path, "b/") {
                file.new_path = path;
            }
        } else if !file.hunks.is_empty() && !line.trim().is_empty() {
            self.warn(lineno, "unexpected line outside of a hunk".to_string());
        }
    }

    fn start_file(&mut self, lineno: usize, paths: Option<(String, String)>) {
        self.close_hunk(lineno);
        if let Some(file) = self.current.take() {
            self.files.push(file);
        }
        self.skip = Skip::Nothing;

        let (old, new) = paths.unwrap_or_default();
        self.current = Some(FileDiff::new(old, new));
        if self.current.as_ref().is_some_and(|f| f.new_path.is_empty()) {
            self.warn(lineno, "could not read paths from diff header".to_string());
        }
    }

    fn close_hunk(&mut self, lineno: usize) {
        let Some(open) = self.hunk.take() else {
            return;
        };

        if !open.is_complete() {
            self.warn(
                lineno,
                format!(
                    "{}: body ended {} old / {} new lines short",
                    open.hunk.header_line(),
                    open.old_remaining,
                    open.new_remaining
                ),
            );
        }
        if let Some(file) = self.current.as_mut() {
            file.hunks.push(open.hunk);
        }
    }

    fn warn(&mut self, line: usize, message: String) {
        let path = self
            .current
            .as_ref()
            .map(|f| f.path().to_string())
            .unwrap_or_default();
        tracing::debug!(%path, line, %message, "diff parse problem");
        self.warnings.push(DiffWarning {
            path,
            line,
            message,
        });
    }

    fn finish(mut self, raw: &str) -> Diff {
        let end = raw.split_terminator('\n').count() + 1;
        self.close_hunk(end);
        if let Some(file) = self.current.take() {
            self.files.push(file);
        }
        Diff {
            files: self.files,
            raw_output: raw.to_string(),
            warnings: self.warnings,
        }
    }
}
