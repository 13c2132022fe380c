//! Porcelain v1 status parsing.

use std::collections::HashSet;

use serde::Serialize;

use crate::quote::{split_token, unquote};

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    Untracked,
    Ignored,
}

impl ChangeKind {
    /// Map a single porcelain status letter.
    const fn from_code(code: char) -> Option<Self> {
        match code {
            'M' | 'T' => Some(Self::Modified),
            'A' => Some(Self::Added),
            'D' => Some(Self::Deleted),
            'R' => Some(Self::Renamed),
            'C' => Some(Self::Copied),
            _ => None,
        }
    }
}

/// How the two sides of an unmerged path disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictType {
    /// Both sides changed the content.
    Content,
    /// Both sides added the path.
    BothAdded,
    /// We modified, they deleted.
    ModifiedDeleted,
    /// We deleted, they modified.
    DeletedModified,
    /// Both sides renamed the path differently.
    RenameRename,
}

impl ConflictType {
    /// Map an unmerged `XY` status pair; `None` when the pair is not unmerged.
    #[must_use]
    pub const fn from_status_code(x: char, y: char) -> Option<Self> {
        match (x, y) {
            ('U', 'U') | ('A', 'U') | ('U', 'A') => Some(Self::Content),
            ('A', 'A') => Some(Self::BothAdded),
            ('U', 'D') => Some(Self::ModifiedDeleted),
            ('D', 'U') => Some(Self::DeletedModified),
            // DD only arises when both sides renamed the path away
            ('D', 'D') => Some(Self::RenameRename),
            _ => None,
        }
    }

    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Content => "both modified",
            Self::BothAdded => "both added",
            Self::ModifiedDeleted => "deleted by them",
            Self::DeletedModified => "deleted by us",
            Self::RenameRename => "both renamed",
        }
    }
}

/// A path with unresolved conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictedFile {
    pub path: String,
    pub conflict_type: ConflictType,
}

/// One row of a status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusEntry {
    /// Current path (rename target for renames).
    pub path: String,
    /// Source path of a rename or copy.
    pub old_path: Option<String>,
    pub change_kind: ChangeKind,
    /// Change is in the index rather than the working tree.
    pub is_staged: bool,
    pub is_conflicted: bool,
    pub conflict_type: Option<ConflictType>,
}

impl FileStatusEntry {
    fn change(
        path: &str,
        old_path: Option<&str>,
        change_kind: ChangeKind,
        is_staged: bool,
    ) -> Self {
        Self {
            path: path.to_string(),
            old_path: old_path.map(String::from),
            change_kind,
            is_staged,
            is_conflicted: false,
            conflict_type: None,
        }
    }
}

/// Local branch and its tracking relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStatus {
    /// Branch name, or `HEAD` when detached.
    pub head: String,
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub is_detached: bool,
}

/// Parsed status of a working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub branch: Option<BranchStatus>,
    pub entries: Vec<FileStatusEntry>,
    /// Lines that could not be understood.
    pub warnings: Vec<String>,
}

impl StatusSnapshot {
    /// Unmerged paths with their conflict type.
    #[must_use]
    pub fn conflicted(&self) -> Vec<ConflictedFile> {
        self.entries
            .iter()
            .filter(|e| e.is_conflicted)
            .map(|e| ConflictedFile {
                path: e.path.clone(),
                conflict_type: e.conflict_type.unwrap_or(ConflictType::Content),
            })
            .collect()
    }

    /// Entries recorded in the index.
    pub fn staged(&self) -> impl Iterator<Item = &FileStatusEntry> {
        self.entries.iter().filter(|e| e.is_staged)
    }

    /// Working-tree entries, including untracked and conflicted paths.
    pub fn unstaged(&self) -> impl Iterator<Item = &FileStatusEntry> {
        self.entries.iter().filter(|e| !e.is_staged)
    }

    /// Whether the path is currently unmerged.
    #[must_use]
    pub fn is_conflicted(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.is_conflicted && e.path == path)
    }

    /// No tracked or untracked changes.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.change_kind == ChangeKind::Ignored)
    }
}

/// Parse newline-separated `git status --porcelain=v1 [--branch]` output.
///
/// Renames use the `old -> new` notation; paths may be C-quoted.
#[must_use]
pub fn parse_status(text: &str, include_ignored: bool) -> StatusSnapshot {
    let mut builder = SnapshotBuilder::new(include_ignored);
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        if let Some(branch) = line.strip_prefix("## ") {
            builder.snapshot.branch = Some(parse_branch_line(branch));
            continue;
        }
        let Some((x, y, rest)) = split_code(line) else {
            builder.warn(format!("malformed status line `{line}`"));
            continue;
        };

        if matches!(x, 'R' | 'C') || matches!(y, 'R' | 'C') {
            match split_rename(rest) {
                Some((old, new)) => builder.record(x, y, &new, Some(&old)),
                None => builder.warn(format!("rename without source in `{line}`")),
            }
        } else {
            builder.record(x, y, &unquote(rest), None);
        }
    }
    builder.finish()
}

/// Parse NUL-separated `git status --porcelain=v1 -z [--branch]` output.
///
/// Paths are never quoted; a rename record is followed by a field holding
/// its source path.
#[must_use]
pub fn parse_status_z(text: &str, include_ignored: bool) -> StatusSnapshot {
    let mut builder = SnapshotBuilder::new(include_ignored);
    let mut fields = text.split('\0').filter(|f| !f.is_empty());

    while let Some(field) = fields.next() {
        if let Some(branch) = field.strip_prefix("## ") {
            builder.snapshot.branch = Some(parse_branch_line(branch));
            continue;
        }
        let Some((x, y, path)) = split_code(field) else {
            builder.warn(format!("malformed status record `{field}`"));
            continue;
        };

        if matches!(x, 'R' | 'C') || matches!(y, 'R' | 'C') {
            match fields.next() {
                Some(old) => builder.record(x, y, path, Some(old)),
                None => builder.warn(format!("rename without source for `{path}`")),
            }
        } else {
            builder.record(x, y, path, None);
        }
    }
    builder.finish()
}

/// Split `XY rest` into its status characters and remainder.
fn split_code(line: &str) -> Option<(char, char, &str)> {
    let mut chars = line.chars();
    let x = chars.next()?;
    let y = chars.next()?;
    let rest = chars.as_str().strip_prefix(' ')?;
    if rest.is_empty() || !x.is_ascii() || !y.is_ascii() {
        return None;
    }
    Some((x, y, rest))
}

/// Split `old -> new`, either side possibly quoted.
fn split_rename(rest: &str) -> Option<(String, String)> {
    if rest.starts_with('"') {
        let (old, remainder) = split_token(rest)?;
        let new = remainder.strip_prefix("-> ")?;
        return Some((old, unquote(new)));
    }
    let (old, new) = rest.split_once(" -> ")?;
    Some((old.to_string(), unquote(new)))
}

/// Parse the text after `## `.
fn parse_branch_line(line: &str) -> BranchStatus {
    let (refs, tracking) = match line.find(" [") {
        Some(idx) => (&line[..idx], Some(&line[idx..])),
        None => (line, None),
    };

    let refs = refs
        .strip_prefix("No commits yet on ")
        .or_else(|| refs.strip_prefix("Initial commit on "))
        .unwrap_or(refs);

    let mut branch = BranchStatus::default();
    if refs.starts_with("HEAD (no branch)") {
        branch.head = "HEAD".to_string();
        branch.is_detached = true;
    } else if let Some((head, upstream)) = refs.split_once("...") {
        branch.head = head.to_string();
        branch.upstream = Some(upstream.to_string());
    } else {
        branch.head = refs.to_string();
    }

    if let Some((ahead, behind)) = tracking.and_then(extract_ahead_behind) {
        branch.ahead = ahead;
        branch.behind = behind;
    }
    branch
}

/// Extract `[ahead N, behind M]` counts; `None` without bracket info.
fn extract_ahead_behind(line: &str) -> Option<(u32, u32)> {
    let start = line.find('[')?;
    let end = line.rfind(']')?;
    if end <= start {
        return None;
    }

    let mut ahead = 0;
    let mut behind = 0;
    for part in line[start + 1..end].split(',') {
        let part = part.trim();
        if let Some(n) = part.strip_prefix("ahead ") {
            ahead = n.parse().unwrap_or(0);
        } else if let Some(n) = part.strip_prefix("behind ") {
            behind = n.parse().unwrap_or(0);
        }
    }
    Some((ahead, behind))
}

struct SnapshotBuilder {
    include_ignored: bool,
    seen: HashSet<(String, bool)>,
    snapshot: StatusSnapshot,
}

impl SnapshotBuilder {
    fn new(include_ignored: bool) -> Self {
        Self {
            include_ignored,
            seen: HashSet::new(),
            snapshot: StatusSnapshot::default(),
        }
    }

    fn record(&mut self, x: char, y: char, path: &str, old_path: Option<&str>) {
        if let Some(conflict_type) = ConflictType::from_status_code(x, y) {
            self.push(FileStatusEntry {
                path: path.to_string(),
                old_path: None,
                change_kind: ChangeKind::Modified,
                is_staged: false,
                is_conflicted: true,
                conflict_type: Some(conflict_type),
            });
            return;
        }

        match (x, y) {
            ('?', '?') => {
                self.push(FileStatusEntry::change(path, None, ChangeKind::Untracked, false));
                return;
            }
            ('!', '!') => {
                if self.include_ignored {
                    self.push(FileStatusEntry::change(path, None, ChangeKind::Ignored, false));
                }
                return;
            }
            _ => {}
        }

        let staged = ChangeKind::from_code(x);
        let unstaged = ChangeKind::from_code(y);
        if staged.is_none() && unstaged.is_none() {
            self.warn(format!("unknown status code `{x}{y}` for `{path}`"));
            return;
        }

        if let Some(kind) = staged {
            let old = old_path.filter(|_| matches!(x, 'R' | 'C'));
            self.push(FileStatusEntry::change(path, old, kind, true));
        }
        if let Some(kind) = unstaged {
            let old = old_path.filter(|_| matches!(y, 'R' | 'C') && !matches!(x, 'R' | 'C'));
            self.push(FileStatusEntry::change(path, old, kind, false));
        }
    }

    fn push(&mut self, entry: FileStatusEntry) {
        if self.seen.insert((entry.path.clone(), entry.is_staged)) {
            self.snapshot.entries.push(entry);
        } else {
            self.warn(format!("duplicate status entry for `{}`", entry.path));
        }
    }

    fn warn(&mut self, message: String) {
        tracing::warn!(%message, "status parse problem");
        self.snapshot.warnings.push(message);
    }

    fn finish(self) -> StatusSnapshot {
        self.snapshot
    }
}

/// An index stage of an unmerged path as listed by `git ls-files -u -z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmergedStage {
    pub mode: String,
    pub object: String,
    /// 1 = base, 2 = ours, 3 = theirs.
    pub stage: u8,
    pub path: String,
}

/// Parse `git ls-files -u -z` output, skipping malformed records.
#[must_use]
pub fn parse_unmerged_stages(text: &str) -> Vec<UnmergedStage> {
    text.split('\0')
        .filter(|r| !r.is_empty())
        .filter_map(|record| {
            let (meta, path) = record.split_once('\t')?;
            let mut parts = meta.split_whitespace();
            let mode = parts.next()?.to_string();
            let object = parts.next()?.to_string();
            let stage = parts.next()?.parse().ok()?;
            Some(UnmergedStage {
                mode,
                object,
                stage,
                path: path.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_arrow_is_split() {
        let snapshot = parse_status("R  old.txt -> new.txt\n", false);
        assert_eq!(
            snapshot.entries,
            vec![FileStatusEntry {
                path: "new.txt".into(),
                old_path: Some("old.txt".into()),
                change_kind: ChangeKind::Renamed,
                is_staged: true,
                is_conflicted: false,
                conflict_type: None,
            }]
        );
    }

    #[test]
    fn test_quoted_rename() {
        let snapshot = parse_status("R  \"old name.txt\" -> \"caf\\303\\251.txt\"\n", false);
        let entry = &snapshot.entries[0];
        assert_eq!(entry.path, "café.txt");
        assert_eq!(entry.old_path.as_deref(), Some("old name.txt"));
    }

    #[test]
    fn test_staged_and_unstaged_sides() {
        let snapshot = parse_status("MM src/lib.rs\nA  new.rs\n D gone.rs\nT  link\n", false);
        let rows: Vec<_> = snapshot
            .entries
            .iter()
            .map(|e| (e.path.as_str(), e.change_kind, e.is_staged))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("src/lib.rs", ChangeKind::Modified, true),
                ("src/lib.rs", ChangeKind::Modified, false),
                ("new.rs", ChangeKind::Added, true),
                ("gone.rs", ChangeKind::Deleted, false),
                ("link", ChangeKind::Modified, true),
            ]
        );
        assert_eq!(snapshot.staged().count(), 3);
        assert_eq!(snapshot.unstaged().count(), 2);
    }

    #[test]
    fn test_untracked_and_ignored() {
        let text = "?? notes.md\n!! target/\n";
        let without = parse_status(text, false);
        assert_eq!(without.entries.len(), 1);
        assert_eq!(without.entries[0].change_kind, ChangeKind::Untracked);
        assert!(!without.entries[0].is_staged);

        let with = parse_status(text, true);
        assert_eq!(with.entries.len(), 2);
        assert_eq!(with.entries[1].change_kind, ChangeKind::Ignored);
    }

    #[test]
    fn test_conflict_codes() {
        let text = "UU both.txt\nAA added.txt\nUD ours.txt\nDU theirs.txt\nDD renamed.txt\nAU a.txt\nUA b.txt\n";
        let snapshot = parse_status(text, false);
        assert_eq!(snapshot.entries.len(), 7);
        assert!(snapshot.entries.iter().all(|e| e.is_conflicted && !e.is_staged));

        let types: Vec<_> = snapshot.conflicted().into_iter().map(|c| c.conflict_type).collect();
        assert_eq!(
            types,
            vec![
                ConflictType::Content,
                ConflictType::BothAdded,
                ConflictType::ModifiedDeleted,
                ConflictType::DeletedModified,
                ConflictType::RenameRename,
                ConflictType::Content,
                ConflictType::Content,
            ]
        );
        assert!(snapshot.is_conflicted("both.txt"));
        assert!(!snapshot.is_clean());
    }

    #[test]
    fn test_branch_line() {
        let snapshot = parse_status("## main...origin/main [ahead 1, behind 2]\n", false);
        let branch = snapshot.branch.clone().unwrap();
        assert_eq!(branch.head, "main");
        assert_eq!(branch.upstream.as_deref(), Some("origin/main"));
        assert_eq!((branch.ahead, branch.behind), (1, 2));
        assert!(snapshot.is_clean());
    }

    #[test]
    fn test_branch_line_variants() {
        let detached = parse_branch_line("HEAD (no branch)");
        assert!(detached.is_detached);
        assert_eq!(detached.head, "HEAD");

        let fresh = parse_branch_line("No commits yet on main");
        assert_eq!(fresh.head, "main");
        assert_eq!(fresh.upstream, None);

        let gone = parse_branch_line("feature...origin/feature [gone]");
        assert_eq!(gone.upstream.as_deref(), Some("origin/feature"));
        assert_eq!((gone.ahead, gone.behind), (0, 0));
    }

    #[test]
    fn test_extract_ahead_behind() {
        assert_eq!(extract_ahead_behind("[ahead 2]"), Some((2, 0)));
        assert_eq!(extract_ahead_behind("[behind 3]"), Some((0, 3)));
        assert_eq!(extract_ahead_behind("main"), None);
    }

    #[test]
    fn test_nul_separated_with_rename() {
        let text = "## main\0R  new name.txt\0old name.txt\0 M src/a.rs\0?? x y.txt\0";
        let snapshot = parse_status_z(text, false);
        assert_eq!(snapshot.branch.as_ref().unwrap().head, "main");
        assert_eq!(snapshot.entries.len(), 3);

        let rename = &snapshot.entries[0];
        assert_eq!(rename.path, "new name.txt");
        assert_eq!(rename.old_path.as_deref(), Some("old name.txt"));
        assert_eq!(rename.change_kind, ChangeKind::Renamed);
        assert_eq!(snapshot.entries[2].path, "x y.txt");
    }

    #[test]
    fn test_rename_with_worktree_change() {
        let snapshot = parse_status_z("RM new.rs\0old.rs\0", false);
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].old_path.as_deref(), Some("old.rs"));
        assert_eq!(snapshot.entries[1].change_kind, ChangeKind::Modified);
        assert_eq!(snapshot.entries[1].old_path, None);
    }

    #[test]
    fn test_malformed_lines_become_warnings() {
        let snapshot = parse_status("garbage\nXY what\n M ok.rs\n", false);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.warnings.len(), 2);
    }

    #[test]
    fn test_duplicate_entries_are_collapsed() {
        let snapshot = parse_status(" M a.rs\n M a.rs\n", false);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[test]
    fn test_parse_unmerged_stages() {
        let text = "100644 1111111111111111111111111111111111111111 1\tf.txt\0\
100644 2222222222222222222222222222222222222222 2\tf.txt\0";
        let stages = parse_unmerged_stages(text);
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[1].stage, 2);
        assert_eq!(stages[1].path, "f.txt");
    }
}
