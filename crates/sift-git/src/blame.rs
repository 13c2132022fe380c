//! `git blame --porcelain` parsing.
//!
//! Blame is read as a whole: unlike diffs, any inconsistency rejects the
//! file with [`Error::FileNotBlamable`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// Attribution of one line of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLine {
    /// 1-based line number in the blamed revision.
    pub line_number: u32,
    pub commit_hash: String,
    pub author: String,
    /// Email without angle brackets.
    pub author_email: String,
    /// Author timestamp.
    pub date: DateTime<Utc>,
    /// First line of the commit message.
    pub summary: String,
    /// Commit is a boundary of the blamed range.
    pub is_boundary: bool,
    pub content: String,
}

#[derive(Debug, Default)]
struct CommitMeta {
    author: Option<String>,
    author_email: Option<String>,
    author_time: Option<i64>,
    summary: Option<String>,
    is_boundary: bool,
}

/// Parse porcelain blame output for `path`.
///
/// Metadata is only printed on the first mention of a commit; later groups
/// for the same commit inherit it.
///
/// # Errors
/// Returns [`Error::FileNotBlamable`] on a malformed header or timestamp,
/// missing commit metadata, or line numbers that are not exactly `1..=N`.
pub fn parse_blame_porcelain(path: &str, text: &str) -> Result<Vec<BlameLine>> {
    let fail = |reason: String| Error::FileNotBlamable {
        path: path.to_string(),
        reason,
    };

    let mut commits: HashMap<String, CommitMeta> = HashMap::new();
    let mut current: Option<(String, u32)> = None;
    let mut lines = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;

        if let Some(content) = line.strip_prefix('\t') {
            let (hash, final_line) = current
                .take()
                .ok_or_else(|| fail(format!("line {lineno}: content without a header")))?;
            let meta = commits
                .get(&hash)
                .ok_or_else(|| fail(format!("no metadata for commit {hash}")))?;
            lines.push(build_line(&hash, final_line, meta, content).map_err(fail)?);
            continue;
        }

        if current.is_none() {
            let (hash, final_line) = parse_header(line)
                .ok_or_else(|| fail(format!("line {lineno}: malformed header `{line}`")))?;
            commits.entry(hash.clone()).or_default();
            current = Some((hash, final_line));
            continue;
        }
        let Some((hash, _)) = &current else {
            continue;
        };

        let meta = commits.entry(hash.clone()).or_default();
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "author" => meta.author = Some(value.to_string()),
            "author-mail" => {
                let email = value.trim_start_matches('<').trim_end_matches('>');
                meta.author_email = Some(email.to_string());
            }
            "author-time" => {
                let time = value
                    .trim()
                    .parse()
                    .map_err(|_| fail(format!("line {lineno}: bad author-time `{value}`")))?;
                meta.author_time = Some(time);
            }
            "summary" => meta.summary = Some(value.to_string()),
            "boundary" => meta.is_boundary = true,
            _ => {}
        }
    }

    if current.is_some() {
        return Err(fail("output ended inside a line group".to_string()));
    }

    lines.sort_by_key(|l: &BlameLine| l.line_number);
    for (expected, line) in (1u32..).zip(&lines) {
        if line.line_number != expected {
            return Err(fail(format!(
                "expected line {expected}, found line {}",
                line.line_number
            )));
        }
    }

    Ok(lines)
}

/// Parse `<hash> <orig> <final> [<group>]`, returning the hash and final line.
fn parse_header(line: &str) -> Option<(String, u32)> {
    let mut parts = line.split(' ');
    let hash = parts.next()?;
    if !matches!(hash.len(), 40 | 64) || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let _orig: u32 = parts.next()?.parse().ok()?;
    let final_line: u32 = parts.next()?.parse().ok()?;
    if let Some(group) = parts.next() {
        group.parse::<u32>().ok()?;
    }
    if parts.next().is_some() || final_line == 0 {
        return None;
    }
    Some((hash.to_string(), final_line))
}

fn build_line(
    hash: &str,
    line_number: u32,
    meta: &CommitMeta,
    content: &str,
) -> std::result::Result<BlameLine, String> {
    let (Some(author), Some(time)) = (&meta.author, meta.author_time) else {
        return Err(format!("no metadata for commit {hash}"));
    };
    let date = DateTime::<Utc>::from_timestamp(time, 0)
        .ok_or_else(|| format!("timestamp {time} out of range"))?;

    Ok(BlameLine {
        line_number,
        commit_hash: hash.to_string(),
        author: author.clone(),
        author_email: meta.author_email.clone().unwrap_or_default(),
        date,
        summary: meta.summary.clone().unwrap_or_default(),
        is_boundary: meta.is_boundary,
        content: content.to_string(),
    })
}
