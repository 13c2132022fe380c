//! Line classifier for unified diff text.

use serde::Serialize;

/// Type of a single line in a unified diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffLineKind {
    /// Unchanged line present on both sides.
    Context,
    /// Line only present on the new side.
    Addition,
    /// Line only present on the old side.
    Deletion,
    /// `@@ -a,b +c,d @@` line opening a hunk.
    HunkHeader,
    /// `\ No newline at end of file`.
    NoNewlineMarker,
}

/// A classified line borrowing its content from the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// Line type.
    pub kind: DiffLineKind,
    /// Line text without its diff marker.
    pub content: &'a str,
}

/// Classify one line of raw diff text.
///
/// Total: anything that does not carry a known prefix is context, so one
/// odd line never fails a whole parse.
#[must_use]
pub fn classify(line: &str) -> ClassifiedLine<'_> {
    if line.starts_with("@@ ") {
        return ClassifiedLine {
            kind: DiffLineKind::HunkHeader,
            content: line,
        };
    }
    if let Some(rest) = line.strip_prefix('\\') {
        return ClassifiedLine {
            kind: DiffLineKind::NoNewlineMarker,
            content: rest.trim_start(),
        };
    }
    if let Some(rest) = line.strip_prefix('+') {
        return ClassifiedLine {
            kind: DiffLineKind::Addition,
            content: rest,
        };
    }
    if let Some(rest) = line.strip_prefix('-') {
        return ClassifiedLine {
            kind: DiffLineKind::Deletion,
            content: rest,
        };
    }

    ClassifiedLine {
        kind: DiffLineKind::Context,
        content: line.strip_prefix(' ').unwrap_or(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(classify("@@ -1 +1 @@").kind, DiffLineKind::HunkHeader);
        assert_eq!(
            classify("\\ No newline at end of file").kind,
            DiffLineKind::NoNewlineMarker
        );
        assert_eq!(
            classify("+added"),
            ClassifiedLine {
                kind: DiffLineKind::Addition,
                content: "added"
            }
        );
        assert_eq!(
            classify("-removed"),
            ClassifiedLine {
                kind: DiffLineKind::Deletion,
                content: "removed"
            }
        );
        assert_eq!(
            classify(" same"),
            ClassifiedLine {
                kind: DiffLineKind::Context,
                content: "same"
            }
        );
    }

    #[test]
    fn test_unknown_prefix_degrades_to_context() {
        let line = classify("garbage line");
        assert_eq!(line.kind, DiffLineKind::Context);
        assert_eq!(line.content, "garbage line");

        assert_eq!(classify("").kind, DiffLineKind::Context);
    }

    #[test]
    fn test_hunk_header_requires_space() {
        // `@@@` opens a combined-diff hunk, not a unified one
        assert_eq!(classify("@@@ -1 -1 +1 @@@").kind, DiffLineKind::Context);
        assert_eq!(classify("+++ b/file").kind, DiffLineKind::Addition);
    }
}
