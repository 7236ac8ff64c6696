//! Source ingestion for program text.
//!
//! Splits program text into numbered lines, separating the instruction part
//! of each line from the comment that follows the `;` marker. Line numbers are
//! 1-based positions in the input so commands and comments can be traced back
//! to the text the operator wrote.

use std::collections::BTreeMap;

/// Marker that starts a comment running to the end of the line.
pub const COMMENT_MARKER: char = ';';

/// Comment text keyed by 1-based source line.
pub type Comments = BTreeMap<usize, String>;

/// One line of program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Instruction part of the line, trimmed. Empty for blank and comment-only lines.
    pub text: String,
    /// The full line as written (without trailing newline).
    pub raw: String,
    /// 1-indexed line number in the input.
    pub line: usize,
    /// Comment text after the marker, trimmed, if the line has one.
    pub comment: Option<String>,
}

impl SourceLine {
    /// Returns `true` when the line carries no instruction.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Extracted program text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceContent {
    /// All lines in input order, blank lines included.
    pub lines: Vec<SourceLine>,
}

impl SourceContent {
    /// Collects the non-empty comments of every line, comment-only lines included.
    #[must_use]
    pub fn comments(&self) -> Comments {
        self.lines
            .iter()
            .filter_map(|line| {
                line.comment
                    .as_ref()
                    .filter(|comment| !comment.is_empty())
                    .map(|comment| (line.line, comment.clone()))
            })
            .collect()
    }
}

/// Splits `content` into numbered source lines.
#[must_use]
pub fn extract_source(content: &str) -> SourceContent {
    let lines = content
        .lines()
        .enumerate()
        .map(|(idx, raw)| {
            let (code, comment) = split_comment(raw);
            SourceLine {
                text: code.trim().to_string(),
                raw: raw.to_string(),
                line: idx + 1,
                comment: comment.map(|text| text.trim().to_string()),
            }
        })
        .collect();

    SourceContent { lines }
}

/// Splits a line at the first comment marker.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once(COMMENT_MARKER) {
        Some((code, comment)) => (code, Some(comment)),
        None => (line, None),
    }
}
