//! Recovers comments and blank lines from source text.
//!
//! The YAML parser discards both, so they are found by scanning lines while
//! skipping the character ranges occupied by scalars.

use crate::event::{CommentKind, Mark};

/// A half-open range of char indices that belongs to a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Protected {
    pub start: usize,
    pub end: usize,
}

/// A comment or blank line found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceComment {
    pub mark: Mark,
    pub kind: CommentKind,
    pub text: String,
}

/// Scan `content` for comments and blank lines.
///
/// `protected` must be sorted by `start` and non-overlapping.
pub(crate) fn scan(content: &str, protected: &[Protected]) -> Vec<SourceComment> {
    let covered = |index: usize| {
        let after = protected.partition_point(|range| range.start <= index);
        after > 0 && index < protected[after - 1].end
    };

    let mut found = Vec::new();
    let mut line_start = 0;
    let mut lines = content.split('\n').enumerate().peekable();
    while let Some((line_no, raw)) = lines.next() {
        if raw.is_empty() && lines.peek().is_none() {
            // Text after the final newline.
            break;
        }
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            if !covered(line_start) {
                found.push(SourceComment {
                    mark: Mark::new(line_no, 0),
                    kind: CommentKind::Blank,
                    text: String::new(),
                });
            }
        } else if let Some((col, text)) = find_comment(line, |col| covered(line_start + col)) {
            let whole_line = line.chars().take(col).all(char::is_whitespace);
            found.push(SourceComment {
                mark: Mark::new(line_no, col),
                kind: if whole_line {
                    CommentKind::Block
                } else {
                    CommentKind::Inline
                },
                text: comment_body(text),
            });
        }
        line_start += raw.chars().count() + 1;
    }
    found
}

/// Column and text (from `#`) of the first comment on `line`.
///
/// A `#` starts a comment at line start or after whitespace, unless its
/// column is inside a scalar.
fn find_comment(line: &str, covered: impl Fn(usize) -> bool) -> Option<(usize, &str)> {
    let mut prev = None;
    for (col, (byte, c)) in line.char_indices().enumerate() {
        if c == '#' && prev.is_none_or(|p: char| p == ' ' || p == '\t') && !covered(col) {
            return Some((col, &line[byte..]));
        }
        prev = Some(c);
    }
    None
}

/// Strip the `#` marker and at most one following space.
pub(crate) fn comment_body(raw: &str) -> String {
    let body = raw.strip_prefix('#').unwrap_or(raw);
    body.strip_prefix(' ').unwrap_or(body).to_string()
}
