//! Text rendering of a document tree with comment runs attached.
//!
//! The [`writer`](crate::writer) decides what each node says; this module only
//! decides how it looks.

mod printer;
mod scalar;

pub use self::printer::print;
pub(crate) use self::scalar::{present, present_key};

use crate::event::CommentKind;

/// One comment line, or the placeholder that holds the entry's own line open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub kind: CommentKind,
    pub text: String,
}

impl CommentLine {
    pub fn block(text: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Block,
            text: text.into(),
        }
    }

    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Inline,
            text: text.into(),
        }
    }

    /// Stands in for a missing inline comment when lines follow it.
    pub fn placeholder() -> Self {
        Self {
            kind: CommentKind::Blank,
            text: String::new(),
        }
    }
}

/// Scalar text and whether it must be quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarNode {
    pub text: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(ScalarNode),
    Mapping(Vec<Pair>),
    Sequence(Vec<Item>),
}

/// A mapping pair.
///
/// `leading` lines are written above the key. `trailing` is the post-token
/// run: its first line (inline comment or placeholder) goes on the key's line,
/// later lines follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: ScalarNode,
    pub value: Node,
    pub leading: Vec<CommentLine>,
    pub trailing: Vec<CommentLine>,
}

/// A sequence item, with comment runs as for [`Pair`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub value: Node,
    pub leading: Vec<CommentLine>,
    pub trailing: Vec<CommentLine>,
}

/// The document root with its header (`leading`) and footer (`trailing`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub leading: Vec<CommentLine>,
    pub node: Node,
    pub trailing: Vec<CommentLine>,
}
