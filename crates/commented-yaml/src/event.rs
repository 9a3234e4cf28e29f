//! The event vocabulary consumed by the composer.

use alloc::collections::VecDeque;

use crate::error::Error;

/// Zero-based source position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark {
    pub line: usize,
    pub col: usize,
}

impl Mark {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStyle {
    Block,
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// The only content on its line.
    Block,
    /// Follows other content on its line.
    Inline,
    /// A whitespace-only line.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    MappingStart {
        anchor: Option<String>,
        style: CollectionStyle,
    },
    MappingEnd,
    SequenceStart {
        anchor: Option<String>,
        style: CollectionStyle,
    },
    SequenceEnd,
    Scalar {
        value: String,
        style: ScalarStyle,
        anchor: Option<String>,
        /// Shorthand form for core tags (`!!str`), full text otherwise.
        tag: Option<String>,
        /// Plain and untagged, so subject to core-schema resolution.
        implicit: bool,
    },
    Alias {
        anchor: String,
    },
    Comment {
        /// Body after `#` with one leading space removed; empty for blanks.
        text: String,
        kind: CommentKind,
    },
}

impl EventKind {
    /// Short name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::StreamStart => "stream start",
            Self::StreamEnd => "stream end",
            Self::DocumentStart => "document start",
            Self::DocumentEnd => "document end",
            Self::MappingStart { .. } => "a mapping",
            Self::MappingEnd => "mapping end",
            Self::SequenceStart { .. } => "a sequence",
            Self::SequenceEnd => "sequence end",
            Self::Scalar { .. } => "a scalar",
            Self::Alias { .. } => "an alias",
            Self::Comment { .. } => "a comment",
        }
    }

    /// A plain scalar with no tag or anchor.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::Scalar {
            value: value.into(),
            style: ScalarStyle::Plain,
            anchor: None,
            tag: None,
            implicit: true,
        }
    }

    pub fn block_mapping() -> Self {
        Self::MappingStart {
            anchor: None,
            style: CollectionStyle::Block,
        }
    }

    pub fn block_sequence() -> Self {
        Self::SequenceStart {
            anchor: None,
            style: CollectionStyle::Block,
        }
    }

    pub fn comment(text: impl Into<String>, kind: CommentKind) -> Self {
        Self::Comment {
            text: text.into(),
            kind,
        }
    }

    pub fn blank() -> Self {
        Self::Comment {
            text: String::new(),
            kind: CommentKind::Blank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub start: Mark,
    pub end: Mark,
}

impl Event {
    pub fn new(kind: EventKind, start: Mark, end: Mark) -> Self {
        Self { kind, start, end }
    }

    /// An event occupying a single position.
    pub fn at(kind: EventKind, line: usize, col: usize) -> Self {
        let mark = Mark::new(line, col);
        Self::new(kind, mark, mark)
    }
}

/// Producer of positioned events, comments and blank-line markers included.
pub trait EventSource {
    /// The next event, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input cannot be tokenized.
    fn next_event(&mut self) -> Result<Option<Event>, Error>;
}

/// An [`EventSource`] over events prepared up front.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for EventQueue {
    fn next_event(&mut self) -> Result<Option<Event>, Error> {
        Ok(self.events.pop_front())
    }
}

impl FromIterator<Event> for EventQueue {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter)
    }
}
