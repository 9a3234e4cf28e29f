use alloc::borrow::Cow;
use core::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Broad category of a read or write failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The event source could not tokenize its input.
    Syntax,
    /// The event stream does not describe a single mapping-rooted document.
    Malformed,
    /// An alias names an anchor that was never defined.
    Reference,
    /// An alias refers to a container that is still being composed.
    Cycle,
    /// Too many non-scalar alias expansions.
    ResourceExhausted,
    /// The document uses something this format cannot represent.
    Unsupported,
}

impl ErrorKind {
    /// Stable diagnostic code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::Syntax => "commented_yaml::syntax",
            Self::Malformed => "commented_yaml::malformed",
            Self::Reference => "commented_yaml::reference",
            Self::Cycle => "commented_yaml::cycle",
            Self::ResourceExhausted => "commented_yaml::resource_exhausted",
            Self::Unsupported => "commented_yaml::unsupported",
        }
    }

    fn help(self) -> Option<&'static str> {
        match self {
            Self::Syntax | Self::Malformed => None,
            Self::Reference => Some("define the anchor (`&name`) before the first `*name` that uses it"),
            Self::Cycle => Some("an alias cannot refer to a collection that contains it"),
            Self::ResourceExhausted => {
                Some("raise `max-non-scalar-aliases` in the [read] configuration if this is intended")
            }
            Self::Unsupported => Some("move the comment or value to a location this format can store"),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Syntax => "syntax error",
            Self::Malformed => "malformed document",
            Self::Reference => "undefined reference",
            Self::Cycle => "recursive alias",
            Self::ResourceExhausted => "alias limit exceeded",
            Self::Unsupported => "unsupported",
        })
    }
}

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside the document tree, e.g. `servers[1].port`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.0.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Where in the document an error was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: KeyPath,
    /// Zero-based source line.
    pub line: Option<usize>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.path.is_root(), self.line) {
            (true, None) => Ok(()),
            (true, Some(line)) => write!(f, " (line {})", line + 1),
            (false, None) => write!(f, " (at `{}`)", self.path),
            (false, Some(line)) => write!(f, " (at `{}`, line {})", self.path, line + 1),
        }
    }
}

/// Error produced while reading or writing a commented document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}{location}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    location: Location,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::default(),
        }
    }

    pub fn syntax(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    pub fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }

    pub fn reference(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Reference, message)
    }

    pub fn cycle(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Cycle, message)
    }

    pub fn resource_exhausted(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ResourceExhausted, message)
    }

    pub fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    /// Attach the key path of the value being processed.
    #[must_use]
    pub fn at_path(mut self, path: &KeyPath) -> Self {
        self.location.path = path.clone();
        self
    }

    /// Attach a zero-based source line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.location.line = Some(line);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &KeyPath {
        &self.location.path
    }

    /// Zero-based source line, when known.
    pub fn line(&self) -> Option<usize> {
        self.location.line
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind
            .help()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }
}
