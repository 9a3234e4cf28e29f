#![doc = include_str!("../README.md")]

extern crate alloc;

mod comments;
mod compose;
pub mod emit;
mod error;
pub mod event;
mod options;
mod resolve;
pub mod source;
mod value;
mod writer;

pub use self::comments::{CommentData, CommentLocation};
pub use self::compose::compose;
pub use self::error::{Error, ErrorKind, KeyPath, PathSegment};
pub use self::options::{DuplicateKeyPolicy, ReadOptions, WriteOptions};
pub use self::source::SaphyrSource;
pub use self::value::{Document, Entry, Scalar, Tree, Value};
pub use self::writer::to_emit_tree;

use self::event::EventSource;

/// Read a YAML document, attributing each comment to the entry it describes.
///
/// Returns `Ok(None)` for a stream without a document (empty, or only
/// comments and blank lines).
///
/// # Errors
///
/// Returns an error when the text is not valid YAML, when it does not hold a
/// single mapping-rooted document, or when an alias is undefined, recursive,
/// or exceeds [`ReadOptions::max_non_scalar_aliases`].
#[tracing::instrument(skip_all, fields(len = content.len()))]
pub fn read_str(content: &str, options: &ReadOptions) -> Result<Option<Document>, Error> {
    let source = SaphyrSource::new(content)?;
    compose(source, options)
}

/// Read a document from any [`EventSource`].
///
/// # Errors
///
/// See [`compose`].
pub fn read_events<S: EventSource>(
    source: S,
    options: &ReadOptions,
) -> Result<Option<Document>, Error> {
    compose(source, options)
}

/// Write `document` as YAML text with its comments.
///
/// # Errors
///
/// Returns an unsupported-capability error when an entry holds more than one
/// inline comment.
#[tracing::instrument(skip_all)]
pub fn write_string(document: &Document, options: &WriteOptions) -> Result<String, Error> {
    let root = to_emit_tree(document)?;
    emit::print(&root, options)
}
