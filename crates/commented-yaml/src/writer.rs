//! Converts a [`Document`] into the emit tree, placing each entry's comments
//! in the runs the text format can carry.

use crate::comments::CommentData;
use crate::emit::{self, CommentLine, Item, Node, Pair, Root};
use crate::error::{Error, KeyPath};
use crate::value::{Document, Entry, Tree, Value};

/// Build the emit tree for `document`.
///
/// Header and footer comments become the root's leading and trailing block
/// lines. For every entry, ABOVE comments become leading block lines, and
/// INLINE and BELOW comments are merged into the single post-token run: the
/// inline comment (or a placeholder when there is none but BELOW lines
/// follow) comes first, then each BELOW line.
///
/// # Errors
///
/// Fails with an unsupported-capability error, carrying the entry's key path
/// and line, when an entry holds more than one inline comment.
#[tracing::instrument(level = "debug", skip_all)]
pub fn to_emit_tree(document: &Document) -> Result<Root, Error> {
    let mut path = KeyPath::new();
    Ok(Root {
        leading: document.header.iter().map(CommentLine::block).collect(),
        node: mapping(&document.root, &mut path)?,
        trailing: document.footer.iter().map(CommentLine::block).collect(),
    })
}

fn mapping(tree: &Tree, path: &mut KeyPath) -> Result<Node, Error> {
    let mut pairs = Vec::with_capacity(tree.len());
    for (key, entry) in tree {
        path.push_key(key.as_str());
        let pair = Pair {
            key: emit::present_key(key),
            value: node(&entry.value, path)?,
            leading: leading(&entry.comments),
            trailing: trailing(entry, path)?,
        };
        path.pop();
        pairs.push(pair);
    }
    Ok(Node::Mapping(pairs))
}

fn sequence(entries: &[Entry], path: &mut KeyPath) -> Result<Node, Error> {
    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        path.push_index(index);
        let item = Item {
            value: node(&entry.value, path)?,
            leading: leading(&entry.comments),
            trailing: trailing(entry, path)?,
        };
        path.pop();
        items.push(item);
    }
    Ok(Node::Sequence(items))
}

fn node(value: &Value, path: &mut KeyPath) -> Result<Node, Error> {
    match value {
        Value::Scalar(scalar) => Ok(Node::Scalar(emit::present(scalar))),
        Value::List(entries) => sequence(entries, path),
        Value::Tree(tree) => mapping(tree, path),
    }
}

fn leading(comments: &CommentData) -> Vec<CommentLine> {
    comments.above.iter().map(CommentLine::block).collect()
}

fn trailing(entry: &Entry, path: &KeyPath) -> Result<Vec<CommentLine>, Error> {
    let comments = &entry.comments;
    let first = match comments.inline.as_slice() {
        [] if comments.below.is_empty() => return Ok(Vec::new()),
        [] => CommentLine::placeholder(),
        [text] => CommentLine::inline(text),
        more => {
            let err = Error::unsupported(format!(
                "an entry can carry at most one inline comment, found {}",
                more.len()
            ))
            .at_path(path);
            return Err(match entry.line {
                Some(line) => err.at_line(line),
                None => err,
            });
        }
    };
    let mut run = Vec::with_capacity(comments.below.len() + 1);
    run.push(first);
    run.extend(comments.below.iter().map(CommentLine::block));
    Ok(run)
}
