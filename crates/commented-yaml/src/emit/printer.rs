use super::scalar::write_double_quoted;
use super::{CommentLine, Item, Node, Pair, Root, ScalarNode};
use crate::error::Error;
use crate::event::CommentKind;
use crate::options::WriteOptions;

/// Width of the `- ` indicator that compact sequence items start with.
const ITEM_INDENT: usize = 2;

/// Render `root` as YAML text.
///
/// # Errors
///
/// Returns an unsupported-capability error when a comment run holds a line of
/// the wrong kind: leading runs and every trailing line after the first must
/// be block comments, and a trailing run must open with an inline comment or
/// the placeholder.
pub fn print(root: &Root, options: &WriteOptions) -> Result<String, Error> {
    let mut printer = Printer {
        out: String::new(),
        indent: options.indent.max(1),
    };
    for line in &root.leading {
        printer.block_comment(line, 0)?;
    }
    printer.top(&root.node)?;
    if !root.trailing.is_empty() {
        printer.out.push('\n');
        for line in &root.trailing {
            printer.block_comment(line, 0)?;
        }
    }
    Ok(printer.out)
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn pad(&mut self, width: usize) {
        self.out.extend(core::iter::repeat_n(' ', width));
    }

    fn top(&mut self, node: &Node) -> Result<(), Error> {
        match node {
            Node::Mapping(pairs) if !pairs.is_empty() => self.mapping(pairs, 0, false),
            Node::Sequence(items) if !items.is_empty() => self.sequence(items, 0, false),
            Node::Mapping(_) => {
                self.out.push_str("{}\n");
                Ok(())
            }
            Node::Sequence(_) => {
                self.out.push_str("[]\n");
                Ok(())
            }
            Node::Scalar(scalar) => {
                self.scalar(scalar);
                self.out.push('\n');
                Ok(())
            }
        }
    }

    fn scalar(&mut self, scalar: &ScalarNode) {
        if scalar.quoted {
            write_double_quoted(&mut self.out, &scalar.text);
        } else {
            self.out.push_str(&scalar.text);
        }
    }

    fn comment_text(&mut self, text: &str) {
        self.out.push('#');
        if !text.is_empty() {
            self.out.push(' ');
            self.out.push_str(text);
        }
    }

    fn block_comment(&mut self, line: &CommentLine, indent: usize) -> Result<(), Error> {
        if line.kind != CommentKind::Block {
            return Err(Error::unsupported(format!(
                "expected a block comment line, found {:?}",
                line.kind
            )));
        }
        self.pad(indent);
        self.comment_text(&line.text);
        self.out.push('\n');
        Ok(())
    }

    /// Comments above an entry, always separated from what precedes them by a
    /// blank line.
    fn leading(&mut self, lines: &[&CommentLine], indent: usize) -> Result<(), Error> {
        if lines.is_empty() {
            return Ok(());
        }
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
        for line in lines {
            self.block_comment(line, indent)?;
        }
        Ok(())
    }

    /// Finish the entry's line with the post-token run.
    fn trailing(&mut self, run: &[CommentLine], indent: usize) -> Result<(), Error> {
        let mut lines = run.iter();
        if let Some(first) = lines.next() {
            match first.kind {
                CommentKind::Inline => {
                    self.out.push(' ');
                    self.comment_text(&first.text);
                }
                CommentKind::Blank => {}
                CommentKind::Block => {
                    return Err(Error::unsupported(
                        "a trailing comment run must start with an inline comment or a placeholder",
                    ));
                }
            }
        }
        self.out.push('\n');
        for line in lines {
            self.block_comment(line, indent)?;
        }
        Ok(())
    }

    /// Write what follows a `key:` or `-` indicator.
    fn value(
        &mut self,
        value: &Node,
        trailing: &[CommentLine],
        indent: usize,
        nested: usize,
    ) -> Result<(), Error> {
        match value {
            Node::Scalar(scalar) => {
                self.out.push(' ');
                self.scalar(scalar);
                self.trailing(trailing, indent)
            }
            Node::Mapping(pairs) if pairs.is_empty() => {
                self.out.push_str(" {}");
                self.trailing(trailing, indent)
            }
            Node::Sequence(items) if items.is_empty() => {
                self.out.push_str(" []");
                self.trailing(trailing, indent)
            }
            Node::Mapping(pairs) => {
                self.trailing(trailing, indent)?;
                self.mapping(pairs, nested, false)
            }
            Node::Sequence(items) => {
                self.trailing(trailing, indent)?;
                self.sequence(items, nested, false)
            }
        }
    }

    /// Block mapping at `indent`. With `compact`, the first key continues the
    /// current line and its leading comments have already been written.
    fn mapping(&mut self, pairs: &[Pair], indent: usize, compact: bool) -> Result<(), Error> {
        for (i, pair) in pairs.iter().enumerate() {
            if !(compact && i == 0) {
                let leading: Vec<&CommentLine> = pair.leading.iter().collect();
                self.leading(&leading, indent)?;
                self.pad(indent);
            }
            self.scalar(&pair.key);
            self.out.push(':');
            self.value(&pair.value, &pair.trailing, indent, indent + self.indent)?;
        }
        Ok(())
    }

    fn sequence(&mut self, items: &[Item], indent: usize, compact: bool) -> Result<(), Error> {
        for (i, item) in items.iter().enumerate() {
            if !(compact && i == 0) {
                let mut leading = Vec::new();
                collect_leading(item, &mut leading);
                self.leading(&leading, indent)?;
                self.pad(indent);
            }
            self.out.push('-');
            match compact_child(item) {
                Some(Node::Mapping(pairs)) => {
                    self.out.push(' ');
                    self.mapping(pairs, indent + ITEM_INDENT, true)?;
                }
                Some(Node::Sequence(items)) => {
                    self.out.push(' ');
                    self.sequence(items, indent + ITEM_INDENT, true)?;
                }
                _ => self.value(&item.value, &item.trailing, indent, indent + ITEM_INDENT)?,
            }
        }
        Ok(())
    }
}

/// The item's value when it is written on the item's own line (`- k: v`,
/// `- - x`), which requires a non-empty collection and no trailing run.
fn compact_child(item: &Item) -> Option<&Node> {
    if !item.trailing.is_empty() {
        return None;
    }
    match &item.value {
        Node::Mapping(pairs) if !pairs.is_empty() => Some(&item.value),
        Node::Sequence(items) if !items.is_empty() => Some(&item.value),
        _ => None,
    }
}

/// Leading lines written above an item's `-`, including those of the first
/// entry of a compact child, which shares the item's line.
fn collect_leading<'a>(item: &'a Item, lines: &mut Vec<&'a CommentLine>) {
    lines.extend(&item.leading);
    match compact_child(item) {
        Some(Node::Mapping(pairs)) => {
            if let Some(first) = pairs.first() {
                lines.extend(&first.leading);
            }
        }
        Some(Node::Sequence(items)) => {
            if let Some(first) = items.first() {
                collect_leading(first, lines);
            }
        }
        _ => {}
    }
}
