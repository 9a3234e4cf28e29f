use core::fmt::Write;

use anyhow::{Context, Result};
use commented_yaml::{CommentLocation, Document, Entry, KeyPath, ReadOptions, Tree, Value};

use crate::InspectArgs;

/// Run the `inspect` command: print where every comment of a document landed.
pub fn run(args: &InspectArgs, options: &ReadOptions) -> Result<()> {
    let document = super::read_document(&args.file, options)?;
    if args.json {
        let json = serde_json::to_string_pretty(&document).context("failed to serialize JSON")?;
        println!("{json}");
    } else {
        print!("{}", render(&document));
    }
    Ok(())
}

/// One line per entry (`path (line N)`), followed by its comments.
pub fn render(document: &Document) -> String {
    let mut out = String::new();
    for text in &document.header {
        let _ = writeln!(out, "header: {text}");
    }
    let mut path = KeyPath::new();
    tree(&mut out, &document.root, &mut path);
    for text in &document.footer {
        let _ = writeln!(out, "footer: {text}");
    }
    out
}

fn tree(out: &mut String, tree: &Tree, path: &mut KeyPath) {
    for (key, entry) in tree {
        path.push_key(key.as_str());
        describe(out, entry, path);
        path.pop();
    }
}

fn describe(out: &mut String, entry: &Entry, path: &mut KeyPath) {
    match entry.line {
        Some(line) => {
            let _ = writeln!(out, "{path} (line {})", line + 1);
        }
        None => {
            let _ = writeln!(out, "{path}");
        }
    }
    for (label, location) in [
        ("above", CommentLocation::Above),
        ("inline", CommentLocation::Inline),
        ("below", CommentLocation::Below),
    ] {
        for text in entry.comments.get(location) {
            let _ = writeln!(out, "  {label}: {text}");
        }
    }
    match &entry.value {
        Value::Tree(nested) => tree(out, nested, path),
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push_index(index);
                describe(out, item, path);
                path.pop();
            }
        }
        Value::Scalar(_) => {}
    }
}
