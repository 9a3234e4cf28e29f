use anyhow::{Context, Result};
use commented_yaml::{Document, ReadOptions, WriteOptions};

use crate::RoundtripArgs;

/// Run the `roundtrip` command: re-write a document to stdout.
///
/// Returns `false` when `--check` is set and the output does not read back as
/// the same document.
pub fn run(args: &RoundtripArgs, read: &ReadOptions, write: &WriteOptions) -> Result<bool> {
    let document = super::read_document(&args.file, read)?;
    let output = commented_yaml::write_string(&document, write)
        .with_context(|| format!("failed to write {}", args.file.display()))?;
    print!("{output}");

    if !args.check {
        return Ok(true);
    }
    let stable = reads_back(&document, &output, read)?;
    if !stable {
        eprintln!(
            "{}: the written document does not read back unchanged",
            args.file.display()
        );
    }
    Ok(stable)
}

/// Whether `output` reads back as `document`, comments included.
pub fn reads_back(document: &Document, output: &str, options: &ReadOptions) -> Result<bool> {
    let again = commented_yaml::read_str(output, options).context("failed to re-read output")?;
    let stable = again.as_ref() == Some(document);
    tracing::debug!(stable, "compared re-read document");
    Ok(stable)
}

#[cfg(test)]
mod tests {
    use commented_yaml::{CommentData, Entry, Tree};

    use super::*;

    fn document(input: &str) -> Document {
        commented_yaml::read_str(input, &ReadOptions::default())
            .expect("valid")
            .expect("document")
    }

    #[test]
    fn written_output_reads_back() -> anyhow::Result<()> {
        let doc = document("a: 1 # one\n# below\n\n# about b\nb:\n  - x\n");
        let output = commented_yaml::write_string(&doc, &WriteOptions::default())?;
        assert!(reads_back(&doc, &output, &ReadOptions::default())?);
        Ok(())
    }

    #[test]
    fn misplaced_comments_are_detected() -> anyhow::Result<()> {
        // Comments above the first key of a compact list item are written
        // above the dash, where they read back as the item's own.
        let first: Tree = [(
            "a",
            Entry::new(1_i64).with_comments(CommentData::new().with_above("about a")),
        )]
        .into_iter()
        .collect();
        let doc = Document::new(
            [("xs", Entry::new(vec![Entry::new(first)]))]
                .into_iter()
                .collect(),
        );
        let output = commented_yaml::write_string(&doc, &WriteOptions::default())?;
        assert!(!reads_back(&doc, &output, &ReadOptions::default())?);
        Ok(())
    }
}
