pub mod inspect;
pub mod roundtrip;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use commented_yaml::{Document, ReadOptions};
use miette::Report;

use crate::diagnostics::SourceDiagnostic;

/// Read `path` into a document.
///
/// A document error is reported on stderr against the file's source before
/// failing.
pub fn read_document(path: &Path, options: &ReadOptions) -> Result<Document> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.display().to_string();
    match commented_yaml::read_str(&content, options) {
        Ok(Some(document)) => Ok(document),
        Ok(None) => bail!("{name} does not contain a document"),
        Err(error) => {
            let kind = error.kind();
            eprintln!("{:?}", Report::new(SourceDiagnostic::new(&name, content, error)));
            bail!("{name}: {kind}")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn reads_a_document_from_disk() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("doc.yaml");
        fs::write(&path, "# head\na: 1\n")?;

        let document = read_document(&path, &ReadOptions::default())?;
        assert_eq!(document.header, vec!["head"]);
        Ok(())
    }

    #[test]
    fn empty_and_invalid_files_fail() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("doc.yaml");

        fs::write(&path, "# nothing here\n")?;
        let err = read_document(&path, &ReadOptions::default()).expect_err("no document");
        assert!(err.to_string().contains("does not contain a document"));

        fs::write(&path, "- a\n")?;
        let err = read_document(&path, &ReadOptions::default()).expect_err("list root");
        assert!(err.to_string().ends_with("malformed document"));
        Ok(())
    }
}
