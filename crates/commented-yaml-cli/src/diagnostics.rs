use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

/// A read failure pointing at the offending line of the file.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SourceDiagnostic {
    pub src: NamedSource<String>,

    pub span: SourceSpan,

    pub error: commented_yaml::Error,
}

impl SourceDiagnostic {
    pub fn new(name: &str, content: String, error: commented_yaml::Error) -> Self {
        let span = error
            .line()
            .map_or_else(|| SourceSpan::from((0, 0)), |line| line_span(&content, line));
        Self {
            src: NamedSource::new(name, content).with_language("yaml"),
            span,
            error,
        }
    }
}

impl Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn core::fmt::Display + 'a>> {
        self.error.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn core::fmt::Display + 'a>> {
        self.error.help()
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let path = self.error.path();
        let label = if path.is_root() {
            "here".to_string()
        } else {
            path.to_string()
        };
        Some(Box::new(core::iter::once(LabeledSpan::new(
            Some(label),
            self.span.offset(),
            self.span.len(),
        ))))
    }
}

/// Byte span of zero-based `line`, without its line break.
///
/// Lines past the end map to an empty span at the end of `content`.
pub fn line_span(content: &str, line: usize) -> SourceSpan {
    let mut offset = 0;
    for (i, text) in content.split_inclusive('\n').enumerate() {
        if i == line {
            let len = text.trim_end_matches(['\n', '\r']).len();
            return (offset, len).into();
        }
        offset += text.len();
    }
    (content.len(), 0).into()
}
