use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Bundles the file content and display name so error constructors don't
/// need both at every call site.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn toml_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a parse error from a serde_json error.
    pub fn json_error(&self, source: serde_json::Error) -> Box<Error> {
        let span = line_column_offset(&self.src, source.line(), source.column())
            .map(|offset| SourceSpan::from(offset..offset));
        Box::new(Error::Json {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error, pointing at `needle` when it occurs in the source.
    pub fn validation_error(&self, message: impl Into<String>, needle: Option<&str>) -> Box<Error> {
        let span = needle.and_then(|needle| {
            self.src
                .find(needle)
                .map(|start| SourceSpan::from(start..start + needle.len()))
        });
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }
}

/// Convert a 1-based line and column into a byte offset.
fn line_column_offset(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    for (index, text) in src.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return Some(offset + column.saturating_sub(1).min(text.len()));
        }
        offset += text.len();
    }
    Some(src.len())
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(tracegen::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse task file")]
    #[diagnostic(code(tracegen::task_file::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse task file")]
    #[diagnostic(code(tracegen::task_file::parse_error))]
    Json {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(tracegen::task_file::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("no module directive in '{path}'")]
    #[diagnostic(
        code(tracegen::go_mod::missing_module),
        help("go.mod must declare the module path, e.g. 'module example.com/app'")
    )]
    MissingModule { path: PathBuf },
}

impl Error {
    /// Create an I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column_offset() {
        let src = "[\n  {\"a\": 1}\n]";
        assert_eq!(line_column_offset(src, 1, 1), Some(0));
        assert_eq!(line_column_offset(src, 2, 3), Some(4));
        assert_eq!(line_column_offset(src, 9, 1), Some(src.len()));
        assert_eq!(line_column_offset(src, 0, 0), None);
    }

    #[test]
    fn test_validation_error_points_at_needle() {
        let ctx = SourceContext::new("[templates.bad-kind]\npath = \"x\"", "tracegen.toml");
        let err = ctx.validation_error("invalid template kind", Some("bad-kind"));

        match *err {
            Error::Validation { span, .. } => {
                let span = span.expect("span should be found");
                assert_eq!(span.offset(), 11);
                assert_eq!(span.len(), 8);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
