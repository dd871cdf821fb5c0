//! Error types for the Go front end

use std::ops::Range;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A fatal syntax error, carrying the offending source for miette reporting.
#[derive(Debug, Error, Diagnostic)]
#[error("failed to parse {filename}: {message}")]
#[diagnostic(
    code(tracegen::parse_error),
    help("the source must be a syntactically valid Go file")
)]
pub struct ParseError {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    filename: String,
    message: String,
    label: String,
}

impl ParseError {
    /// Create a parse error at the given byte range.
    pub fn new(
        src: &str,
        filename: &str,
        span: Range<usize>,
        message: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            src: NamedSource::new(filename, src.to_string()),
            span: span.into(),
            filename: filename.to_string(),
            message: message.into(),
            label: label.into(),
        }
    }

    /// The human-readable message, without the file prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The file the error was found in.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Byte offset of the error in the source.
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_names_file() {
        let err = ParseError::new("package x", "user.go", 0..7, "unexpected token", "here");
        assert_eq!(err.to_string(), "failed to parse user.go: unexpected token");
        assert_eq!(err.message(), "unexpected token");
        assert_eq!(err.offset(), 0);
    }
}
