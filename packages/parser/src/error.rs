//! Error types for the markup parser

use std::ops::Range;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with the byte range it refers to
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {span:?}: expected {expected}, found {found}")]
    UnexpectedToken {
        span: Range<usize>,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file at {pos}: expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("Invalid syntax at {span:?}: {message}")]
    InvalidSyntax { span: Range<usize>, message: String },

    #[error("Lexer error at {span:?}")]
    LexError { span: Range<usize> },
}

impl ParseError {
    pub fn unexpected_token(
        span: Range<usize>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span,
            message: message.into(),
        }
    }

    pub fn lex_error(span: Range<usize>) -> Self {
        Self::LexError { span }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            ParseError::UnexpectedToken { span, .. } => span.clone(),
            ParseError::UnexpectedEof { pos, .. } => *pos..*pos,
            ParseError::InvalidSyntax { span, .. } => span.clone(),
            ParseError::LexError { span } => span.clone(),
        }
    }

    /// Short label used when rendering the error against source
    pub fn label(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. } => format!("expected {}", expected),
            ParseError::UnexpectedEof { expected, .. } => format!("expected {}", expected),
            ParseError::InvalidSyntax { message, .. } => message.clone(),
            ParseError::LexError { .. } => "unrecognized input".to_string(),
        }
    }
}

/// A file could not be parsed. This is what crosses the parser boundary.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to parse {filename}: {error}")]
pub struct ParseFailure {
    pub filename: String,
    #[source]
    pub error: ParseError,
}

impl ParseFailure {
    pub fn new(filename: impl Into<String>, error: ParseError) -> Self {
        Self {
            filename: filename.into(),
            error,
        }
    }

    /// Human readable message without the span noise
    pub fn message(&self) -> String {
        format!("{}: {}", self.filename, self.error.label())
    }
}

#[cfg(feature = "pretty-errors")]
impl ParseFailure {
    /// Report with the offending source excerpt
    pub fn render(&self, source: &str) -> String {
        pretty::format_failure(self, source)
    }
}

#[cfg(feature = "pretty-errors")]
pub mod pretty {
    use super::ParseFailure;
    use ariadne::{Color, Label, Report, ReportKind, Source};

    /// Pretty-print a parse failure with source context using ariadne
    pub fn format_failure(failure: &ParseFailure, source: &str) -> String {
        let filename = failure.filename.as_str();
        let mut span = failure.error.span();
        if span.start >= source.len() {
            let last = source.char_indices().last().map(|(i, _)| i).unwrap_or(0);
            span = last..source.len();
        }
        // ariadne counts in chars, not bytes
        let start = source[..span.start].chars().count();
        let end = start + source[span.start..span.end.clamp(span.start, source.len())].chars().count();

        let mut output = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_message(failure.error.to_string())
            .with_label(
                Label::new((filename, start..end.max(start + 1)))
                    .with_color(Color::Red)
                    .with_message(failure.error.label()),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output);

        match written {
            Ok(()) => String::from_utf8(output)
                .unwrap_or_else(|_| "Error formatting failed".to_string()),
            Err(_) => failure.to_string(),
        }
    }
}
