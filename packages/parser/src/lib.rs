//! Located parser for JSX/TSX component sources
//!
//! The host script is skimmed, not fully parsed: the tree keeps markup
//! (elements, fragments, attributes, children) and the named function and
//! class scopes that enclose it. Every node carries a [`ast::Span`] with
//! 1-based lines, 0-based character columns and byte offsets.

pub mod ast;
pub mod error;
pub mod line_index;
pub mod parser;
pub mod tokenizer;

pub use error::{ParseError, ParseFailure, ParseResult};
pub use line_index::LineIndex;
pub use parser::{parse, parse_with_options, ParseOptions, Parser};
pub use tokenizer::{tokenize, ScriptToken, TagToken};

#[cfg(feature = "pretty-errors")]
pub use error::pretty::format_failure;
