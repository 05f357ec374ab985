//! Error types for the editor

use pinpoint_common::CommonError;
use pinpoint_parser::ParseFailure;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error("No markup node starts at {line}:{column} in {filename}")]
    NotFound {
        filename: String,
        line: usize,
        column: usize,
    },
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: CommonError,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: CommonError,
    },

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("Node at {line}:{column} is {found}, expected {expected}")]
    WrongNode {
        line: usize,
        column: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Attribute '{attribute}' on <{tag}> is a dynamic expression, not a literal")]
    DynamicAttribute { tag: String, attribute: String },

    #[error("<{tag}> has no literal text child to edit")]
    NoTextChild { tag: String },

    #[error("Attribute edits need an attributeName")]
    MissingAttributeName,

    #[error("Invalid attribute name '{0}'")]
    InvalidAttributeName(String),

    #[error("Edit would leave {filename} unparseable: {source}")]
    Unparseable {
        filename: String,
        #[source]
        source: ParseFailure,
    },
}

pub type PatchResult<T> = Result<T, PatchError>;
