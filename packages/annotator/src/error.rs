use pinpoint_parser::ParseFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    /// Removing earlier annotations left text that no longer parses
    #[error("{filename}: source no longer parses after removing old annotations: {source}")]
    Refresh {
        filename: String,
        #[source]
        source: ParseFailure,
    },

    #[error("{filename}: annotation panicked: {message}")]
    Panicked { filename: String, message: String },
}

pub type AnnotateResult<T> = Result<T, AnnotateError>;
