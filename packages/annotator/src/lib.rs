//! Source annotation for visual editing
//!
//! Every markup element gets attributes that tie the rendered node back to
//! the file, line and column that produced it, plus a deterministic element
//! id. The editor uses those coordinates to patch the source later.

pub mod annotator;
pub mod classifier;
pub mod diagnostic;
pub mod error;
pub mod identity;
pub mod metadata;

pub use annotator::{
    annotate, annotate_with_sink, strip_annotations, try_annotate, AnnotateOptions, Annotation,
    AttributeNames, Stripped, DEFAULT_ATTRIBUTE_PREFIX,
};
pub use classifier::{first_literal_text, is_static_text};
pub use diagnostic::{Diagnostic, DiagnosticSink, IgnoreDiagnostics};
pub use error::{AnnotateError, AnnotateResult};
pub use identity::{element_id, format_element_id};
pub use metadata::{ElementMetadata, SourceLocation};
