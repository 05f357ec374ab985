//! Idempotent injection of location metadata into markup elements
//!
//! A pass first removes every attribute carrying one of the reserved names,
//! then parses the clean text and inserts fresh attributes right after each
//! tag name. Positions always refer to the clean text, so annotating
//! annotated output reproduces it byte for byte.

use crate::classifier::{first_literal_text, is_static_text};
use crate::diagnostic::{Diagnostic, DiagnosticSink, IgnoreDiagnostics};
use crate::error::{AnnotateError, AnnotateResult};
use crate::metadata::ElementMetadata;
use pinpoint_common::{panic_message, walk_module, AncestorVisitor, NodeRef};
use pinpoint_parser::ast::{Attribute, Module};
use pinpoint_parser::{parse, LineIndex};
use serde::Serialize;
use std::borrow::Cow;
use std::ops::Range;

pub const DEFAULT_ATTRIBUTE_PREFIX: &str = "data-pinpoint";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Namespace for every injected attribute name
    pub attribute_prefix: String,
    /// Tags left untouched; fragments reject unknown props
    pub skip_elements: Vec<String>,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            attribute_prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
            skip_elements: vec!["Fragment".to_string(), "React.Fragment".to_string()],
        }
    }
}

impl AnnotateOptions {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            attribute_prefix: prefix.into(),
            ..Self::default()
        }
    }

    fn skips(&self, tag: &str) -> bool {
        self.skip_elements.iter().any(|skip| skip == tag)
    }
}

/// The reserved attribute names under one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    pub info: String,
    pub position: String,
    pub element_id: String,
    pub file: String,
    pub line: String,
    pub column: String,
    pub component: String,
    pub function: String,
    pub static_content: String,
    pub children_source: String,
}

impl AttributeNames {
    pub fn new(prefix: &str) -> Self {
        let name = |suffix: &str| format!("{}-{}", prefix, suffix);
        Self {
            info: name("info"),
            position: name("position"),
            element_id: name("element-id"),
            file: name("file"),
            line: name("line"),
            column: name("column"),
            component: name("component"),
            function: name("function"),
            static_content: name("static-content"),
            children_source: name("children-source"),
        }
    }

    /// All names in injection order
    pub fn all(&self) -> [&str; 10] {
        [
            self.info.as_str(),
            self.position.as_str(),
            self.element_id.as_str(),
            self.file.as_str(),
            self.line.as_str(),
            self.column.as_str(),
            self.component.as_str(),
            self.function.as_str(),
            self.static_content.as_str(),
            self.children_source.as_str(),
        ]
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.all().contains(&name)
    }
}

/// JSON carried by the `info` attribute
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoBlob<'a> {
    file: &'a str,
    line: usize,
    column: usize,
    element_type: &'a str,
    component_name: Option<&'a str>,
    function_name: Option<&'a str>,
    element_id: &'a str,
}

/// Output of a successful pass
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub code: String,
    /// One entry per annotated element, in source order
    pub elements: Vec<ElementMetadata>,
}

/// Annotate `code`, returning it unchanged if anything goes wrong
pub fn annotate(code: &str, filename: &str, options: &AnnotateOptions) -> String {
    annotate_with_sink(code, filename, options, &mut IgnoreDiagnostics)
}

/// Like [`annotate`], reporting failures to `sink`
pub fn annotate_with_sink(
    code: &str,
    filename: &str,
    options: &AnnotateOptions,
    sink: &mut dyn DiagnosticSink,
) -> String {
    let outcome = std::panic::catch_unwind(|| try_annotate(code, filename, options))
        .unwrap_or_else(|payload| {
            Err(AnnotateError::Panicked {
                filename: filename.to_string(),
                message: panic_message(&*payload),
            })
        });

    match outcome {
        Ok(annotation) => annotation.code,
        Err(error) => {
            tracing::warn!("Leaving {} unannotated: {}", filename, error);
            sink.report(diagnostic_for(code, filename, &error));
            code.to_string()
        }
    }
}

/// Annotate `code`, surfacing failures
pub fn try_annotate(code: &str, filename: &str, options: &AnnotateOptions) -> AnnotateResult<Annotation> {
    let names = AttributeNames::new(&options.attribute_prefix);
    let module = parse(code, filename)?;
    let removed = reserved_ranges(code, &module, &names);

    let (clean, module) = if removed.is_empty() {
        (Cow::Borrowed(code), module)
    } else {
        let clean = remove_ranges(code, &removed);
        let module = parse(&clean, filename).map_err(|source| AnnotateError::Refresh {
            filename: filename.to_string(),
            source,
        })?;
        (Cow::Owned(clean), module)
    };

    let mut injector = Injector {
        filename,
        options,
        names: &names,
        insertions: Vec::new(),
        elements: Vec::new(),
    };
    walk_module(&mut injector, &module);

    tracing::debug!(
        "annotated {} elements in {} ({} stale attributes removed)",
        injector.elements.len(),
        filename,
        removed.len()
    );

    Ok(Annotation {
        code: splice(&clean, injector.insertions),
        elements: injector.elements,
    })
}

/// Source with every reserved attribute removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub code: String,
    /// Removed byte ranges of the original text, ascending
    pub removed: Vec<Range<usize>>,
}

impl Stripped {
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty()
    }

    /// Map a byte offset in the stripped text back to the original text
    pub fn original_offset(&self, offset: usize) -> usize {
        let mut shift = 0;
        for range in &self.removed {
            if range.start - shift > offset {
                break;
            }
            shift += range.len();
        }
        offset + shift
    }
}

/// Remove the attributes a previous pass with `prefix` injected
pub fn strip_annotations(code: &str, filename: &str, prefix: &str) -> AnnotateResult<Stripped> {
    let module = parse(code, filename)?;
    let removed = reserved_ranges(code, &module, &AttributeNames::new(prefix));
    Ok(Stripped {
        code: remove_ranges(code, &removed),
        removed,
    })
}

/// Byte ranges of reserved attributes, each with the spaces before it
fn reserved_ranges(code: &str, module: &Module, names: &AttributeNames) -> Vec<Range<usize>> {
    struct Collect<'n> {
        names: &'n AttributeNames,
        ranges: Vec<Range<usize>>,
    }

    impl<'a> AncestorVisitor<'a> for Collect<'_> {
        fn on_node(&mut self, node: NodeRef<'a>, _ancestors: &[NodeRef<'a>]) {
            let Some(element) = node.as_element() else {
                return;
            };
            for attr in &element.opening.attributes {
                if let Attribute::Named(named) = attr {
                    if self.names.is_reserved(&named.name.value) {
                        self.ranges.push(named.span.range());
                    }
                }
            }
        }
    }

    let mut collect = Collect {
        names,
        ranges: Vec::new(),
    };
    walk_module(&mut collect, module);

    let bytes = code.as_bytes();
    let mut ranges: Vec<Range<usize>> = collect
        .ranges
        .into_iter()
        .map(|range| {
            let mut start = range.start;
            while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
                start -= 1;
            }
            start..range.end
        })
        .collect();
    ranges.sort_by_key(|range| range.start);
    ranges
}

fn remove_ranges(code: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(code.len());
    let mut last = 0;
    for range in ranges {
        out.push_str(&code[last..range.start]);
        last = range.end;
    }
    out.push_str(&code[last..]);
    out
}

fn splice(code: &str, mut insertions: Vec<(usize, String)>) -> String {
    insertions.sort_by_key(|(offset, _)| *offset);

    let extra: usize = insertions.iter().map(|(_, text)| text.len()).sum();
    let mut out = String::with_capacity(code.len() + extra);
    let mut last = 0;
    for (offset, text) in &insertions {
        out.push_str(&code[last..*offset]);
        out.push_str(text);
        last = *offset;
    }
    out.push_str(&code[last..]);
    out
}

struct Injector<'a> {
    filename: &'a str,
    options: &'a AnnotateOptions,
    names: &'a AttributeNames,
    insertions: Vec<(usize, String)>,
    elements: Vec<ElementMetadata>,
}

impl<'a> AncestorVisitor<'a> for Injector<'_> {
    fn on_node(&mut self, node: NodeRef<'a>, ancestors: &[NodeRef<'a>]) {
        let Some(element) = node.as_element() else {
            return;
        };
        if self.options.skips(element.tag_name()) {
            return;
        }

        let metadata = ElementMetadata::compute(self.filename, element, ancestors);
        let names = self.names;
        let location = &metadata.location;

        let info = InfoBlob {
            file: &location.file,
            line: location.line,
            column: location.column,
            element_type: &metadata.tag_name,
            component_name: metadata.component_name.as_deref(),
            function_name: metadata.function_name.as_deref(),
            element_id: &metadata.element_id,
        };
        let info = serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string());

        let mut attrs = String::new();
        push_attribute(&mut attrs, &names.info, &info, '\'');
        push_attribute(&mut attrs, &names.position, &metadata.position(), '"');
        push_attribute(&mut attrs, &names.element_id, &metadata.element_id, '"');
        push_attribute(&mut attrs, &names.file, &location.file, '"');
        push_attribute(&mut attrs, &names.line, &location.line.to_string(), '"');
        push_attribute(&mut attrs, &names.column, &location.column.to_string(), '"');
        if let Some(component) = &metadata.component_name {
            push_attribute(&mut attrs, &names.component, component, '"');
        }
        if let Some(function) = &metadata.function_name {
            push_attribute(&mut attrs, &names.function, function, '"');
        }
        // Checked again against the element itself right before writing
        if metadata.is_static_text && is_static_text(element) {
            push_attribute(&mut attrs, &names.static_content, "true", '"');
        }
        if let Some(text) = first_literal_text(element) {
            let source = format!(
                "{}:{}:{}",
                location.file, text.span.start.line, text.span.start.column
            );
            push_attribute(&mut attrs, &names.children_source, &source, '"');
        }

        tracing::trace!("{} -> {}", metadata.element_id, element.opening.name.span.end.offset);
        self.insertions.push((element.opening.name.span.end.offset, attrs));
        self.elements.push(metadata);
    }
}

/// Append ` name="value"` as a markup string attribute
fn push_attribute(out: &mut String, name: &str, value: &str, quote: char) {
    out.push(' ');
    out.push_str(name);
    out.push('=');
    out.push(quote);
    out.push_str(&escape_attribute(value, quote));
    out.push(quote);
}

/// Markup attribute strings have no escapes, only entities
pub fn escape_attribute(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn diagnostic_for(code: &str, filename: &str, error: &AnnotateError) -> Diagnostic {
    match error {
        AnnotateError::Parse(failure) => {
            let range = failure.error.span();
            Diagnostic::error(filename, failure.message())
                .with_span(LineIndex::new(code).span(range.start, range.end))
        }
        other => Diagnostic::error(filename, other.to_string()),
    }
}
