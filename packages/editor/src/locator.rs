//! Exact coordinate lookup
//!
//! A coordinate resolves to the first markup node, in pre-order, whose
//! start is exactly that (line, column). There is no nearest match.

use crate::errors::LocateError;
use pinpoint_annotator::{strip_annotations, DEFAULT_ATTRIBUTE_PREFIX};
use pinpoint_common::{walk_module, AncestorVisitor, NodeRef};
use pinpoint_parser::ast::{Element, Fragment, Module, Position, Text};
use pinpoint_parser::{parse, LineIndex};
use serde::Serialize;

/// Parsed source ready for repeated lookups
pub struct Locator<'src> {
    source: &'src str,
    filename: String,
    module: Module,
    prefix: String,
}

impl<'src> Locator<'src> {
    pub fn new(source: &'src str, filename: &str) -> Result<Self, LocateError> {
        let module = parse(source, filename)?;
        Ok(Self {
            source,
            filename: filename.to_string(),
            module,
            prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
        })
    }

    /// Prefix of annotations that may be present in the source
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Element, fragment or text node starting at `line:column`.
    ///
    /// If the source carries annotations, coordinates recorded before they
    /// were injected are also accepted: they are resolved against the text
    /// with the annotations removed and mapped back.
    pub fn find(&self, line: usize, column: usize) -> Result<NodeRef<'_>, LocateError> {
        if let Some(node) = first_markup(&self.module, |start| start.is_at(line, column)) {
            return Ok(node);
        }

        if let Some(offset) = self.annotated_offset(line, column) {
            if let Some(node) = first_markup(&self.module, |start| start.offset == offset) {
                tracing::debug!(
                    "{}:{}:{} resolved through annotations to byte {}",
                    self.filename,
                    line,
                    column,
                    offset
                );
                return Ok(node);
            }
        }

        Err(LocateError::NotFound {
            filename: self.filename.clone(),
            line,
            column,
        })
    }

    fn annotated_offset(&self, line: usize, column: usize) -> Option<usize> {
        if !self.source.contains(self.prefix.as_str()) {
            return None;
        }
        let stripped = strip_annotations(self.source, &self.filename, &self.prefix).ok()?;
        if stripped.is_unchanged() {
            return None;
        }
        let clean = LineIndex::new(&stripped.code).offset(line, column)?;
        Some(stripped.original_offset(clean))
    }
}

fn first_markup<'a>(module: &'a Module, predicate: impl Fn(Position) -> bool) -> Option<NodeRef<'a>> {
    struct FirstMatch<'a, P> {
        predicate: P,
        found: Option<NodeRef<'a>>,
    }

    impl<'a, P: Fn(Position) -> bool> AncestorVisitor<'a> for FirstMatch<'a, P> {
        fn on_node(&mut self, node: NodeRef<'a>, _ancestors: &[NodeRef<'a>]) {
            if self.found.is_none() && node.is_markup() && (self.predicate)(node.span().start) {
                self.found = Some(node);
            }
        }
    }

    let mut visitor = FirstMatch {
        predicate,
        found: None,
    };
    walk_module(&mut visitor, module);
    visitor.found
}

/// Owned copy of a located node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum LocatedNode {
    Element(Element),
    Fragment(Fragment),
    Text(Text),
}

impl LocatedNode {
    pub fn from_ref(node: NodeRef<'_>) -> Option<Self> {
        match node {
            NodeRef::Element(element) => Some(LocatedNode::Element(element.clone())),
            NodeRef::Fragment(fragment) => Some(LocatedNode::Fragment(fragment.clone())),
            NodeRef::Text(text) => Some(LocatedNode::Text(text.clone())),
            NodeRef::Scope(_) | NodeRef::Expression(_) => None,
        }
    }

    pub fn start(&self) -> Position {
        match self {
            LocatedNode::Element(element) => element.span.start,
            LocatedNode::Fragment(fragment) => fragment.span.start,
            LocatedNode::Text(text) => text.span.start,
        }
    }
}

/// Parse `code` and return the markup node starting exactly at `line:column`
pub fn locate(code: &str, filename: &str, line: usize, column: usize) -> Result<LocatedNode, LocateError> {
    let locator = Locator::new(code, filename)?;
    let node = locator.find(line, column)?;
    LocatedNode::from_ref(node).ok_or_else(|| LocateError::NotFound {
        filename: filename.to_string(),
        line,
        column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint_annotator::{annotate, AnnotateOptions};

    const SOURCE: &str = "export const Card = () => (\n  <div className=\"card\">\n    <h2>Title</h2>\n    <p>Body</p>\n  </div>\n);\n";

    #[test]
    fn test_exact_match_only() {
        let locator = Locator::new(SOURCE, "Card.jsx").unwrap();

        let node = locator.find(3, 4).unwrap();
        assert_eq!(node.as_element().map(|e| e.tag_name()), Some("h2"));

        // One column off is not a match
        assert!(matches!(
            locator.find(3, 5),
            Err(LocateError::NotFound { line: 3, column: 5, .. })
        ));
    }

    #[test]
    fn test_text_nodes_are_locatable() {
        let node = locate(SOURCE, "Card.jsx", 3, 8).unwrap();
        match node {
            LocatedNode::Text(text) => assert_eq!(text.value, "Title"),
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let err = locate("const a = <div>", "Bad.jsx", 1, 10).unwrap_err();
        assert!(matches!(err, LocateError::Parse(_)));
    }

    #[test]
    fn test_annotated_source_accepts_clean_coordinates() {
        let inline = "const a = <ul><li>One</li><li>Two</li></ul>;";
        let annotated = annotate(inline, "List.jsx", &AnnotateOptions::default());

        let second_li = inline.rfind("<li").unwrap();
        let locator = Locator::new(&annotated, "List.jsx").unwrap();
        let node = locator.find(1, second_li).unwrap();

        let element = node.as_element().unwrap();
        assert_eq!(element.tag_name(), "li");
        assert_eq!(element.span.start.offset, annotated.rfind("<li").unwrap());
    }
}
