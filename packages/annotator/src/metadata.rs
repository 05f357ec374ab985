use crate::classifier::is_static_text;
use crate::identity::element_id;
use pinpoint_common::NodeRef;
use pinpoint_parser::ast::Element;
use serde::{Deserialize, Serialize};

/// Where an element starts: 1-based line, 0-based column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

/// Everything the annotator derives for one element. Recomputed on every
/// pass, never stored apart from the annotated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMetadata {
    pub location: SourceLocation,
    pub tag_name: String,
    pub component_name: Option<String>,
    pub function_name: Option<String>,
    pub element_id: String,
    pub is_static_text: bool,
}

impl ElementMetadata {
    pub fn compute(file: &str, element: &Element, ancestors: &[NodeRef<'_>]) -> Self {
        let start = element.span.start;
        Self {
            location: SourceLocation {
                file: file.to_string(),
                line: start.line,
                column: start.column,
            },
            tag_name: element.tag_name().to_string(),
            component_name: component_name(ancestors),
            function_name: function_name(ancestors),
            element_id: element_id(file, element),
            is_static_text: is_static_text(element),
        }
    }

    /// `line:column`
    pub fn position(&self) -> String {
        format!("{}:{}", self.location.line, self.location.column)
    }
}

/// Nearest enclosing scope whose name starts with an uppercase letter
pub fn component_name(ancestors: &[NodeRef<'_>]) -> Option<String> {
    ancestors
        .iter()
        .rev()
        .filter_map(|node| node.as_scope())
        .filter_map(|scope| scope.name.as_deref())
        .find(|name| name.chars().next().is_some_and(char::is_uppercase))
        .map(str::to_string)
}

/// Nearest enclosing named function, arrow or method
pub fn function_name(ancestors: &[NodeRef<'_>]) -> Option<String> {
    ancestors
        .iter()
        .rev()
        .filter_map(|node| node.as_scope())
        .filter(|scope| scope.is_function())
        .find_map(|scope| scope.name.clone())
}
