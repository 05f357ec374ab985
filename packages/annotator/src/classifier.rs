//! Predicates over an element's children

use pinpoint_parser::ast::{Child, Element, Text};

/// True iff the element has children and every child is literal text,
/// whitespace-only text included. Expression containers (even ones holding
/// a lone string literal) and nested elements disqualify it.
pub fn is_static_text(element: &Element) -> bool {
    !element.children.is_empty()
        && element
            .children
            .iter()
            .all(|child| matches!(child, Child::Text(_)))
}

/// First text child with non-whitespace content. Unlike [`is_static_text`]
/// this holds for elements that also interpolate.
pub fn first_literal_text(element: &Element) -> Option<&Text> {
    element.text_children().find(|text| !text.is_blank())
}
