use pinpoint_parser::ast::Element;

/// Deterministic fingerprint of an element:
/// `{file}:{line}:{col}_{tag}[-{class}][#{id}]`
///
/// Only literal `className`/`class` and `id` values contribute; a dynamic
/// value omits its segment. Whitespace in the class list becomes `-`.
pub fn element_id(file: &str, element: &Element) -> String {
    let start = element.span.start;
    let class = element
        .opening
        .literal_attribute("className")
        .or_else(|| element.opening.literal_attribute("class"))
        .map(|literal| literal.value.as_str());
    let id = element
        .opening
        .literal_attribute("id")
        .map(|literal| literal.value.as_str());

    format_element_id(file, start.line, start.column, element.tag_name(), class, id)
}

pub fn format_element_id(
    file: &str,
    line: usize,
    column: usize,
    tag: &str,
    class: Option<&str>,
    id: Option<&str>,
) -> String {
    let mut out = format!("{}:{}:{}_{}", file, line, column, tag);

    let classes: Vec<&str> = class
        .map(|value| value.split_whitespace().collect())
        .unwrap_or_default();
    if !classes.is_empty() {
        out.push('-');
        out.push_str(&classes.join("-"));
    }

    if let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) {
        out.push('#');
        out.push_str(id);
    }

    out
}
