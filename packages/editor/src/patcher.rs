//! Minimal source rewrites at a located node
//!
//! Each edit replaces one literal's byte span, or inserts one attribute
//! right after a tag name. Nothing else in the file changes.

use crate::errors::{PatchError, PatchResult};
use crate::literal::{attribute_literal, escape_text, is_valid_attribute_name, script_string, template_string};
use crate::locator::Locator;
use crate::types::{EditKind, EditRequest, EditResult};
use pinpoint_annotator::{first_literal_text, is_static_text, DEFAULT_ATTRIBUTE_PREFIX};
use pinpoint_common::{FileSystem, NodeRef, RealFileSystem};
use pinpoint_parser::ast::{AttributeValue, Element, Expression, NamedAttribute, Text};
use pinpoint_parser::parse;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Replace `range` of the source with `text`; an empty range inserts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(offset..offset, text)
    }

    pub fn apply(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + self.text.len());
        out.push_str(&source[..self.range.start]);
        out.push_str(&self.text);
        out.push_str(&source[self.range.end..]);
        out
    }
}

/// What an applied edit did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Written,
    /// The file already had the requested value
    Unchanged,
}

/// Applies edit requests to files under a root directory
pub struct Patcher<F: FileSystem = RealFileSystem> {
    root_dir: PathBuf,
    fs: F,
    attribute_prefix: String,
}

impl Patcher<RealFileSystem> {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_file_system(root_dir, RealFileSystem)
    }
}

impl<F: FileSystem> Patcher<F> {
    pub fn with_file_system(root_dir: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            root_dir: root_dir.into(),
            fs,
            attribute_prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
        }
    }

    /// Prefix of annotations that may already be in the files
    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_prefix = prefix.into();
        self
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Absolute paths are used as given, relative ones join the root
    pub fn resolve(&self, file_path: &str) -> PathBuf {
        let path = Path::new(file_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }

    /// Apply one edit. Never fails: problems become an unsuccessful result
    /// and leave the file untouched.
    pub fn apply_edit(&self, request: &EditRequest) -> EditResult {
        let target = format!("{}:{}:{}", request.file_path, request.line, request.column);
        match self.try_apply(request) {
            Ok(PatchOutcome::Written) => {
                tracing::info!("Applied {} edit at {}", request.kind, target);
                EditResult::succeeded(request, format!("Applied {} edit at {}", request.kind, target))
            }
            Ok(PatchOutcome::Unchanged) => {
                tracing::debug!("{} edit at {} changed nothing", request.kind, target);
                EditResult::succeeded(request, format!("{} is already up to date", target))
            }
            Err(error) => {
                tracing::warn!("{} edit at {} failed: {}", request.kind, target, error);
                EditResult::failed(request, error.to_string())
            }
        }
    }

    pub fn try_apply(&self, request: &EditRequest) -> PatchResult<PatchOutcome> {
        let path = self.resolve(&request.file_path);
        let source = self
            .fs
            .read_to_string(&path)
            .map_err(|source| PatchError::Read {
                path: path.clone(),
                source,
            })?;

        let patched = self.patch_source(&source, &request.file_path, request)?;
        if patched == source {
            return Ok(PatchOutcome::Unchanged);
        }

        self.fs
            .write(&path, &patched)
            .map_err(|source| PatchError::Write { path, source })?;
        Ok(PatchOutcome::Written)
    }

    /// The edited text for `request`, without touching the file system.
    /// The result is guaranteed to parse.
    pub fn patch_source(&self, source: &str, filename: &str, request: &EditRequest) -> PatchResult<String> {
        let locator = Locator::new(source, filename)?.with_prefix(self.attribute_prefix.as_str());
        let node = locator.find(request.line, request.column)?;

        let edit = match request.kind {
            EditKind::Style => style_edit(node, request)?,
            EditKind::Content => content_edit(node, request)?,
            EditKind::Attribute => attribute_edit(node, request)?,
        };

        let patched = edit.apply(source);
        parse(&patched, filename).map_err(|source| PatchError::Unparseable {
            filename: filename.to_string(),
            source,
        })?;
        Ok(patched)
    }
}

/// Apply one edit against the real file system
pub fn apply_edit(root_dir: impl AsRef<Path>, request: &EditRequest) -> EditResult {
    Patcher::new(root_dir.as_ref()).apply_edit(request)
}

fn expect_element<'a>(node: NodeRef<'a>, request: &EditRequest) -> PatchResult<&'a Element> {
    node.as_element().ok_or_else(|| PatchError::WrongNode {
        line: request.line,
        column: request.column,
        expected: "an element",
        found: describe(node),
    })
}

fn describe(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::Element(element) => format!("<{}>", element.tag_name()),
        NodeRef::Fragment(_) => "a fragment".to_string(),
        NodeRef::Text(_) => "text".to_string(),
        NodeRef::Scope(_) => "a scope".to_string(),
        NodeRef::Expression(_) => "an expression".to_string(),
    }
}

/// Edit replacing an attribute's value in place, if it is written in a form
/// that can be rewritten
fn replace_value(attribute: &NamedAttribute, value: &str) -> Option<TextEdit> {
    match &attribute.value {
        None => Some(TextEdit::insert(
            attribute.span.end.offset,
            format!("={}", attribute_literal(value, '"')),
        )),
        Some(AttributeValue::Literal(literal)) => Some(TextEdit::replace(
            literal.span.range(),
            attribute_literal(value, literal.quote),
        )),
        Some(AttributeValue::Expression(container)) => match &container.expression {
            Expression::StringLiteral(literal) => Some(TextEdit::replace(
                literal.span.range(),
                script_string(value, literal.quote),
            )),
            Expression::TemplateLiteral(template) => {
                Some(TextEdit::replace(template.span.range(), template_string(value)))
            }
            _ => None,
        },
        Some(AttributeValue::Element(_)) | Some(AttributeValue::Fragment(_)) => None,
    }
}

/// Current value of an attribute when it is a literal
fn literal_value(attribute: &NamedAttribute) -> Option<&str> {
    match &attribute.value {
        Some(AttributeValue::Literal(literal)) => Some(&literal.value),
        Some(AttributeValue::Expression(container)) => match &container.expression {
            Expression::StringLiteral(literal) => Some(&literal.value),
            Expression::TemplateLiteral(template) => template.cooked.as_deref(),
            _ => None,
        },
        _ => None,
    }
}

fn insert_attribute(element: &Element, name: &str, value: &str) -> TextEdit {
    TextEdit::insert(
        element.opening.name.span.end.offset,
        format!(" {}={}", name, attribute_literal(value, '"')),
    )
}

fn check_original(request: &EditRequest, current: Option<&str>) {
    if let Some(expected) = &request.original_value {
        if current != Some(expected.as_str()) {
            tracing::debug!(
                "{}:{}:{} expected {:?} but found {:?}; applying anyway",
                request.file_path,
                request.line,
                request.column,
                expected,
                current
            );
        }
    }
}

fn style_edit(node: NodeRef<'_>, request: &EditRequest) -> PatchResult<TextEdit> {
    let element = expect_element(node, request)?;
    let attribute = element
        .attribute("className")
        .or_else(|| element.attribute("class"));

    if let Some(attribute) = attribute {
        check_original(request, literal_value(attribute));
        if let Some(edit) = replace_value(attribute, &request.new_value) {
            return Ok(edit);
        }
        tracing::warn!(
            "{} on <{}> is dynamic; inserting a second, literal className",
            attribute.name.value,
            element.tag_name()
        );
    }

    Ok(insert_attribute(element, "className", &request.new_value))
}

fn content_edit(node: NodeRef<'_>, request: &EditRequest) -> PatchResult<TextEdit> {
    let text: &Text = match node {
        NodeRef::Text(text) => text,
        // A blank text child only counts when nothing else is rendered
        NodeRef::Element(element) => first_literal_text(element)
            .or_else(|| {
                is_static_text(element)
                    .then(|| element.text_children().next())
                    .flatten()
            })
            .ok_or_else(|| PatchError::NoTextChild {
                tag: element.tag_name().to_string(),
            })?,
        other => {
            return Err(PatchError::WrongNode {
                line: request.line,
                column: request.column,
                expected: "an element or text",
                found: describe(other),
            })
        }
    };

    // Surrounding whitespace carries the layout; only the core is replaced
    let leading = text.value.len() - text.value.trim_start().len();
    let trailing = text.value.len() - text.value.trim_end().len();
    let (start, end) = if leading == text.value.len() {
        (text.span.end.offset, text.span.end.offset)
    } else {
        (text.span.start.offset + leading, text.span.end.offset - trailing)
    };

    check_original(request, Some(text.value.trim()));
    Ok(TextEdit::replace(start..end, escape_text(&request.new_value)))
}

fn attribute_edit(node: NodeRef<'_>, request: &EditRequest) -> PatchResult<TextEdit> {
    let element = expect_element(node, request)?;
    let name = request
        .attribute_name
        .as_deref()
        .ok_or(PatchError::MissingAttributeName)?;
    if !is_valid_attribute_name(name) {
        return Err(PatchError::InvalidAttributeName(name.to_string()));
    }

    match element.attribute(name) {
        Some(attribute) => {
            check_original(request, literal_value(attribute));
            replace_value(attribute, &request.new_value).ok_or_else(|| PatchError::DynamicAttribute {
                tag: element.tag_name().to_string(),
                attribute: name.to_string(),
            })
        }
        None => Ok(insert_attribute(element, name, &request.new_value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint_common::MockFileSystem;

    fn patcher_with(path: &str, source: &str) -> Patcher<MockFileSystem> {
        let mut fs = MockFileSystem::new();
        fs.add_file(PathBuf::from("/project").join(path), source);
        Patcher::with_file_system("/project", fs)
    }

    fn contents(patcher: &Patcher<MockFileSystem>, path: &str) -> String {
        patcher
            .file_system()
            .contents(&PathBuf::from("/project").join(path))
            .unwrap()
    }

    #[test]
    fn test_style_replaces_literal() {
        let source = "const A = () => <div className=\"a b\">X</div>;\n";
        let patcher = patcher_with("A.jsx", source);

        let result = patcher.apply_edit(&EditRequest::style("A.jsx", 1, 16, "c d"));

        assert!(result.success, "{}", result.message);
        assert_eq!(contents(&patcher, "A.jsx"), "const A = () => <div className=\"c d\">X</div>;\n");
    }

    #[test]
    fn test_style_keeps_single_quotes_and_expression_forms() {
        let patcher = patcher_with(
            "B.jsx",
            "x = <a className='one'>1</a>;\ny = <b className={\"two\"}>2</b>;\nz = <i className={`three`}>3</i>;\n",
        );

        assert!(patcher.apply_edit(&EditRequest::style("B.jsx", 1, 4, "uno")).success);
        assert!(patcher.apply_edit(&EditRequest::style("B.jsx", 2, 4, "dos")).success);
        assert!(patcher.apply_edit(&EditRequest::style("B.jsx", 3, 4, "tres")).success);

        assert_eq!(
            contents(&patcher, "B.jsx"),
            "x = <a className='uno'>1</a>;\ny = <b className={\"dos\"}>2</b>;\nz = <i className={`tres`}>3</i>;\n"
        );
    }

    #[test]
    fn test_style_inserts_when_absent_or_dynamic() {
        let patcher = patcher_with("C.jsx", "x = <button>Go</button>;\ny = <p className={cls}>t</p>;\n");

        assert!(patcher.apply_edit(&EditRequest::style("C.jsx", 1, 4, "x")).success);
        assert!(patcher.apply_edit(&EditRequest::style("C.jsx", 2, 4, "y")).success);

        assert_eq!(
            contents(&patcher, "C.jsx"),
            "x = <button className=\"x\">Go</button>;\ny = <p className=\"y\" className={cls}>t</p>;\n"
        );
    }

    #[test]
    fn test_content_preserves_whitespace() {
        let source = "x = (\n  <p>\n    Old text\n  </p>\n);\n";
        let patcher = patcher_with("D.jsx", source);

        let result = patcher.apply_edit(&EditRequest::content("D.jsx", 2, 2, "New <text>"));

        assert!(result.success, "{}", result.message);
        assert_eq!(
            contents(&patcher, "D.jsx"),
            "x = (\n  <p>\n    New &lt;text&gt;\n  </p>\n);\n"
        );
    }

    #[test]
    fn test_content_targets_first_literal_among_expressions() {
        let patcher = patcher_with("E.jsx", "x = <p>{a} Total: {b}</p>;");

        assert!(patcher.apply_edit(&EditRequest::content("E.jsx", 1, 4, "Sum:")).success);
        assert_eq!(contents(&patcher, "E.jsx"), "x = <p>{a} Sum: {b}</p>;");
    }

    #[test]
    fn test_content_fails_without_text() {
        let source = "x = <p>{a}{b}</p>;";
        let patcher = patcher_with("F.jsx", source);

        let result = patcher.apply_edit(&EditRequest::content("F.jsx", 1, 4, "New"));

        assert!(!result.success);
        assert!(result.message.contains("no literal text"));
        assert_eq!(contents(&patcher, "F.jsx"), source);
        assert_eq!(patcher.file_system().write_count(), 0);
    }

    #[test]
    fn test_content_fails_when_only_interpolations_render() {
        let source = "x = (\n  <p>\n    {user.name}\n  </p>\n);\n";
        let patcher = patcher_with("K.jsx", source);

        let result = patcher.apply_edit(&EditRequest::content("K.jsx", 2, 2, "Hello"));

        assert!(!result.success);
        assert!(result.message.contains("no literal text"));
        assert_eq!(contents(&patcher, "K.jsx"), source);
        assert_eq!(patcher.file_system().write_count(), 0);
    }

    #[test]
    fn test_content_fills_whitespace_only_element() {
        let patcher = patcher_with("L.jsx", "x = <p>  </p>;");

        assert!(patcher.apply_edit(&EditRequest::content("L.jsx", 1, 4, "Filled")).success);
        assert_eq!(contents(&patcher, "L.jsx"), "x = <p>  Filled</p>;");
    }

    #[test]
    fn test_content_edit_next_to_comment() {
        let source = "/* list */\nx = (\n  <div>\n    {/* note */}\n    <p>Old</p>\n  </div>\n);\n";
        let patcher = patcher_with("C.jsx", source);

        let result = patcher.apply_edit(&EditRequest::content("C.jsx", 5, 4, "New"));

        assert!(result.success, "{}", result.message);
        assert!(contents(&patcher, "C.jsx").contains("    {/* note */}\n    <p>New</p>\n"));
    }

    #[test]
    fn test_attribute_edits() {
        let patcher = patcher_with("G.jsx", "x = <input type=\"text\" disabled value={v} />;");

        assert!(patcher.apply_edit(&EditRequest::attribute("G.jsx", 1, 4, "type", "email")).success);
        assert!(patcher.apply_edit(&EditRequest::attribute("G.jsx", 1, 4, "disabled", "true")).success);
        assert!(patcher.apply_edit(&EditRequest::attribute("G.jsx", 1, 4, "data-testid", "field")).success);

        let dynamic = patcher.apply_edit(&EditRequest::attribute("G.jsx", 1, 4, "value", "x"));
        assert!(!dynamic.success);
        assert!(dynamic.message.contains("dynamic"));

        let mut unnamed = EditRequest::attribute("G.jsx", 1, 4, "id", "x");
        unnamed.attribute_name = None;
        assert!(!patcher.apply_edit(&unnamed).success);

        assert_eq!(
            contents(&patcher, "G.jsx"),
            "x = <input data-testid=\"field\" type=\"email\" disabled=\"true\" value={v} />;"
        );
    }

    #[test]
    fn test_not_found_leaves_file_alone() {
        let source = "x = <div>Hi</div>;";
        let patcher = patcher_with("H.jsx", source);

        let result = patcher.apply_edit(&EditRequest::style("H.jsx", 9, 9, "z"));

        assert!(!result.success);
        assert_eq!(contents(&patcher, "H.jsx"), source);
        assert_eq!(patcher.file_system().write_count(), 0);
    }

    #[test]
    fn test_unchanged_edit_skips_write() {
        let patcher = patcher_with("I.jsx", "x = <div className=\"same\">Hi</div>;");

        let result = patcher.apply_edit(&EditRequest::style("I.jsx", 1, 4, "same"));

        assert!(result.success);
        assert!(result.message.contains("already up to date"));
        assert_eq!(patcher.file_system().write_count(), 0);
    }

    #[test]
    fn test_missing_file_fails() {
        let patcher = Patcher::with_file_system("/project", MockFileSystem::new());
        let result = patcher.apply_edit(&EditRequest::content("nope.jsx", 1, 0, "x"));

        assert!(!result.success);
        assert!(result.message.starts_with("Cannot read /project/nope.jsx"));
    }

    #[test]
    fn test_resolve_paths() {
        let patcher = Patcher::new("/root/app");
        assert_eq!(patcher.resolve("src/A.jsx"), PathBuf::from("/root/app/src/A.jsx"));
        assert_eq!(patcher.resolve("/abs/B.jsx"), PathBuf::from("/abs/B.jsx"));
    }

    #[test]
    fn test_wrong_node_kind() {
        let patcher = patcher_with("J.jsx", "x = <p>Hi</p>;");
        let result = patcher.apply_edit(&EditRequest::style("J.jsx", 1, 7, "a"));

        assert!(!result.success);
        assert!(result.message.contains("is text, expected an element"));
    }
}
