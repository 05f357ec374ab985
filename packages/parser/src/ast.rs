use serde::{Deserialize, Serialize};

/// A point in the source buffer.
///
/// `line` is 1-based, `column` is the 0-based count of Unicode scalar values
/// since the start of the line and `offset` is the UTF-8 byte offset into the
/// buffer that was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Does this position sit at the given (line, column) coordinate?
    pub fn is_at(&self, line: usize, column: usize) -> bool {
        self.line == line && self.column == column
    }
}

/// Span information for source location tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Byte range covered by this span
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Root node of a parsed source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub filename: String,
    pub body: Vec<Node>,
    pub span: Span,
}

/// Nodes the parser keeps from the host script: named scopes and markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Scope(Scope),
    Element(Element),
    Fragment(Fragment),
}

/// Kind of a scope in the host script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    /// `function name() {}` or `function () {}`
    Function,
    /// `(args) => body`
    Arrow,
    /// `name() {}` inside a class or object literal
    Method,
    /// `class Name {}`
    Class,
}

/// A function-like or class scope that encloses markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: Option<String>,
    pub body: Vec<Node>,
    pub span: Span,
}

impl Scope {
    pub fn is_function(&self) -> bool {
        !matches!(self.kind, ScopeKind::Class)
    }
}

/// Markup element (`<div>...</div>` or `<Foo />`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub opening: OpeningElement,
    pub children: Vec<Child>,
    pub closing: Option<ClosingElement>,
    pub span: Span,
}

impl Element {
    pub fn tag_name(&self) -> &str {
        &self.opening.name.value
    }

    pub fn attribute(&self, name: &str) -> Option<&NamedAttribute> {
        self.opening.attribute(name)
    }

    /// Text children in source order
    pub fn text_children(&self) -> impl Iterator<Item = &Text> {
        self.children.iter().filter_map(|child| match child {
            Child::Text(text) => Some(text),
            _ => None,
        })
    }
}

/// The tag's start: name plus attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningElement {
    pub name: Name,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
    pub span: Span,
}

impl OpeningElement {
    /// Last attribute with the given name (the one that wins at runtime)
    pub fn attribute(&self, name: &str) -> Option<&NamedAttribute> {
        self.attributes
            .iter()
            .rev()
            .find_map(|attr| match attr {
                Attribute::Named(named) if named.name.value == name => Some(named),
                _ => None,
            })
    }

    /// Literal string value of an attribute, if it is written as one
    pub fn literal_attribute(&self, name: &str) -> Option<&StringLiteral> {
        match self.attribute(name)?.value.as_ref()? {
            AttributeValue::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingElement {
    pub name: Option<Name>,
    pub span: Span,
}

/// Tag or attribute name, e.g. `div`, `Foo.Bar`, `svg:rect`, `aria-label`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Attribute {
    Named(NamedAttribute),
    /// `{...props}`
    Spread(SpreadAttribute),
}

impl Attribute {
    pub fn span(&self) -> Span {
        match self {
            Attribute::Named(named) => named.span,
            Attribute::Spread(spread) => spread.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAttribute {
    pub name: Name,
    /// `None` for boolean attributes such as `<input disabled />`
    pub value: Option<AttributeValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadAttribute {
    pub nodes: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeValue {
    Literal(StringLiteral),
    Expression(ExpressionContainer),
    Element(Box<Element>),
    Fragment(Box<Fragment>),
}

/// Child of an element or fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Child {
    Text(Text),
    Expression(ExpressionContainer),
    Element(Element),
    Fragment(Fragment),
}

impl Child {
    pub fn span(&self) -> Span {
        match self {
            Child::Text(text) => text.span,
            Child::Expression(expr) => expr.span,
            Child::Element(element) => element.span,
            Child::Fragment(fragment) => fragment.span,
        }
    }
}

/// `<>...</>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub children: Vec<Child>,
    pub span: Span,
}

/// Literal markup text, stored exactly as written (entities undecoded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    pub span: Span,
}

impl Text {
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// `{ expression }` in a child or attribute position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionContainer {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    /// `{}` or `{/* comment */}`
    Empty,
    /// The container holds nothing but one string literal
    StringLiteral(StringLiteral),
    /// The container holds nothing but one template literal
    TemplateLiteral(TemplateLiteral),
    /// Any other script; markup nested inside it is kept
    Script { nodes: Vec<Node> },
}

impl Expression {
    pub fn nodes(&self) -> &[Node] {
        match self {
            Expression::Script { nodes } => nodes,
            _ => &[],
        }
    }
}

/// A quoted string, either a markup attribute value or a script literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    /// Text between the quotes, escapes and entities left as written
    pub value: String,
    pub quote: char,
    /// Span including the quotes
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLiteral {
    /// Text between the backticks when there are no substitutions
    pub cooked: Option<String>,
    pub has_substitutions: bool,
    pub span: Span,
}
