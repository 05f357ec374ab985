use pinpoint_parser::ast::*;

/// A borrowed node of the located tree, as handed to an [`AncestorVisitor`]
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Scope(&'a Scope),
    Element(&'a Element),
    Fragment(&'a Fragment),
    Text(&'a Text),
    Expression(&'a ExpressionContainer),
}

impl<'a> NodeRef<'a> {
    pub fn span(&self) -> Span {
        match self {
            NodeRef::Scope(scope) => scope.span,
            NodeRef::Element(element) => element.span,
            NodeRef::Fragment(fragment) => fragment.span,
            NodeRef::Text(text) => text.span,
            NodeRef::Expression(container) => container.span,
        }
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match self {
            NodeRef::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_scope(&self) -> Option<&'a Scope> {
        match self {
            NodeRef::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    /// Markup nodes are elements, fragments and text
    pub fn is_markup(&self) -> bool {
        matches!(
            self,
            NodeRef::Element(_) | NodeRef::Fragment(_) | NodeRef::Text(_)
        )
    }
}

/// Visitor that sees every node together with the chain of its ancestors
///
/// `ancestors` runs from the module root down to the node's parent, so the
/// nearest ancestor is the last entry.
pub trait AncestorVisitor<'a> {
    fn on_node(&mut self, node: NodeRef<'a>, ancestors: &[NodeRef<'a>]);
}

/// Walk a module in pre-order, source order.
///
/// Markup nested in attribute values, spreads and expression containers is
/// visited before the element's children because it precedes them in the
/// source.
pub fn walk_module<'a, V: AncestorVisitor<'a>>(visitor: &mut V, module: &'a Module) {
    let mut ancestors = Vec::new();
    walk_nodes(visitor, &module.body, &mut ancestors);
}

fn walk_nodes<'a, V: AncestorVisitor<'a>>(
    visitor: &mut V,
    nodes: &'a [Node],
    ancestors: &mut Vec<NodeRef<'a>>,
) {
    for node in nodes {
        match node {
            Node::Scope(scope) => walk_scope(visitor, scope, ancestors),
            Node::Element(element) => walk_element(visitor, element, ancestors),
            Node::Fragment(fragment) => walk_fragment(visitor, fragment, ancestors),
        }
    }
}

pub fn walk_scope<'a, V: AncestorVisitor<'a>>(
    visitor: &mut V,
    scope: &'a Scope,
    ancestors: &mut Vec<NodeRef<'a>>,
) {
    let node = NodeRef::Scope(scope);
    visitor.on_node(node, ancestors);
    ancestors.push(node);
    walk_nodes(visitor, &scope.body, ancestors);
    ancestors.pop();
}

pub fn walk_element<'a, V: AncestorVisitor<'a>>(
    visitor: &mut V,
    element: &'a Element,
    ancestors: &mut Vec<NodeRef<'a>>,
) {
    let node = NodeRef::Element(element);
    visitor.on_node(node, ancestors);
    ancestors.push(node);

    for attr in &element.opening.attributes {
        match attr {
            Attribute::Named(named) => match &named.value {
                Some(AttributeValue::Expression(container)) => {
                    walk_expression(visitor, container, ancestors)
                }
                Some(AttributeValue::Element(inner)) => walk_element(visitor, inner, ancestors),
                Some(AttributeValue::Fragment(inner)) => walk_fragment(visitor, inner, ancestors),
                Some(AttributeValue::Literal(_)) | None => {}
            },
            Attribute::Spread(spread) => walk_nodes(visitor, &spread.nodes, ancestors),
        }
    }
    walk_children(visitor, &element.children, ancestors);

    ancestors.pop();
}

pub fn walk_fragment<'a, V: AncestorVisitor<'a>>(
    visitor: &mut V,
    fragment: &'a Fragment,
    ancestors: &mut Vec<NodeRef<'a>>,
) {
    let node = NodeRef::Fragment(fragment);
    visitor.on_node(node, ancestors);
    ancestors.push(node);
    walk_children(visitor, &fragment.children, ancestors);
    ancestors.pop();
}

fn walk_children<'a, V: AncestorVisitor<'a>>(
    visitor: &mut V,
    children: &'a [Child],
    ancestors: &mut Vec<NodeRef<'a>>,
) {
    for child in children {
        match child {
            Child::Text(text) => visitor.on_node(NodeRef::Text(text), ancestors),
            Child::Expression(container) => walk_expression(visitor, container, ancestors),
            Child::Element(element) => walk_element(visitor, element, ancestors),
            Child::Fragment(fragment) => walk_fragment(visitor, fragment, ancestors),
        }
    }
}

pub fn walk_expression<'a, V: AncestorVisitor<'a>>(
    visitor: &mut V,
    container: &'a ExpressionContainer,
    ancestors: &mut Vec<NodeRef<'a>>,
) {
    let node = NodeRef::Expression(container);
    visitor.on_node(node, ancestors);
    ancestors.push(node);
    walk_nodes(visitor, container.expression.nodes(), ancestors);
    ancestors.pop();
}
