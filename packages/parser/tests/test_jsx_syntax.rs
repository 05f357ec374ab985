//! Tests for the markup syntax the parser recognises inside host script
//!
//! Validates:
//! - Attribute forms: literals, expressions, booleans, spreads, nested markup
//! - Children: text, expression containers, nested elements, fragments
//! - Scope naming for functions, arrows, classes and methods
//! - Host script that looks like markup but is not

use pinpoint_parser::ast::*;
use pinpoint_parser::{parse, parse_with_options, ParseError, ParseOptions};

fn parse_ok(source: &str) -> Module {
    match parse(source, "Test.tsx") {
        Ok(module) => module,
        Err(e) => panic!("Parse error: {}", e),
    }
}

/// All elements in pre-order, including those nested in attributes
fn elements(module: &Module) -> Vec<&Element> {
    fn from_nodes<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
        for node in nodes {
            match node {
                Node::Scope(scope) => from_nodes(&scope.body, out),
                Node::Element(element) => from_element(element, out),
                Node::Fragment(fragment) => from_children(&fragment.children, out),
            }
        }
    }
    fn from_children<'a>(children: &'a [Child], out: &mut Vec<&'a Element>) {
        for child in children {
            match child {
                Child::Element(element) => from_element(element, out),
                Child::Fragment(fragment) => from_children(&fragment.children, out),
                Child::Expression(container) => from_nodes(container.expression.nodes(), out),
                Child::Text(_) => {}
            }
        }
    }
    fn from_element<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
        out.push(element);
        for attr in &element.opening.attributes {
            match attr {
                Attribute::Named(NamedAttribute { value: Some(value), .. }) => match value {
                    AttributeValue::Expression(container) => from_nodes(container.expression.nodes(), out),
                    AttributeValue::Element(inner) => from_element(inner, out),
                    AttributeValue::Fragment(inner) => from_children(&inner.children, out),
                    AttributeValue::Literal(_) => {}
                },
                Attribute::Spread(spread) => from_nodes(&spread.nodes, out),
                _ => {}
            }
        }
        from_children(&element.children, out);
    }

    let mut out = Vec::new();
    from_nodes(&module.body, &mut out);
    out
}

fn tags(module: &Module) -> Vec<&str> {
    elements(module).into_iter().map(|e| e.tag_name()).collect()
}

#[test]
fn test_attribute_forms() {
    let source = r#"const a = <input type='text' value={name} disabled {...rest} icon=<Icon /> title={"Hi"} />;"#;
    let module = parse_ok(source);
    let input = elements(&module)[0];

    assert_eq!(input.opening.attributes.len(), 6);
    assert!(input.opening.self_closing);

    let kind = input.opening.literal_attribute("type").unwrap();
    assert_eq!(kind.value, "text");
    assert_eq!(kind.quote, '\'');

    let disabled = input.attribute("disabled").unwrap();
    assert!(disabled.value.is_none());

    assert!(matches!(input.opening.attributes[3], Attribute::Spread(_)));
    assert!(matches!(
        input.attribute("icon").unwrap().value,
        Some(AttributeValue::Element(_))
    ));

    match &input.attribute("title").unwrap().value {
        Some(AttributeValue::Expression(container)) => match &container.expression {
            Expression::StringLiteral(literal) => assert_eq!(literal.value, "Hi"),
            other => panic!("Expected string literal, got {:?}", other),
        },
        other => panic!("Expected expression container, got {:?}", other),
    }

    assert_eq!(tags(&module), vec!["input", "Icon"]);
}

#[test]
fn test_template_literal_attribute() {
    let module = parse_ok("const a = <div className={`plain`} id={`row-${n}`} />;");
    let div = elements(&module)[0];

    match &div.attribute("className").unwrap().value {
        Some(AttributeValue::Expression(ExpressionContainer {
            expression: Expression::TemplateLiteral(template),
            ..
        })) => {
            assert_eq!(template.cooked.as_deref(), Some("plain"));
            assert!(!template.has_substitutions);
        }
        other => panic!("Expected template literal, got {:?}", other),
    }

    match &div.attribute("id").unwrap().value {
        Some(AttributeValue::Expression(container)) => {
            assert!(matches!(container.expression, Expression::Script { .. }));
        }
        other => panic!("Expected expression container, got {:?}", other),
    }
}

#[test]
fn test_children_kinds() {
    let source = "const a = (\n  <ul>\n    {/* note */}\n    <li>One</li>\n    {items.map(i => <li key={i}>{i}</li>)}\n    <>\n      <li>Two</li>\n    </>\n  </ul>\n);";
    let module = parse_ok(source);

    assert_eq!(tags(&module), vec!["ul", "li", "li", "li"]);

    let ul = elements(&module)[0];
    let comment = ul
        .children
        .iter()
        .find_map(|child| match child {
            Child::Expression(container) => Some(container),
            _ => None,
        })
        .unwrap();
    assert_eq!(comment.expression, Expression::Empty);
    assert!(ul.children.iter().any(|c| matches!(c, Child::Fragment(_))));
}

#[test]
fn test_member_and_namespaced_tags() {
    let module = parse_ok(r##"const a = <Foo.Bar><svg:rect xlink:href="#a" /></Foo.Bar>;"##);

    assert_eq!(tags(&module), vec!["Foo.Bar", "svg:rect"]);
    let rect = elements(&module)[1];
    assert!(rect.attribute("xlink:href").is_some());
}

#[test]
fn test_positions_use_char_columns() {
    let source = "const s = \"é\";\nconst a = <p>\n  <b>x</b></p>;";
    let module = parse_ok(source);
    let all = elements(&module);

    assert_eq!(all[0].span.start.line, 2);
    assert_eq!(all[0].span.start.column, 10);
    assert_eq!(all[1].span.start.line, 3);
    assert_eq!(all[1].span.start.column, 2);
    assert_eq!(&source[all[1].span.range()], "<b>x</b>");
}

#[test]
fn test_text_child_spans() {
    let source = "const a = <h1>  Hello  </h1>;";
    let module = parse_ok(source);
    let h1 = elements(&module)[0];
    let text = h1.text_children().next().unwrap();

    assert_eq!(text.value, "  Hello  ");
    assert_eq!(text.span.start.column, 14);
    assert!(!text.is_blank());
}

#[test]
fn test_scope_names() {
    let source = r#"
class Page extends React.Component<Props> {
  render() {
    return <main />;
  }
}

export default function () {
  return <aside />;
}

const Memo = memo(() => <span />);

function outer() {
  const inner = function named() { return <em />; };
}
"#;
    let module = parse_ok(source);

    let Node::Scope(class) = &module.body[0] else {
        panic!("Expected class scope");
    };
    assert_eq!(class.kind, ScopeKind::Class);
    assert_eq!(class.name.as_deref(), Some("Page"));
    let Node::Scope(render) = &class.body[0] else {
        panic!("Expected method scope");
    };
    assert_eq!(render.kind, ScopeKind::Method);
    assert_eq!(render.name.as_deref(), Some("render"));

    let Node::Scope(anonymous) = &module.body[1] else {
        panic!("Expected function scope");
    };
    assert_eq!(anonymous.name, None);

    let Node::Scope(memo) = &module.body[2] else {
        panic!("Expected arrow scope");
    };
    assert_eq!(memo.kind, ScopeKind::Arrow);
    assert_eq!(memo.name.as_deref(), Some("Memo"));

    let Node::Scope(outer) = &module.body[3] else {
        panic!("Expected function scope");
    };
    let Node::Scope(named) = &outer.body[0] else {
        panic!("Expected nested function scope");
    };
    assert_eq!(named.name.as_deref(), Some("named"));
}

#[test]
fn test_typescript_generics_are_not_markup() {
    let source = r#"
const id = <T,>(value: T): T => value;
function wrap<T extends object>(value: T): Array<T> { return [value]; }
const state = useState<string | null>(null);
const el = <div>{state}</div>;
"#;
    let module = parse_ok(source);

    assert_eq!(tags(&module), vec!["div"]);
}

#[test]
fn test_type_parameter_default_is_not_markup() {
    let source = "const pick = <T = unknown,>(value: T) => value;\nconst el = <p>ok</p>;";
    let module = parse_ok(source);

    assert_eq!(tags(&module), vec!["p"]);
}

#[test]
fn test_element_type_arguments() {
    let module = parse_ok("const el = <Select<Opt> value={v} onChange={set}>{items}</Select>;");

    let select = elements(&module)[0];
    assert_eq!(select.tag_name(), "Select");
    assert!(select.attribute("value").is_some());
    assert!(select.attribute("onChange").is_some());
    assert_eq!(select.opening.span.start.column, 11);
}

#[test]
fn test_block_comments_in_script_and_markup() {
    let source = r#"/** Card component */
/* plain */ export const Card = () => (
  <div /* tag note */ className="card">
    {/* child note */}
    Hi
  </div>
);
"#;
    let module = parse_ok(source);

    let card = elements(&module)[0];
    assert_eq!(card.opening.literal_attribute("className").map(|c| c.value.as_str()), Some("card"));
    assert!(card
        .children
        .iter()
        .any(|child| matches!(child, Child::Expression(ExpressionContainer { expression: Expression::Empty, .. }))));
}

#[test]
fn test_unterminated_block_comment_fails() {
    assert!(parse("const a = <b /> /* open", "a.jsx").is_err());
}

#[test]
fn test_markup_inside_template_substitution() {
    let module = parse_ok("const s = `a ${cond ? <b /> : 'x'} c`;");
    assert_eq!(tags(&module), vec!["b"]);
}

#[test]
fn test_shebang_and_bom() {
    let source = "\u{FEFF}#!/usr/bin/env node\nconst a = <div />;";
    let module = parse_ok(source);
    let div = elements(&module)[0];

    assert_eq!(div.span.start.line, 2);
    assert_eq!(div.span.start.column, 10);
}

#[test]
fn test_mismatched_closing_tag() {
    let err = parse("const a = <div></span>;", "Bad.jsx").unwrap_err();

    assert_eq!(err.filename, "Bad.jsx");
    match err.error {
        ParseError::UnexpectedToken { found, .. } => assert_eq!(found, "</span>"),
        other => panic!("Expected unexpected token, got {:?}", other),
    }
}

#[test]
fn test_unterminated_markup_reports_eof() {
    let err = parse("const a = <div>", "Open.jsx").unwrap_err();
    assert!(matches!(err.error, ParseError::UnexpectedEof { .. }));
}

#[test]
fn test_unbalanced_braces_fail() {
    assert!(parse("function f() { return 1;", "f.js").is_err());
    assert!(parse("const a = 1; }", "g.js").is_err());
}

#[test]
fn test_markup_disabled() {
    let options = ParseOptions { markup: false };
    let module = parse_with_options("const x = <Foo>bar;", "x.ts", options).unwrap();
    assert!(module.body.is_empty());
}

#[test]
fn test_ast_serializes_with_type_tags() {
    let module = parse_ok("const a = <br />;");
    let json = serde_json::to_value(&module).unwrap();

    assert_eq!(json["body"][0]["type"], "Element");
    assert_eq!(json["body"][0]["opening"]["name"]["value"], "br");
    assert_eq!(json["body"][0]["span"]["start"]["column"], 10);
}
