use crate::ast::*;
use crate::error::{ParseError, ParseFailure, ParseResult};
use crate::line_index::LineIndex;
use crate::tokenizer::{
    is_reserved_word, is_statement_keyword, ScriptToken, TagToken,
};
use logos::Logos;

/// Options that change how a source file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Recognise markup in expression position. Off for plain `.ts` files,
    /// where `<T>value` is a type assertion.
    pub markup: bool,
}

impl ParseOptions {
    pub fn for_filename(filename: &str) -> Self {
        let plain_typescript = [".ts", ".mts", ".cts"]
            .iter()
            .any(|ext| filename.ends_with(ext));
        Self {
            markup: !plain_typescript,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { markup: true }
    }
}

/// A token together with where it was found
#[derive(Debug, Clone, Copy)]
struct Lexed<T> {
    token: T,
    start: usize,
    end: usize,
    newline_before: bool,
}

/// What ends the script region being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    Eof,
    Brace,
    Paren,
    Bracket,
    /// Expression body of an arrow function. Stops before `,` `;`, a closing
    /// bracket, or a statement keyword that starts a new line.
    ArrowBody,
}

impl Until {
    fn expected(&self) -> &'static str {
        match self {
            Until::Eof | Until::ArrowBody => "end of file",
            Until::Brace => "'}'",
            Until::Paren => "')'",
            Until::Bracket => "']'",
        }
    }
}

/// Result of skimming a run of script
#[derive(Debug, Default)]
struct ScriptRegion {
    nodes: Vec<Node>,
    tokens: usize,
    sole_literal: Option<Expression>,
}

/// Markup found in expression position
enum Markup {
    Element(Element),
    Fragment(Fragment),
}

impl From<Markup> for Node {
    fn from(markup: Markup) -> Self {
        match markup {
            Markup::Element(element) => Node::Element(element),
            Markup::Fragment(fragment) => Node::Fragment(fragment),
        }
    }
}

impl From<Markup> for Child {
    fn from(markup: Markup) -> Self {
        match markup {
            Markup::Element(element) => Child::Element(element),
            Markup::Fragment(fragment) => Child::Fragment(fragment),
        }
    }
}

/// An identifier followed by parentheses is either a call or a method
enum CallOrMethod {
    Method(Scope),
    Call(Vec<Node>),
    Neither,
}

/// Parser for script sources with embedded markup
///
/// Host script is skimmed with bracket balancing; only markup and the
/// named scopes around it end up in the tree.
pub struct Parser<'src> {
    source: &'src str,
    filename: String,
    lines: LineIndex<'src>,
    pos: usize,
    options: ParseOptions,
    after_operand: bool,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, filename: &str, options: ParseOptions) -> Self {
        Self {
            source,
            filename: filename.to_string(),
            lines: LineIndex::new(source),
            pos: 0,
            options,
            after_operand: false,
        }
    }

    /// Parse a complete module
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        self.skip_preamble();
        let region = self.scan_script(Until::Eof, None)?;

        Ok(Module {
            filename: self.filename.clone(),
            body: region.nodes,
            span: self.lines.span(0, self.source.len()),
        })
    }

    /// Byte order mark and `#!` line
    fn skip_preamble(&mut self) {
        if self.source.starts_with('\u{FEFF}') {
            self.pos = '\u{FEFF}'.len_utf8();
        }
        if self.source[self.pos..].starts_with("#!") {
            self.pos = self.source[self.pos..]
                .find('\n')
                .map(|i| self.pos + i)
                .unwrap_or(self.source.len());
        }
    }

    // Script

    fn scan_script(&mut self, until: Until, inherited: Option<String>) -> ParseResult<ScriptRegion> {
        let mut region = ScriptRegion::default();
        let mut inherited = inherited;
        // Assignment target seen before `=`, and after it
        let mut declared: Option<String> = None;
        let mut bound: Option<String> = None;
        let mut prev: Option<ScriptToken<'src>> = None;
        self.after_operand = false;

        loop {
            let Some(lexed) = self.peek_script()? else {
                return match until {
                    Until::Eof | Until::ArrowBody => Ok(region),
                    _ => Err(ParseError::unexpected_eof(self.source.len(), until.expected())),
                };
            };

            match (until, lexed.token) {
                (Until::Brace, ScriptToken::RBrace)
                | (Until::Paren, ScriptToken::RParen)
                | (Until::Bracket, ScriptToken::RBracket) => {
                    self.pos = lexed.end;
                    self.after_operand = true;
                    return Ok(region);
                }
                (
                    Until::ArrowBody,
                    ScriptToken::RBrace
                    | ScriptToken::RParen
                    | ScriptToken::RBracket
                    | ScriptToken::Comma
                    | ScriptToken::Semicolon,
                ) => return Ok(region),
                (Until::ArrowBody, ScriptToken::Ident(word))
                    if lexed.newline_before && self.after_operand && is_statement_keyword(word) =>
                {
                    return Ok(region)
                }
                (_, ScriptToken::RBrace | ScriptToken::RParen | ScriptToken::RBracket) => {
                    return Err(ParseError::unexpected_token(
                        lexed.start..lexed.end,
                        until.expected(),
                        lexed.token.to_string(),
                    ));
                }
                _ => {}
            }

            self.pos = lexed.end;
            region.tokens += 1;
            let after_operand = self.after_operand;
            self.after_operand = lexed.token.ends_operand();

            match lexed.token {
                // Object literals and blocks do not pass the binding on
                ScriptToken::LBrace => {
                    let inner = self.scan_script(Until::Brace, None)?;
                    region.nodes.extend(inner.nodes);
                }
                ScriptToken::LParen => {
                    let inner = self.scan_script(Until::Paren, bound.clone().or_else(|| inherited.clone()))?;
                    region.nodes.extend(inner.nodes);
                }
                ScriptToken::LBracket => {
                    let inner = self.scan_script(Until::Bracket, None)?;
                    region.nodes.extend(inner.nodes);
                }
                ScriptToken::String(raw) => {
                    if region.tokens == 1 {
                        region.sole_literal = Some(Expression::StringLiteral(
                            self.string_literal(raw, lexed.start, lexed.end),
                        ));
                    }
                }
                ScriptToken::Backtick => {
                    let (template, nodes) = self.scan_template(lexed.start)?;
                    region.nodes.extend(nodes);
                    if region.tokens == 1 && !template.has_substitutions {
                        region.sole_literal = Some(Expression::TemplateLiteral(template));
                    }
                    self.after_operand = true;
                }
                ScriptToken::Slash if !after_operand => {
                    self.scan_regex(lexed.start)?;
                    self.after_operand = true;
                }
                ScriptToken::Lt if !after_operand => {
                    if self.options.markup && self.starts_markup() {
                        let markup = self.parse_markup(lexed.start)?;
                        region.nodes.push(markup.into());
                        self.after_operand = true;
                    } else {
                        // `<T,>(x) =>` or a `.ts` cast; anything else is left to the token loop
                        let resume = self.pos;
                        if self.skip_type_parameters(lexed.start).is_err() {
                            self.pos = resume;
                        }
                    }
                }
                ScriptToken::Arrow => {
                    let name = bound.take().or_else(|| inherited.take());
                    let scope = self.parse_arrow_body(lexed.start, name)?;
                    region.nodes.push(Node::Scope(scope));
                    self.after_operand = true;
                }
                ScriptToken::Assign => {
                    if let Some(name) = declared.take() {
                        bound = Some(name);
                    }
                }
                ScriptToken::Semicolon | ScriptToken::Comma => {
                    declared = None;
                    bound = None;
                }
                ScriptToken::Ident(word) => {
                    let member = matches!(prev, Some(ScriptToken::Dot | ScriptToken::Operator("?.")));
                    if lexed.newline_before && after_operand {
                        declared = None;
                        bound = None;
                    }
                    if !member {
                        match word {
                            "const" | "let" | "var" => {
                                bound = None;
                                declared = match self.peek_script()? {
                                    Some(Lexed { token: ScriptToken::Ident(name), .. })
                                        if !is_reserved_word(name) =>
                                    {
                                        Some(name.to_string())
                                    }
                                    _ => None,
                                };
                            }
                            "function" => {
                                let name = bound.take().or_else(|| inherited.take());
                                let scope = self.parse_function(lexed.start, name)?;
                                region.nodes.push(Node::Scope(scope));
                                self.after_operand = true;
                            }
                            "class" => {
                                let name = bound.take().or_else(|| inherited.take());
                                let scope = self.parse_class(lexed.start, name)?;
                                region.nodes.push(Node::Scope(scope));
                                self.after_operand = true;
                            }
                            _ if !is_reserved_word(word) => {
                                if declared.is_none()
                                    && matches!(
                                    self.peek_script()?,
                                    Some(Lexed { token: ScriptToken::Assign, .. })
                                ) {
                                    declared = Some(word.to_string());
                                }
                                let passed = bound.clone().or_else(|| inherited.clone());
                                match self.parse_call_or_method(word, lexed.start, passed)? {
                                    CallOrMethod::Method(scope) => {
                                        region.nodes.push(Node::Scope(scope));
                                        self.after_operand = true;
                                    }
                                    CallOrMethod::Call(nodes) => {
                                        region.nodes.extend(nodes);
                                        self.after_operand = true;
                                    }
                                    CallOrMethod::Neither => {}
                                }
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }

            prev = Some(lexed.token);
        }
    }

    /// `function [*] [name] [<T>] (params) [: Type] { body }`
    fn parse_function(&mut self, start: usize, binding: Option<String>) -> ParseResult<Scope> {
        if let Some(lexed @ Lexed { token: ScriptToken::Operator("*"), .. }) = self.peek_script()? {
            self.pos = lexed.end;
        }

        let mut name = binding;
        if let Some(lexed @ Lexed { token: ScriptToken::Ident(word), .. }) = self.peek_script()? {
            if !is_reserved_word(word) {
                self.pos = lexed.end;
                name = Some(word.to_string());
            }
        }

        if let Some(lexed @ Lexed { token: ScriptToken::Lt, .. }) = self.peek_script()? {
            self.pos = lexed.end;
            self.skip_type_parameters(lexed.start)?;
        }

        self.expect_script(ScriptToken::LParen, "'(' to open parameters")?;
        let params = self.scan_script(Until::Paren, None)?;
        self.skip_return_type(false);

        let mut body = params.nodes;
        // Overload signatures and `declare function` have no body
        if let Some(lexed @ Lexed { token: ScriptToken::LBrace, .. }) = self.peek_script()? {
            self.pos = lexed.end;
            body.extend(self.scan_script(Until::Brace, None)?.nodes);
        }

        Ok(Scope {
            kind: ScopeKind::Function,
            name,
            body,
            span: self.lines.span(start, self.pos),
        })
    }

    /// `class [Name] [extends Base] { members }`
    fn parse_class(&mut self, start: usize, binding: Option<String>) -> ParseResult<Scope> {
        let mut name = binding;
        if let Some(lexed @ Lexed { token: ScriptToken::Ident(word), .. }) = self.peek_script()? {
            if !is_reserved_word(word) && word != "implements" {
                self.pos = lexed.end;
                name = Some(word.to_string());
            }
        }

        let mut body = Vec::new();
        loop {
            let lexed = self
                .peek_script()?
                .ok_or_else(|| ParseError::unexpected_eof(self.source.len(), "'{' to open class body"))?;
            self.pos = lexed.end;
            match lexed.token {
                ScriptToken::LBrace => break,
                ScriptToken::LParen => body.extend(self.scan_script(Until::Paren, None)?.nodes),
                ScriptToken::Lt => self.skip_type_parameters(lexed.start)?,
                ScriptToken::RBrace | ScriptToken::RParen | ScriptToken::RBracket | ScriptToken::Semicolon => {
                    return Err(ParseError::unexpected_token(
                        lexed.start..lexed.end,
                        "'{' to open class body",
                        lexed.token.to_string(),
                    ));
                }
                _ => {}
            }
        }
        body.extend(self.scan_script(Until::Brace, None)?.nodes);

        Ok(Scope {
            kind: ScopeKind::Class,
            name,
            body,
            span: self.lines.span(start, self.pos),
        })
    }

    /// Body of an arrow function; `arrow_start` is the `=>` token
    fn parse_arrow_body(&mut self, arrow_start: usize, name: Option<String>) -> ParseResult<Scope> {
        let body = match self.peek_script()? {
            Some(lexed @ Lexed { token: ScriptToken::LBrace, .. }) => {
                self.pos = lexed.end;
                self.scan_script(Until::Brace, None)?
            }
            _ => self.scan_script(Until::ArrowBody, None)?,
        };

        Ok(Scope {
            kind: ScopeKind::Arrow,
            name,
            body: body.nodes,
            span: self.lines.span(arrow_start, self.pos),
        })
    }

    /// After an identifier: `name(args)` is a call, `name(params) {` a method
    fn parse_call_or_method(
        &mut self,
        name: &str,
        start: usize,
        inherited: Option<String>,
    ) -> ParseResult<CallOrMethod> {
        let Some(lexed @ Lexed { token: ScriptToken::LParen, .. }) = self.peek_script()? else {
            return Ok(CallOrMethod::Neither);
        };
        self.pos = lexed.end;
        let params = self.scan_script(Until::Paren, inherited)?;

        let after_params = self.pos;
        self.skip_return_type(true);
        match self.peek_script()? {
            Some(lexed @ Lexed { token: ScriptToken::LBrace, .. }) => {
                self.pos = lexed.end;
                let mut body = params.nodes;
                body.extend(self.scan_script(Until::Brace, None)?.nodes);
                Ok(CallOrMethod::Method(Scope {
                    kind: ScopeKind::Method,
                    name: Some(name.to_string()),
                    body,
                    span: self.lines.span(start, self.pos),
                }))
            }
            _ => {
                self.pos = after_params;
                Ok(CallOrMethod::Call(params.nodes))
            }
        }
    }

    /// Skip `: Type` after a parameter list, stopping before the body `{`.
    ///
    /// In strict mode the annotation must sit on one line and start with a
    /// type-like token; otherwise the position is restored. Strict mode is
    /// used where `name(args) : x` may just as well be part of a ternary.
    fn skip_return_type(&mut self, strict: bool) -> bool {
        let saved = (self.pos, self.after_operand);
        let restore = |parser: &mut Self| {
            parser.pos = saved.0;
            parser.after_operand = saved.1;
            false
        };

        match self.peek_script() {
            Ok(Some(lexed @ Lexed { token: ScriptToken::Colon, .. })) => self.pos = lexed.end,
            _ => return false,
        }

        let mut prev = ScriptToken::Colon;
        let mut first = true;
        loop {
            let lexed = match self.peek_script() {
                Ok(Some(lexed)) => lexed,
                _ => return restore(self),
            };
            if strict && lexed.newline_before {
                return restore(self);
            }
            if strict
                && first
                && !matches!(
                    lexed.token,
                    ScriptToken::Ident(_) | ScriptToken::LBrace | ScriptToken::LParen | ScriptToken::LBracket
                )
            {
                return restore(self);
            }
            first = false;

            let opens_type = matches!(
                prev,
                ScriptToken::Colon
                    | ScriptToken::Arrow
                    | ScriptToken::Comma
                    | ScriptToken::Lt
                    | ScriptToken::Operator("|")
                    | ScriptToken::Operator("&")
            );
            match lexed.token {
                ScriptToken::LBrace if !opens_type => return true,
                ScriptToken::LBrace | ScriptToken::LParen | ScriptToken::LBracket => {
                    self.pos = lexed.end;
                    let until = match lexed.token {
                        ScriptToken::LBrace => Until::Brace,
                        ScriptToken::LParen => Until::Paren,
                        _ => Until::Bracket,
                    };
                    if self.scan_script(until, None).is_err() {
                        return restore(self);
                    }
                }
                ScriptToken::Semicolon
                | ScriptToken::RBrace
                | ScriptToken::RParen
                | ScriptToken::RBracket
                | ScriptToken::Assign => return restore(self),
                _ => self.pos = lexed.end,
            }
            prev = lexed.token;
        }
    }

    /// Skip `<...>` type parameters; `start` is the consumed `<`
    fn skip_type_parameters(&mut self, start: usize) -> ParseResult<()> {
        let mut depth = 1;
        while depth > 0 {
            let lexed = self
                .peek_script()?
                .ok_or_else(|| ParseError::unexpected_eof(self.source.len(), "'>' to close type parameters"))?;
            self.pos = lexed.end;
            match lexed.token {
                ScriptToken::Lt => depth += 1,
                ScriptToken::Gt => depth -= 1,
                ScriptToken::Semicolon => {
                    return Err(ParseError::invalid_syntax(
                        start..lexed.end,
                        "unterminated type parameter list",
                    ))
                }
                _ => {}
            }
        }
        self.after_operand = false;
        Ok(())
    }

    /// Template literal; `start` is the opening backtick. Markup inside
    /// substitutions is returned alongside the literal.
    fn scan_template(&mut self, start: usize) -> ParseResult<(TemplateLiteral, Vec<Node>)> {
        let bytes = self.source.as_bytes();
        let content_start = self.pos;
        let mut has_substitutions = false;
        let mut nodes = Vec::new();

        loop {
            match bytes.get(self.pos) {
                None => {
                    return Err(ParseError::unexpected_eof(
                        self.source.len(),
                        "'`' to close template literal",
                    ))
                }
                Some(b'\\') => self.pos += 2,
                Some(b'`') => {
                    self.pos += 1;
                    break;
                }
                Some(b'$') if bytes.get(self.pos + 1) == Some(&b'{') => {
                    self.pos += 2;
                    has_substitutions = true;
                    nodes.extend(self.scan_script(Until::Brace, None)?.nodes);
                }
                Some(_) => self.pos += 1,
            }
        }

        let cooked = (!has_substitutions).then(|| self.source[content_start..self.pos - 1].to_string());
        let template = TemplateLiteral {
            cooked,
            has_substitutions,
            span: self.lines.span(start, self.pos),
        };
        Ok((template, nodes))
    }

    /// Regular expression literal; `start` is the opening slash
    fn scan_regex(&mut self, start: usize) -> ParseResult<()> {
        let bytes = self.source.as_bytes();
        let mut in_class = false;

        loop {
            match bytes.get(self.pos) {
                None | Some(b'\n') => {
                    return Err(ParseError::invalid_syntax(
                        start..self.pos.min(self.source.len()),
                        "unterminated regular expression",
                    ))
                }
                Some(b'\\') => self.pos += 2,
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }

        while bytes.get(self.pos).is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        Ok(())
    }

    fn string_literal(&self, raw: &str, start: usize, end: usize) -> StringLiteral {
        StringLiteral {
            value: raw[1..raw.len() - 1].to_string(),
            quote: raw.chars().next().unwrap_or('"'),
            span: self.lines.span(start, end),
        }
    }

    // Markup

    /// Called with `<` consumed: is this the start of markup rather than a
    /// comparison or type parameters (`<T,>`, `<T extends U>`, `<T = D,>`)?
    /// An attribute never directly follows `=` without a name, so `<T =`
    /// is always a type parameter default.
    fn starts_markup(&self) -> bool {
        let mut lexer = TagToken::lexer(&self.source[self.pos..]);
        match lexer.next() {
            Some(Ok(TagToken::Gt)) => true,
            Some(Ok(TagToken::Name(_))) => !matches!(
                lexer.next(),
                Some(Ok(TagToken::Comma)) | Some(Ok(TagToken::Name("extends"))) | Some(Ok(TagToken::Assign))
            ),
            _ => false,
        }
    }

    /// Element or fragment; `start` is the consumed `<`
    fn parse_markup(&mut self, start: usize) -> ParseResult<Markup> {
        if let Some(lexed @ Lexed { token: TagToken::Gt, .. }) = self.peek_tag()? {
            self.pos = lexed.end;
            let (children, _) = self.parse_children(None)?;
            return Ok(Markup::Fragment(Fragment {
                children,
                span: self.lines.span(start, self.pos),
            }));
        }
        Ok(Markup::Element(self.parse_element(start)?))
    }

    fn parse_element(&mut self, start: usize) -> ParseResult<Element> {
        let name = self.parse_name(true)?;
        let mut attributes = Vec::new();

        // Type arguments: `<Select<Option> ...>`
        if let Some(lexed @ Lexed { token: TagToken::Lt, .. }) = self.peek_tag()? {
            self.pos = lexed.end;
            self.skip_type_parameters(lexed.start)?;
        }

        let self_closing = loop {
            let lexed = self.peek_tag()?.ok_or_else(|| {
                ParseError::unexpected_eof(self.source.len(), format!("'>' to close <{}>", name.value))
            })?;
            match lexed.token {
                TagToken::Gt => {
                    self.pos = lexed.end;
                    break false;
                }
                TagToken::Slash => {
                    self.pos = lexed.end;
                    self.expect_tag(TagToken::Gt, "'>' after '/'")?;
                    break true;
                }
                TagToken::LBrace => {
                    self.pos = lexed.end;
                    attributes.push(Attribute::Spread(self.parse_spread_attribute(lexed.start)?));
                }
                TagToken::Name(_) => attributes.push(Attribute::Named(self.parse_attribute()?)),
                other => {
                    return Err(ParseError::unexpected_token(
                        lexed.start..lexed.end,
                        "attribute or '>'",
                        other.to_string(),
                    ))
                }
            }
        };

        let opening = OpeningElement {
            name,
            attributes,
            self_closing,
            span: self.lines.span(start, self.pos),
        };

        if self_closing {
            return Ok(Element {
                opening,
                children: Vec::new(),
                closing: None,
                span: self.lines.span(start, self.pos),
            });
        }

        let (children, closing) = self.parse_children(Some(&opening.name))?;
        Ok(Element {
            opening,
            children,
            closing,
            span: self.lines.span(start, self.pos),
        })
    }

    /// `name`, `ns:name`, and for tags also `A.B.C`
    fn parse_name(&mut self, tag: bool) -> ParseResult<Name> {
        let first = self.peek_tag()?;
        let (mut value, start, mut end) = match first {
            Some(Lexed { token: TagToken::Name(word), start, end, .. }) => (word.to_string(), start, end),
            Some(lexed) => {
                return Err(ParseError::unexpected_token(
                    lexed.start..lexed.end,
                    "name",
                    lexed.token.to_string(),
                ))
            }
            None => return Err(ParseError::unexpected_eof(self.source.len(), "name")),
        };
        self.pos = end;

        loop {
            let separator = match self.peek_tag()? {
                Some(lexed @ Lexed { token: TagToken::Colon, .. }) => (lexed, ':'),
                Some(lexed @ Lexed { token: TagToken::Dot, .. }) if tag => (lexed, '.'),
                _ => break,
            };
            self.pos = separator.0.end;
            match self.peek_tag()? {
                Some(Lexed { token: TagToken::Name(word), end: part_end, .. }) => {
                    value.push(separator.1);
                    value.push_str(word);
                    self.pos = part_end;
                    end = part_end;
                }
                Some(lexed) => {
                    return Err(ParseError::unexpected_token(
                        lexed.start..lexed.end,
                        "name",
                        lexed.token.to_string(),
                    ))
                }
                None => return Err(ParseError::unexpected_eof(self.source.len(), "name")),
            }
        }

        Ok(Name {
            value,
            span: self.lines.span(start, end),
        })
    }

    fn parse_attribute(&mut self) -> ParseResult<NamedAttribute> {
        let name = self.parse_name(false)?;
        let start = name.span.start.offset;

        let value = match self.peek_tag()? {
            Some(lexed @ Lexed { token: TagToken::Assign, .. }) => {
                self.pos = lexed.end;
                Some(self.parse_attribute_value(&name)?)
            }
            _ => None,
        };

        Ok(NamedAttribute {
            name,
            value,
            span: self.lines.span(start, self.pos),
        })
    }

    fn parse_attribute_value(&mut self, name: &Name) -> ParseResult<AttributeValue> {
        let lexed = self.peek_tag()?.ok_or_else(|| {
            ParseError::unexpected_eof(self.source.len(), format!("value for attribute '{}'", name.value))
        })?;
        self.pos = lexed.end;

        match lexed.token {
            TagToken::String(raw) => Ok(AttributeValue::Literal(self.string_literal(raw, lexed.start, lexed.end))),
            TagToken::LBrace => Ok(AttributeValue::Expression(self.parse_expression_container(lexed.start)?)),
            TagToken::Lt => match self.parse_markup(lexed.start)? {
                Markup::Element(element) => Ok(AttributeValue::Element(Box::new(element))),
                Markup::Fragment(fragment) => Ok(AttributeValue::Fragment(Box::new(fragment))),
            },
            other => Err(ParseError::unexpected_token(
                lexed.start..lexed.end,
                format!("value for attribute '{}'", name.value),
                other.to_string(),
            )),
        }
    }

    /// `{...expr}`; `start` is the consumed `{`
    fn parse_spread_attribute(&mut self, start: usize) -> ParseResult<SpreadAttribute> {
        self.expect_script(ScriptToken::Ellipsis, "'...' in spread attribute")?;
        let region = self.scan_script(Until::Brace, None)?;

        Ok(SpreadAttribute {
            nodes: region.nodes,
            span: self.lines.span(start, self.pos),
        })
    }

    /// `{ expr }`; `start` is the consumed `{`
    fn parse_expression_container(&mut self, start: usize) -> ParseResult<ExpressionContainer> {
        let region = self.scan_script(Until::Brace, None)?;

        let expression = match (region.tokens, region.sole_literal) {
            (0, _) => Expression::Empty,
            (1, Some(literal)) => literal,
            _ => Expression::Script { nodes: region.nodes },
        };

        Ok(ExpressionContainer {
            expression,
            span: self.lines.span(start, self.pos),
        })
    }

    /// Children up to and including the closing tag of `parent`
    /// (`None` for a fragment)
    fn parse_children(&mut self, parent: Option<&Name>) -> ParseResult<(Vec<Child>, Option<ClosingElement>)> {
        let mut children = Vec::new();
        let bytes = self.source.as_bytes();

        loop {
            let text_start = self.pos;
            let len = bytes[self.pos..]
                .iter()
                .position(|b| *b == b'<' || *b == b'{')
                .unwrap_or(bytes.len() - self.pos);
            self.pos += len;
            if len > 0 {
                children.push(Child::Text(Text {
                    value: self.source[text_start..self.pos].to_string(),
                    span: self.lines.span(text_start, self.pos),
                }));
            }

            let start = self.pos;
            match bytes.get(self.pos) {
                None => {
                    return Err(ParseError::unexpected_eof(
                        self.source.len(),
                        format!("closing tag for {}", describe(parent)),
                    ))
                }
                Some(b'{') => {
                    self.pos += 1;
                    children.push(Child::Expression(self.parse_expression_container(start)?));
                }
                Some(_) => {
                    self.pos += 1;
                    if let Some(lexed @ Lexed { token: TagToken::Slash, .. }) = self.peek_tag()? {
                        self.pos = lexed.end;
                        let closing = self.parse_closing(start, parent)?;
                        return Ok((children, Some(closing)));
                    }
                    children.push(self.parse_markup(start)?.into());
                }
            }
        }
    }

    /// Rest of `</name>` with `</` consumed
    fn parse_closing(&mut self, start: usize, parent: Option<&Name>) -> ParseResult<ClosingElement> {
        let name = match self.peek_tag()? {
            Some(Lexed { token: TagToken::Gt, .. }) => None,
            _ => Some(self.parse_name(true)?),
        };

        let matches = match (parent, &name) {
            (None, None) => true,
            (Some(open), Some(close)) => open.value == close.value,
            _ => false,
        };
        if !matches {
            let found = name
                .as_ref()
                .map(|n| format!("</{}>", n.value))
                .unwrap_or_else(|| "</>".to_string());
            return Err(ParseError::unexpected_token(
                start..self.pos,
                format!("closing tag for {}", describe(parent)),
                found,
            ));
        }

        self.expect_tag(TagToken::Gt, "'>'")?;
        Ok(ClosingElement {
            name,
            span: self.lines.span(start, self.pos),
        })
    }

    // Helper methods

    fn peek_script(&self) -> ParseResult<Option<Lexed<ScriptToken<'src>>>> {
        let source: &'src str = self.source;
        let rest = &source[self.pos..];
        let mut lexer = ScriptToken::lexer(rest);
        let Some(result) = lexer.next() else {
            return Ok(None);
        };
        let span = lexer.span();
        let (start, end) = (self.pos + span.start, self.pos + span.end);
        let token = result.map_err(|_| ParseError::lex_error(start..end))?;
        Ok(Some(Lexed {
            token,
            start,
            end,
            newline_before: rest[..span.start].contains('\n'),
        }))
    }

    fn peek_tag(&self) -> ParseResult<Option<Lexed<TagToken<'src>>>> {
        let source: &'src str = self.source;
        let rest = &source[self.pos..];
        let mut lexer = TagToken::lexer(rest);
        let Some(result) = lexer.next() else {
            return Ok(None);
        };
        let span = lexer.span();
        let (start, end) = (self.pos + span.start, self.pos + span.end);
        let token = result.map_err(|_| ParseError::lex_error(start..end))?;
        Ok(Some(Lexed {
            token,
            start,
            end,
            newline_before: rest[..span.start].contains('\n'),
        }))
    }

    fn expect_script(&mut self, expected: ScriptToken<'src>, what: &str) -> ParseResult<()> {
        match self.peek_script()? {
            Some(lexed) if std::mem::discriminant(&lexed.token) == std::mem::discriminant(&expected) => {
                self.pos = lexed.end;
                Ok(())
            }
            Some(lexed) => Err(ParseError::unexpected_token(
                lexed.start..lexed.end,
                what,
                lexed.token.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len(), what)),
        }
    }

    fn expect_tag(&mut self, expected: TagToken<'src>, what: &str) -> ParseResult<()> {
        match self.peek_tag()? {
            Some(lexed) if std::mem::discriminant(&lexed.token) == std::mem::discriminant(&expected) => {
                self.pos = lexed.end;
                Ok(())
            }
            Some(lexed) => Err(ParseError::unexpected_token(
                lexed.start..lexed.end,
                what,
                lexed.token.to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len(), what)),
        }
    }
}

fn describe(parent: Option<&Name>) -> String {
    match parent {
        Some(name) => format!("<{}>", name.value),
        None => "<>".to_string(),
    }
}

/// Parse a source file. Markup is recognised unless the filename says the
/// file is plain TypeScript.
pub fn parse(source: &str, filename: &str) -> Result<Module, ParseFailure> {
    parse_with_options(source, filename, ParseOptions::for_filename(filename))
}

pub fn parse_with_options(source: &str, filename: &str, options: ParseOptions) -> Result<Module, ParseFailure> {
    let mut parser = Parser::new(source, filename, options);
    parser
        .parse_module()
        .map_err(|error| ParseFailure::new(filename, error))
}
