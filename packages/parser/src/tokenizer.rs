//! Lexers for host script and markup tag interiors using logos
//!
//! Template literals, regular expression literals and markup text are not
//! tokenized here: the parser scans them directly because their extent
//! depends on context the lexer does not have.

use logos::{FilterResult, Lexer, Logos};
use std::fmt;

/// Tokens of the host script (JavaScript / TypeScript)
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0B\x0C]+")]
#[logos(skip r"//[^\n]*")]
pub enum ScriptToken<'src> {
    // Never produced: the callback skips the whole comment
    #[token("/*", skip_block_comment)]
    BlockComment,

    // Identifiers and keywords; the parser decides which is which
    #[regex(r"[A-Za-z_$\x{80}-\x{10FFFF}][A-Za-z0-9_$\x{80}-\x{10FFFF}]*", |lex| lex.slice())]
    Ident(&'src str),

    // String literals, quotes included
    #[regex(r#""([^"\\\r\n]|\\[^\r\n]|\\\r?\n)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\\r\n]|\\[^\r\n]|\\\r?\n)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9A-Za-z_]*)?", |lex| lex.slice())]
    #[regex(r"\.[0-9][0-9A-Za-z_]*", |lex| lex.slice())]
    Number(&'src str),

    #[token("`")]
    Backtick,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("/")]
    Slash,

    #[token("=")]
    Assign,

    #[token("=>")]
    Arrow,

    #[token("...")]
    Ellipsis,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    // Everything else that can appear between operands
    #[regex(r"===|!==|==|!=|<=|>=|&&=|\|\|=|\?\?=|&&|\|\||\?\?|\?\.|\+\+|--|\*\*=|\*\*|[-+*%&|^]=|[-+*%&|^~!?@#\\]", |lex| lex.slice())]
    Operator(&'src str),
}

/// Skip past the `*/` closing a block comment; unterminated comments are
/// a lex error covering the rest of the input
fn skip_block_comment<'src, T>(lex: &mut Lexer<'src, T>) -> FilterResult<(), ()>
where
    T: Logos<'src, Source = str>,
{
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}

impl<'src> ScriptToken<'src> {
    /// Can the token end an operand? A `<` or `/` after such a token is an
    /// operator rather than the start of markup or a regular expression.
    pub fn ends_operand(&self) -> bool {
        match self {
            ScriptToken::Ident(word) => !is_expression_keyword(word),
            ScriptToken::String(_)
            | ScriptToken::Number(_)
            | ScriptToken::RParen
            | ScriptToken::RBracket
            | ScriptToken::RBrace => true,
            _ => false,
        }
    }
}

/// Keywords after which an expression is expected
pub fn is_expression_keyword(word: &str) -> bool {
    matches!(
        word,
        "return"
            | "typeof"
            | "instanceof"
            | "in"
            | "of"
            | "new"
            | "delete"
            | "void"
            | "throw"
            | "case"
            | "do"
            | "else"
            | "yield"
            | "await"
            | "default"
            | "extends"
    )
}

/// Keywords that start a statement; an expression-bodied arrow never runs
/// past one of these when it begins a new line.
pub fn is_statement_keyword(word: &str) -> bool {
    matches!(
        word,
        "const"
            | "let"
            | "var"
            | "function"
            | "class"
            | "export"
            | "import"
            | "if"
            | "for"
            | "while"
            | "switch"
            | "try"
            | "return"
            | "interface"
            | "type"
            | "enum"
    )
}

/// Identifiers that can never name a method (`if (x) {` is not a method)
pub fn is_reserved_word(word: &str) -> bool {
    is_expression_keyword(word)
        || matches!(
            word,
            "if" | "for"
                | "while"
                | "switch"
                | "catch"
                | "with"
                | "function"
                | "class"
                | "const"
                | "let"
                | "var"
                | "import"
                | "export"
                | "super"
                | "this"
        )
}

impl<'src> fmt::Display for ScriptToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptToken::BlockComment => write!(f, "comment"),
            ScriptToken::Ident(s) => write!(f, "identifier '{}'", s),
            ScriptToken::String(s) => write!(f, "string {}", s),
            ScriptToken::Number(n) => write!(f, "number {}", n),
            ScriptToken::Backtick => write!(f, "'`'"),
            ScriptToken::LBrace => write!(f, "'{{'"),
            ScriptToken::RBrace => write!(f, "'}}'"),
            ScriptToken::LParen => write!(f, "'('"),
            ScriptToken::RParen => write!(f, "')'"),
            ScriptToken::LBracket => write!(f, "'['"),
            ScriptToken::RBracket => write!(f, "']'"),
            ScriptToken::Lt => write!(f, "'<'"),
            ScriptToken::Gt => write!(f, "'>'"),
            ScriptToken::Slash => write!(f, "'/'"),
            ScriptToken::Assign => write!(f, "'='"),
            ScriptToken::Arrow => write!(f, "'=>'"),
            ScriptToken::Ellipsis => write!(f, "'...'"),
            ScriptToken::Semicolon => write!(f, "';'"),
            ScriptToken::Comma => write!(f, "','"),
            ScriptToken::Colon => write!(f, "':'"),
            ScriptToken::Dot => write!(f, "'.'"),
            ScriptToken::Operator(op) => write!(f, "'{}'", op),
        }
    }
}

/// Tokens inside a markup tag: `<name attr="x" {...spread} />`
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0C]+")]
#[logos(skip r"//[^\n]*")]
pub enum TagToken<'src> {
    #[token("/*", skip_block_comment)]
    BlockComment,

    // Names may contain dashes: data-id, aria-label, my-element
    #[regex(r"[A-Za-z_$\x{80}-\x{10FFFF}][A-Za-z0-9_$\-\x{80}-\x{10FFFF}]*", |lex| lex.slice())]
    Name(&'src str),

    // Attribute strings have no escapes and may span lines
    #[regex(r#""[^"]*""#, |lex| lex.slice())]
    #[regex(r"'[^']*'", |lex| lex.slice())]
    String(&'src str),

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    #[token("=")]
    Assign,

    #[token("{")]
    LBrace,

    #[token("/")]
    Slash,

    #[token(">")]
    Gt,

    #[token("<")]
    Lt,

    #[token(",")]
    Comma,
}

impl<'src> fmt::Display for TagToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagToken::BlockComment => write!(f, "comment"),
            TagToken::Name(s) => write!(f, "name '{}'", s),
            TagToken::String(s) => write!(f, "string {}", s),
            TagToken::Colon => write!(f, "':'"),
            TagToken::Dot => write!(f, "'.'"),
            TagToken::Assign => write!(f, "'='"),
            TagToken::LBrace => write!(f, "'{{'"),
            TagToken::Slash => write!(f, "'/'"),
            TagToken::Gt => write!(f, "'>'"),
            TagToken::Lt => write!(f, "'<'"),
            TagToken::Comma => write!(f, "','"),
        }
    }
}

/// Tokenize host script, dropping anything the lexer rejects
pub fn tokenize(source: &str) -> Vec<(ScriptToken<'_>, std::ops::Range<usize>)> {
    let lexer = ScriptToken::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_and_keywords() {
        let tokens = tokenize("const Button = $el _private");

        assert_eq!(tokens[0].0, ScriptToken::Ident("const"));
        assert_eq!(tokens[1].0, ScriptToken::Ident("Button"));
        assert_eq!(tokens[2].0, ScriptToken::Assign);
        assert_eq!(tokens[3].0, ScriptToken::Ident("$el"));
        assert_eq!(tokens[4].0, ScriptToken::Ident("_private"));
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#""hello world" 'single' "escaped \"quote\"""#);

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].0, ScriptToken::String("\"hello world\""));
        assert_eq!(tokens[1].0, ScriptToken::String("'single'"));
        assert!(matches!(tokens[2].0, ScriptToken::String(_)));
    }

    #[test]
    fn test_arrow_and_comparison_are_distinct() {
        let tokens = tokenize("(a) => a <= b === c");

        assert!(tokens.iter().any(|(t, _)| *t == ScriptToken::Arrow));
        assert!(tokens.iter().any(|(t, _)| *t == ScriptToken::Operator("<=")));
        assert!(tokens.iter().any(|(t, _)| *t == ScriptToken::Operator("===")));
        assert!(!tokens.iter().any(|(t, _)| *t == ScriptToken::Lt));
    }

    #[test]
    fn test_comments_ignored() {
        let source = r#"
            // line comment
            foo /* block
                   comment */ bar /** doc **/
        "#;
        let tokens = tokenize(source);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].0, ScriptToken::Ident("foo"));
        assert_eq!(tokens[1].0, ScriptToken::Ident("bar"));
    }

    #[test]
    fn test_unterminated_block_comment_is_error() {
        let mut lexer = ScriptToken::lexer("a /* never closed");

        assert_eq!(lexer.next(), Some(Ok(ScriptToken::Ident("a"))));
        assert_eq!(lexer.next(), Some(Err(())));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_tag_comments_ignored() {
        let mut lexer = TagToken::lexer("div /* note */ id='x' />");

        assert_eq!(lexer.next(), Some(Ok(TagToken::Name("div"))));
        assert_eq!(lexer.next(), Some(Ok(TagToken::Name("id"))));
    }

    #[test]
    fn test_operand_tracking() {
        assert!(ScriptToken::Ident("value").ends_operand());
        assert!(ScriptToken::RParen.ends_operand());
        assert!(!ScriptToken::Ident("return").ends_operand());
        assert!(!ScriptToken::Arrow.ends_operand());
        assert!(!ScriptToken::Operator("&&").ends_operand());
    }

    #[test]
    fn test_tag_tokens() {
        let mut lexer = TagToken::lexer(r#"div data-id="x" aria-label='y' />"#);

        assert_eq!(lexer.next(), Some(Ok(TagToken::Name("div"))));
        assert_eq!(lexer.next(), Some(Ok(TagToken::Name("data-id"))));
        assert_eq!(lexer.next(), Some(Ok(TagToken::Assign)));
        assert_eq!(lexer.next(), Some(Ok(TagToken::String("\"x\""))));
        assert_eq!(lexer.next(), Some(Ok(TagToken::Name("aria-label"))));
        assert_eq!(lexer.next(), Some(Ok(TagToken::Assign)));
        assert_eq!(lexer.next(), Some(Ok(TagToken::String("'y'"))));
        assert_eq!(lexer.next(), Some(Ok(TagToken::Slash)));
        assert_eq!(lexer.next(), Some(Ok(TagToken::Gt)));
        assert_eq!(lexer.next(), None);
    }
}
