//! Writing values back as source literals

/// Markup attribute value for `value`, keeping `preferred` quotes when the
/// value allows it. Attribute strings cannot escape their delimiter, so a
/// value holding both quote kinds becomes an expression container.
pub fn attribute_literal(value: &str, preferred: char) -> String {
    let other = if preferred == '"' { '\'' } else { '"' };
    if !value.contains(preferred) {
        format!("{preferred}{value}{preferred}")
    } else if !value.contains(other) {
        format!("{other}{value}{other}")
    } else {
        format!("{{{}}}", script_string(value, '"'))
    }
}

/// Script string literal with the given quote
pub fn script_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Template literal without substitutions
pub fn template_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('`');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out.push('`');
    out
}

/// Markup text: characters that would start markup or an expression are
/// written as entities
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            c => out.push(c),
        }
    }
    out
}

/// Attribute names accepted for insertion: `name`, `data-x`, `xlink:href`
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '-' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_literal_quote_fallback() {
        assert_eq!(attribute_literal("a b", '"'), "\"a b\"");
        assert_eq!(attribute_literal("a b", '\''), "'a b'");
        assert_eq!(attribute_literal("say \"hi\"", '"'), "'say \"hi\"'");
        assert_eq!(attribute_literal("it's \"x\"", '"'), "{\"it's \\\"x\\\"\"}");
    }

    #[test]
    fn test_script_and_template_strings() {
        assert_eq!(script_string("it's", '\''), "'it\\'s'");
        assert_eq!(script_string("a\\b\n", '"'), "\"a\\\\b\\n\"");
        assert_eq!(template_string("cost ${x} `y`"), "`cost \\${x} \\`y\\``");
        assert_eq!(template_string("$5"), "`$5`");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b && {c}"), "a &lt; b &amp;&amp; &#123;c&#125;");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_attribute_names() {
        assert!(is_valid_attribute_name("data-testid"));
        assert!(is_valid_attribute_name("xlink:href"));
        assert!(!is_valid_attribute_name(""));
        assert!(!is_valid_attribute_name("a b"));
        assert!(!is_valid_attribute_name("1x"));
        assert!(!is_valid_attribute_name("x=\"y\""));
    }
}
