use crate::config::Config;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use pinpoint_editor::{EditKind, EditRequest, Patcher};
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Replace the class list
    Style,
    /// Replace the element's literal text
    Content,
    /// Replace or add a literal attribute
    Attribute,
}

impl From<KindArg> for EditKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Style => EditKind::Style,
            KindArg::Content => EditKind::Content,
            KindArg::Attribute => EditKind::Attribute,
        }
    }
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// File to edit, absolute or relative to rootDir
    #[arg(short, long)]
    pub file: String,

    /// 1-based line of the element
    #[arg(short, long)]
    pub line: usize,

    /// 0-based column of the element
    #[arg(short, long)]
    pub column: usize,

    #[arg(short, long, value_enum)]
    pub kind: KindArg,

    /// New class list, text, or attribute value
    #[arg(long)]
    pub value: String,

    /// Attribute to set (attribute edits only)
    #[arg(short, long)]
    pub attribute: Option<String>,

    /// Value the caller believes is currently there
    #[arg(long)]
    pub original: Option<String>,
}

impl EditArgs {
    fn into_request(self) -> EditRequest {
        let mut request = EditRequest::new(self.file, self.line, self.column, self.kind.into(), self.value);
        request.attribute_name = self.attribute;
        request.original_value = self.original;
        request
    }
}

/// Apply a single edit to a source file
pub fn edit(args: EditArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let patcher = Patcher::new(config.get_root_dir(cwd)).with_attribute_prefix(config.attribute_prefix.clone());

    let request = args.into_request();
    let result = patcher.apply_edit(&request);
    if !result.success {
        anyhow::bail!("{}", result.message);
    }

    println!("{} {}", "✓".green(), result.message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_become_request() {
        let args = EditArgs {
            file: "src/App.jsx".to_string(),
            line: 3,
            column: 4,
            kind: KindArg::Attribute,
            value: "Close".to_string(),
            attribute: Some("aria-label".to_string()),
            original: None,
        };

        let request = args.into_request();

        assert_eq!(request.kind, EditKind::Attribute);
        assert_eq!(request.attribute_name.as_deref(), Some("aria-label"));
        assert_eq!(request.new_value, "Close");
        assert_eq!((request.line, request.column), (3, 4));
    }
}
