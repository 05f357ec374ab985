use crate::config::Config;
use anyhow::Result;
use clap::Args;
use pinpoint_editor::{LocateError, LocatedNode, Locator};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Source file to search
    pub file: PathBuf,

    /// 1-based line of the node's opening `<`
    pub line: usize,

    /// 0-based column of the node's opening `<`
    pub column: usize,
}

/// Print the markup node starting at `line:column` as JSON
pub fn locate(args: LocateArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = cwd.join(&args.file);
    let source = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let filename = args.file.to_string_lossy();

    let locator = Locator::new(&source, &filename)?.with_prefix(config.attribute_prefix);
    let node = locator.find(args.line, args.column)?;
    let located = LocatedNode::from_ref(node).ok_or_else(|| LocateError::NotFound {
        filename: filename.to_string(),
        line: args.line,
        column: args.column,
    })?;

    println!("{}", serde_json::to_string_pretty(&located)?);
    Ok(())
}
