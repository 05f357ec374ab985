use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Source file to parse
    pub file: PathBuf,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Print the located tree of a file as JSON
pub fn parse(args: ParseArgs, cwd: &Path) -> Result<()> {
    let path = cwd.join(&args.file);
    let source = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;

    let module = pinpoint_parser::parse(&source, &args.file.to_string_lossy())
        .map_err(|failure| anyhow::anyhow!("\n{}", failure.render(&source)))?;

    let json = if args.compact {
        serde_json::to_string(&module)?
    } else {
        serde_json::to_string_pretty(&module)?
    };
    println!("{}", json);
    Ok(())
}
