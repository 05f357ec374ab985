use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use pinpoint_editor::{EditRequest, Patcher};
use std::io::Read;
use std::path::Path;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON file holding an array of edit requests, or `-` for stdin
    pub input: String,
}

/// Apply a list of edits in order and print the batch result as JSON.
/// Exits non-zero when any edit failed.
pub fn batch(args: BatchArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let requests = read_requests(&args.input, cwd)?;
    tracing::info!("Applying {} edits", requests.len());

    let patcher = Patcher::new(config.get_root_dir(cwd)).with_attribute_prefix(config.attribute_prefix.clone());
    let result = patcher.apply_batch(&requests);

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_requests(input: &str, cwd: &Path) -> Result<Vec<EditRequest>> {
    let json = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        let path = cwd.join(input);
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&json).context("Invalid edit requests")
}
