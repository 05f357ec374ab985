mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{annotate, batch, edit, locate, parse, AnnotateArgs, BatchArgs, EditArgs, LocateArgs, ParseArgs};
use tracing_subscriber::EnvFilter;

/// Pinpoint CLI - Trace rendered elements back to their source, and edit them there
#[derive(Parser, Debug)]
#[command(name = "pinpoint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inject source-location attributes into JSX/TSX files
    Annotate(AnnotateArgs),

    /// Print the located markup tree of a file as JSON
    Parse(ParseArgs),

    /// Find the markup node starting at a line and column
    Locate(LocateArgs),

    /// Rewrite one element's class list, text or attribute
    Edit(EditArgs),

    /// Apply a JSON list of edits in order
    Batch(BatchArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Annotate(args) => annotate(args, &cwd),
        Command::Parse(args) => parse(args, &cwd),
        Command::Locate(args) => locate(args, &cwd),
        Command::Edit(args) => edit(args, &cwd),
        Command::Batch(args) => batch(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
