//! infra CLI
//!
//! Synthesises app definitions with organisation defaults and inspects the
//! context they are synthesised against.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use std::path::Path;

use cli::{Cli, Commands, ContextAction};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    execute_command(cli.command, &root, &cli.context)
}

fn execute_command(cmd: Commands, root: &Path, overrides: &[String]) -> Result<()> {
    match cmd {
        Commands::Synth { app, out } => {
            commands::run_synth(root, &app, overrides, out.as_deref())
        }
        Commands::Context { action } => match action {
            ContextAction::Get { path, delimiter } => {
                commands::run_context_get(root, overrides, &path, &delimiter)
            }
            ContextAction::Show => commands::run_context_show(root, overrides),
        },
    }
}
