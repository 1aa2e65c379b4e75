//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// infra - Synthesise resources with organisation defaults
#[derive(Parser, Debug)]
#[command(name = "infra")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory holding cdk.json and cdk.context.json
    #[arg(short, long, global = true, env = "INFRA_PROJECT_DIR")]
    pub dir: Option<PathBuf>,

    /// Context override as KEY=VALUE (repeatable)
    #[arg(short = 'c', long = "context", global = true, value_name = "KEY=VALUE")]
    pub context: Vec<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synthesise an app definition into a resource description
    ///
    /// Examples:
    ///   infra synth app.toml
    ///   infra synth app.toml -c ENVIRONMENT=stage
    ///   infra synth app.toml --out template.json
    Synth {
        /// App definition file (TOML)
        app: PathBuf,

        /// Write the description to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Inspect the resolved context
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },
}

/// Context subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    /// Resolve a path and print the value as JSON
    Get {
        /// Path such as `acme.prod.logLevel`
        path: String,

        /// Delimiter for the top-level key
        #[arg(long, default_value = ".")]
        delimiter: String,
    },

    /// Print the merged context
    Show,
}
