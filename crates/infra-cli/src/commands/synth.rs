//! Synth command

use colored::Colorize;
use infra_core::App;
use std::fs;
use std::path::Path;

use super::load_context;
use crate::error::{CliError, Result};

/// Synthesise `app` and print or write the resource description
pub fn run_synth(root: &Path, app: &Path, overrides: &[String], out: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(app).map_err(|e| {
        CliError::user(format!("Failed to read app definition {}: {}", app.display(), e))
    })?;
    let definition = App::from_toml(&content)?;
    let store = load_context(root, overrides)?;

    let stack = definition.synth(&store)?;
    let rendered = serde_json::to_string_pretty(&stack.to_template())?;

    match out {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))?;
            eprintln!(
                "{} {} ({} resources) -> {}",
                "Synthesised".green().bold(),
                stack.name().cyan(),
                stack.resources().len(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
