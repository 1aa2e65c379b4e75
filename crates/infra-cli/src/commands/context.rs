//! Context inspection commands

use std::path::Path;

use super::load_context;
use crate::error::{CliError, Result};

/// Resolve `path` and print the value as JSON
///
/// An Absent path is reported as an error so the process exits non-zero.
pub fn run_context_get(
    root: &Path,
    overrides: &[String],
    path: &str,
    delimiter: &str,
) -> Result<()> {
    let store = load_context(root, overrides)?;

    match store.resolve_with(path, delimiter) {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
        None => Err(CliError::user(format!("Context path '{path}' is not defined"))),
    }
}

/// Print the merged context store
pub fn run_context_show(root: &Path, overrides: &[String]) -> Result<()> {
    let store = load_context(root, overrides)?;
    println!("{}", serde_json::to_string_pretty(&store)?);
    Ok(())
}
