//! Command implementations for infra-cli

pub mod context;
pub mod synth;

pub use context::{run_context_get, run_context_show};
pub use synth::run_synth;

use infra_context::{ContextLoader, ContextOverride, ContextStore};
use std::path::Path;

use crate::error::Result;

/// Load the context store for `root` with `-c` overrides applied
pub fn load_context(root: &Path, overrides: &[String]) -> Result<ContextStore> {
    let overrides = overrides
        .iter()
        .map(|raw| ContextOverride::parse(raw))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let loader = ContextLoader::new(root).with_overrides(overrides);
    if !loader.has_project_file() {
        tracing::debug!(?root, "No cdk.json in project directory");
    }
    Ok(loader.load()?)
}
