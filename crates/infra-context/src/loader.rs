//! Layered context loading
//!
//! The `ContextLoader` builds a [`ContextStore`] from a hierarchy of sources,
//! with later sources overriding earlier ones:
//!
//! 1. **User defaults** - `~/.cdk.json`, its `context` object
//! 2. **Project config** - `<root>/cdk.json`, its `context` object
//! 3. **Cached context** - `<root>/cdk.context.json`, the whole object
//! 4. **Explicit overrides** - `KEY=VALUE` pairs, typically from the command line
//!
//! File layers are deep-merged. Missing files are silently skipped; a file
//! that exists but is not valid JSON is an error.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::merge::deep_merge;
use crate::store::ContextStore;
use crate::{Error, Result};

/// Project configuration file name
pub const PROJECT_FILE: &str = "cdk.json";

/// Cached context file name
pub const CACHED_CONTEXT_FILE: &str = "cdk.context.json";

/// User-level defaults file name, looked up in the home directory
pub const USER_FILE: &str = ".cdk.json";

/// A single `KEY=VALUE` context override
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOverride {
    pub key: String,
    pub value: Value,
}

impl ContextOverride {
    /// Parse `KEY=VALUE`
    ///
    /// Values that look like a JSON object or array are parsed as JSON so
    /// that nested settings can be supplied inline. Everything else is kept
    /// as a string.
    ///
    /// ```
    /// use infra_context::loader::ContextOverride;
    /// use serde_json::json;
    ///
    /// let o = ContextOverride::parse("ENVIRONMENT=prod").unwrap();
    /// assert_eq!(o.value, json!("prod"));
    ///
    /// let o = ContextOverride::parse(r#"acme={"prod":{"logLevel":"info"}}"#).unwrap();
    /// assert_eq!(o.value["prod"]["logLevel"], "info");
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((key, value)) = raw.split_once('=') else {
            return Err(Error::InvalidOverride { raw: raw.to_string() });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidOverride { raw: raw.to_string() });
        }

        let trimmed = value.trim_start();
        let value = if trimmed.starts_with('{') || trimmed.starts_with('[') {
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
        } else {
            Value::String(value.to_string())
        };

        Ok(Self {
            key: key.to_string(),
            value,
        })
    }
}

/// Loads and merges context from files and explicit overrides
pub struct ContextLoader {
    /// Project root directory containing `cdk.json`
    root: PathBuf,

    /// Override for the user home directory (used for testing).
    /// When `None`, `dirs::home_dir()` is used.
    home_dir_override: Option<PathBuf>,

    overrides: Vec<ContextOverride>,
}

impl ContextLoader {
    /// Create a loader rooted at the given project directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            home_dir_override: None,
            overrides: Vec::new(),
        }
    }

    /// Use a custom home directory for the user defaults layer.
    ///
    /// This is primarily useful for testing, where the real `~/.cdk.json`
    /// must not leak into results.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir_override = Some(home.into());
        self
    }

    /// Add explicit overrides, applied after every file layer
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = ContextOverride>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    fn home_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.home_dir_override {
            return Some(dir.clone());
        }
        dirs::home_dir()
    }

    /// Get the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every layer and return the merged store
    pub fn load(&self) -> Result<ContextStore> {
        let mut merged = Value::Object(Map::new());

        // Layer 1 - User defaults (~/.cdk.json)
        if let Some(home) = self.home_dir() {
            let user_path = home.join(USER_FILE);
            if let Some(context) = read_context_key(&user_path)? {
                tracing::debug!(?user_path, "Loading user context (layer 1)");
                deep_merge(&mut merged, &context);
            } else {
                tracing::debug!(?user_path, "No user context found (layer 1) - skipping");
            }
        }

        // Layer 2 - Project config (cdk.json)
        let project_path = self.root.join(PROJECT_FILE);
        if let Some(context) = read_context_key(&project_path)? {
            tracing::debug!(?project_path, "Loading project context (layer 2)");
            deep_merge(&mut merged, &context);
        }

        // Layer 3 - Cached context (cdk.context.json)
        let cached_path = self.root.join(CACHED_CONTEXT_FILE);
        if let Some(context) = read_json(&cached_path)? {
            tracing::debug!(?cached_path, "Loading cached context (layer 3)");
            deep_merge(&mut merged, &context);
        }

        // Layer 4 - Explicit overrides replace whole top-level keys
        if let Value::Object(ref mut map) = merged {
            for o in &self.overrides {
                tracing::debug!(key = %o.key, "Applying context override (layer 4)");
                map.insert(o.key.clone(), o.value.clone());
            }
        }

        ContextStore::from_value(merged)
    }

    /// Check if a project config file exists
    pub fn has_project_file(&self) -> bool {
        self.root.join(PROJECT_FILE).is_file()
    }
}

/// Read a JSON file, returning `None` if it does not exist
fn read_json(path: &Path) -> Result<Option<Value>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| Error::InvalidContextFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(Error::InvalidContextFile {
            path: path.to_path_buf(),
            message: "expected a JSON object".to_string(),
        });
    }
    Ok(Some(value))
}

/// Read the `context` object of a `cdk.json`-style file
fn read_context_key(path: &Path) -> Result<Option<Value>> {
    let Some(mut value) = read_json(path)? else {
        return Ok(None);
    };
    match value.get_mut("context").map(Value::take) {
        None => Ok(None),
        Some(context @ Value::Object(_)) => Ok(Some(context)),
        Some(_) => Err(Error::InvalidContextFile {
            path: path.to_path_buf(),
            message: "'context' must be an object".to_string(),
        }),
    }
}
