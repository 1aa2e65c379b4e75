//! Error types for infra-context

use std::path::PathBuf;

/// Result type for infra-context operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a context store
///
/// Path lookups never fail: a missing value is reported as `None` by the
/// resolver. Only loading and constructing a store can produce these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root of a context store must be a JSON object
    #[error("Context root must be an object, got {kind}")]
    NotAnObject { kind: &'static str },

    /// A context file exists but could not be parsed
    #[error("Invalid context file {path}: {message}")]
    InvalidContextFile { path: PathBuf, message: String },

    /// A `KEY=VALUE` override was malformed
    #[error("Invalid context override '{raw}': expected KEY=VALUE")]
    InvalidOverride { raw: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_an_object(value: &serde_json::Value) -> Self {
        let kind = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        Self::NotAnObject { kind }
    }
}
