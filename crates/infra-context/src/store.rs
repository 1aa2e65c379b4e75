//! The synthesis-time context store
//!
//! A `ContextStore` is loaded once per synthesis run and then only read.
//! It is passed explicitly to every function that needs a setting.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::resolver::{self, DEFAULT_DELIMITER};
use crate::{Error, Result};

/// Immutable hierarchical key-value store
///
/// Keys map to either scalars or nested objects. Use [`ContextStore::resolve`]
/// for path lookups such as `"acme.prod.logLevel"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContextStore {
    root: Map<String, Value>,
}

impl ContextStore {
    /// Create an empty store
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a store from a JSON object
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnObject`] if `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(Error::not_an_object(&other)),
        }
    }

    /// Single-level lookup of a top-level key, with no falsy filtering
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Resolve a `.`-delimited path
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        self.resolve_with(path, DEFAULT_DELIMITER)
    }

    /// Resolve a path split on a custom delimiter
    pub fn resolve_with(&self, path: &str, delimiter: &str) -> Option<&Value> {
        resolver::resolve(&self.root, path, delimiter)
    }

    /// Resolve a path and return it only if it is a string
    pub fn resolve_str(&self, path: &str) -> Option<&str> {
        self.resolve(path).and_then(Value::as_str)
    }

    /// Borrow the root object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Consume the store, returning the root as a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl From<Map<String, Value>> for ContextStore {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}

impl TryFrom<Value> for ContextStore {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}
