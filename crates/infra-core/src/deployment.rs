//! Deployment-scoped settings read from the context store
//!
//! Every wrapper that emits alarms or environment variables needs to know
//! which customer and environment it is being synthesised for. Both come
//! from the top-level `CUSTOMER` and `ENVIRONMENT` context keys; everything
//! else is looked up below `<customer>.<environment>`.

use infra_context::ContextStore;
use serde_json::Value;

use crate::{Error, Result};

/// Context key naming the customer
pub const CUSTOMER_KEY: &str = "CUSTOMER";

/// Context key naming the environment
pub const ENVIRONMENT_KEY: &str = "ENVIRONMENT";

/// Setting holding the log level for functions
pub const LOG_LEVEL_SETTING: &str = "logLevel";

/// Log level used when none is configured
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// The customer and environment a stack is synthesised for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    pub customer: String,
    pub environment: String,
}

impl DeploymentContext {
    /// Read `CUSTOMER` and `ENVIRONMENT` from the store
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingContext`] naming every key that is missing,
    /// falsy, or not a scalar.
    pub fn from_store(store: &ContextStore) -> Result<Self> {
        let customer = resolve_scalar(store, CUSTOMER_KEY);
        let environment = resolve_scalar(store, ENVIRONMENT_KEY);

        match (customer, environment) {
            (Some(customer), Some(environment)) => Ok(Self {
                customer,
                environment,
            }),
            (customer, environment) => {
                let mut keys = Vec::new();
                if customer.is_none() {
                    keys.push(CUSTOMER_KEY);
                }
                if environment.is_none() {
                    keys.push(ENVIRONMENT_KEY);
                }
                Err(Error::MissingContext { keys })
            }
        }
    }

    /// Path of a per-deployment setting, e.g. `acme.prod.logLevel`
    pub fn setting_path(&self, name: &str) -> String {
        format!("{}.{}.{}", self.customer, self.environment, name)
    }

    /// Resolve a per-deployment setting
    pub fn setting<'a>(&self, store: &'a ContextStore, name: &str) -> Option<&'a Value> {
        store.resolve(&self.setting_path(name))
    }

    /// The configured function log level, or [`DEFAULT_LOG_LEVEL`]
    pub fn log_level(&self, store: &ContextStore) -> String {
        self.setting(store, LOG_LEVEL_SETTING)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_string()
    }
}

/// Read only `ENVIRONMENT` from the store
pub fn require_environment(store: &ContextStore) -> Result<String> {
    resolve_scalar(store, ENVIRONMENT_KEY).ok_or(Error::MissingContext {
        keys: vec![ENVIRONMENT_KEY],
    })
}

/// A present top-level key rendered as text
///
/// Strings are taken as-is and numbers or booleans use their JSON text.
/// Objects and arrays cannot name a customer or environment.
fn resolve_scalar(store: &ContextStore, key: &str) -> Option<String> {
    match store.resolve(key)? {
        Value::String(s) => Some(s.clone()),
        value @ (Value::Number(_) | Value::Bool(_)) => Some(value.to_string()),
        _ => {
            tracing::debug!(key, "Context key is not a scalar");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(value: Value) -> ContextStore {
        ContextStore::from_value(value).unwrap()
    }

    #[test]
    fn from_store_reads_both_keys() {
        let ctx = DeploymentContext::from_store(&store(json!({
            "CUSTOMER": "cuckoo",
            "ENVIRONMENT": "prod"
        })))
        .unwrap();

        assert_eq!(ctx.customer, "cuckoo");
        assert_eq!(ctx.environment, "prod");
        assert_eq!(ctx.setting_path("logLevel"), "cuckoo.prod.logLevel");
    }

    #[test]
    fn from_store_names_every_missing_key() {
        let err = DeploymentContext::from_store(&store(json!({}))).unwrap_err();
        match err {
            Error::MissingContext { keys } => assert_eq!(keys, vec!["CUSTOMER", "ENVIRONMENT"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_customer_counts_as_missing() {
        let err = DeploymentContext::from_store(&store(json!({
            "CUSTOMER": "",
            "ENVIRONMENT": "prod"
        })))
        .unwrap_err();

        assert_eq!(err.to_string(), "Context variables CUSTOMER were not defined");
    }

    #[test]
    fn numeric_keys_are_accepted_as_text() {
        let s = store(json!({"CUSTOMER": 42, "ENVIRONMENT": true}));
        let ctx = DeploymentContext::from_store(&s).unwrap();

        assert_eq!(ctx.customer, "42");
        assert_eq!(ctx.environment, "true");
        assert_eq!(require_environment(&s).unwrap(), "true");
    }

    #[test]
    fn structured_keys_count_as_missing() {
        let err = DeploymentContext::from_store(&store(json!({
            "CUSTOMER": {"name": "cuckoo"},
            "ENVIRONMENT": ["prod"]
        })))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Context variables CUSTOMER and/or ENVIRONMENT were not defined"
        );
    }

    #[test]
    fn log_level_defaults_to_debug() {
        let s = store(json!({"CUSTOMER": "c", "ENVIRONMENT": "e"}));
        let ctx = DeploymentContext::from_store(&s).unwrap();
        assert_eq!(ctx.log_level(&s), "debug");
    }

    #[test]
    fn require_environment_ignores_customer() {
        let s = store(json!({"ENVIRONMENT": "stage"}));
        assert_eq!(require_environment(&s).unwrap(), "stage");
        assert!(require_environment(&store(json!({}))).is_err());
    }
}
