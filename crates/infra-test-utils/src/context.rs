//! Context fixtures.
//!
//! Every fixture describes customer `cuckoo` deploying to `prod`, with the
//! per-deployment settings the wrappers read.

use infra_context::ContextStore;
use serde_json::{Value, json};

/// Customer used by the fixtures
pub const CUSTOMER: &str = "cuckoo";

/// Environment used by the fixtures
pub const ENVIRONMENT: &str = "prod";

/// Alarm topic configured by [`sample_context`]
pub const ALARM_TOPIC: &str = "exampleSnsTopic";

/// Raw context with an alarm topic and an `info` log level.
pub fn sample_context_value() -> Value {
    json!({
        "CUSTOMER": CUSTOMER,
        "ENVIRONMENT": ENVIRONMENT,
        CUSTOMER: {
            ENVIRONMENT: {
                "alarmNotificationsTopic": ALARM_TOPIC,
                "logLevel": "info"
            }
        }
    })
}

/// Store built from [`sample_context_value`].
pub fn sample_context() -> ContextStore {
    store(sample_context_value())
}

/// Store with `CUSTOMER` and `ENVIRONMENT` but no per-deployment settings.
pub fn context_without_topic() -> ContextStore {
    store(json!({
        "CUSTOMER": CUSTOMER,
        "ENVIRONMENT": ENVIRONMENT,
    }))
}

/// Store with only `ENVIRONMENT` set to `environment`.
pub fn environment_only(environment: &str) -> ContextStore {
    store(json!({ "ENVIRONMENT": environment }))
}

/// Build a store from a JSON object, panicking on anything else.
pub fn store(value: Value) -> ContextStore {
    ContextStore::from_value(value).expect("fixture context must be a JSON object")
}
