//! Node.js function bundled from a source entry point
//!
//! Receives the same defaults, alarms and SSM access as
//! [`function`](super::function). The runtime may be omitted and the handler
//! defaults to `handler`. Errors are aggregated with `Sum` rather than
//! `Maximum`.

use infra_context::ContextStore;
use serde::{Deserialize, Serialize};

use super::function::{self, Function, FunctionOptions, FunctionProps};
use crate::alarm::Statistic;
use crate::deployment::DeploymentContext;
use crate::merge::Merge;
use crate::stack::Stack;
use crate::{Error, Result};

/// Exported handler name used when none is given
pub const DEFAULT_HANDLER: &str = "handler";

/// Node.js function construction properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodejsFunctionProps {
    /// Source file to bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(flatten)]
    pub function: FunctionProps,
}

/// Add a Node.js function with organisation defaults and alarms to the stack
///
/// # Errors
///
/// Fails if `CUSTOMER` or `ENVIRONMENT` is missing from the context, or if
/// no `entry` is given.
pub fn create(
    stack: &mut Stack,
    store: &ContextStore,
    id: &str,
    props: NodejsFunctionProps,
    options: FunctionOptions,
) -> Result<Function> {
    let deployment = DeploymentContext::from_store(store)?;
    let log_level = deployment.log_level(store);

    let defaults = FunctionProps {
        handler: Some(DEFAULT_HANDLER.to_string()),
        ..function::default_props(id, &deployment, &log_level)
    };
    let props = NodejsFunctionProps {
        function: defaults.merge(props.function),
        ..props
    };
    tracing::debug!(id, entry = ?props.entry, "Creating Node.js function");

    if props.entry.is_none() {
        return Err(Error::invalid_props("nodejs function", id, "entry is required"));
    }

    function::synthesize(
        stack,
        store,
        &deployment,
        id,
        props.function.clone(),
        &props,
        &options,
        Statistic::Sum,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn props_flatten_function_fields() {
        let props: NodejsFunctionProps = serde_json::from_value(json!({
            "entry": "src/handlers/resize.ts",
            "memory_size": 512,
            "environment": {"BUCKET": "uploads"}
        }))
        .unwrap();

        assert_eq!(props.entry.as_deref(), Some("src/handlers/resize.ts"));
        assert_eq!(props.function.memory_size, Some(512));
        assert_eq!(props.function.environment["BUCKET"], "uploads");
    }
}
