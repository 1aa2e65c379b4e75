//! Workflow state machine with organisation defaults
//!
//! On top of the caller's properties this configures:
//!
//! - Express type
//! - A five minute timeout
//! - X-Ray tracing
//! - Alarms on failed and timed out executions
//! - Breach and recovery notifications to the deployment's alarm topic

use infra_context::ContextStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alarm::{self, Alarm, AlarmOptions, Metric, Statistic};
use crate::deployment::DeploymentContext;
use crate::merge::{Merge, impl_merge};
use crate::stack::{ResourceKind, ResourceRef, Stack};
use crate::{Error, Result};

/// Default execution timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5 * 60;

/// Standard or express workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateMachineType {
    Standard,
    Express,
}

/// Execution logging destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogOptions {
    pub log_group: String,
    #[serde(default)]
    pub include_execution_data: bool,
}

/// State machine construction properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateMachineProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_machine_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_machine_type: Option<StateMachineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing_enabled: Option<bool>,
    /// States language definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<LogOptions>,
}

impl_merge!(StateMachineProps {
    state_machine_name,
    state_machine_type,
    timeout_secs,
    tracing_enabled,
    definition,
    logs,
});

/// Wrapper options for [`create`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StateMachineOptions {
    pub failed_executions_alarm: Option<AlarmOptions>,
    pub timed_out_executions_alarm: Option<AlarmOptions>,
    pub disable_alarm_notifications: bool,
}

/// A synthesised state machine
#[derive(Debug, Clone)]
pub struct StateMachine {
    pub resource: ResourceRef,
    pub props: StateMachineProps,
    pub failed_alarm: Alarm,
    pub timed_out_alarm: Alarm,
}

pub fn default_props() -> StateMachineProps {
    StateMachineProps {
        state_machine_type: Some(StateMachineType::Express),
        timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        tracing_enabled: Some(true),
        ..Default::default()
    }
}

pub fn metric_failed(resource: &ResourceRef) -> Metric {
    states_metric(resource, "ExecutionsFailed")
}

pub fn metric_timed_out(resource: &ResourceRef) -> Metric {
    states_metric(resource, "ExecutionsTimedOut")
}

fn states_metric(resource: &ResourceRef, name: &str) -> Metric {
    Metric::new("AWS/States", name)
        .with_statistic(Statistic::Maximum)
        .with_dimension("StateMachineArn", resource.reference())
}

/// Add a state machine with organisation defaults and alarms to the stack
///
/// # Errors
///
/// Fails if `CUSTOMER` or `ENVIRONMENT` is missing from the context, or if
/// no definition is given.
pub fn create(
    stack: &mut Stack,
    store: &ContextStore,
    id: &str,
    props: StateMachineProps,
    options: StateMachineOptions,
) -> Result<StateMachine> {
    let deployment = DeploymentContext::from_store(store)?;
    let props = default_props().merge(props);
    tracing::debug!(id, kind = ?props.state_machine_type, "Creating state machine");

    if props.definition.is_none() {
        return Err(Error::invalid_props("state machine", id, "definition is required"));
    }

    stack.transaction(|stack| {
        let resource = stack.add_resource(id, ResourceKind::StateMachine, &props)?;

        let mut failed_alarm = alarm::create_alarm_with_defaults(
            &metric_failed(&resource),
            id,
            "Failed Executions",
            format!("Failed executions reported by {id}"),
            AlarmOptions::defaults(1.0, 1, 1),
            options.failed_executions_alarm.as_ref(),
        )?;

        let mut timed_out_alarm = alarm::create_alarm_with_defaults(
            &metric_timed_out(&resource),
            id,
            "Timed Out Executions",
            format!("Timed out executions reported by {id}"),
            AlarmOptions::defaults(1.0, 1, 1),
            options.timed_out_executions_alarm.as_ref(),
        )?;

        alarm::attach_alarms(
            stack,
            store,
            &deployment,
            [&mut failed_alarm, &mut timed_out_alarm],
            options.disable_alarm_notifications,
        )?;

        Ok(StateMachine {
            resource,
            props,
            failed_alarm,
            timed_out_alarm,
        })
    })
}
