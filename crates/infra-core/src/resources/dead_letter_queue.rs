//! Dead-letter queue with organisation defaults
//!
//! On top of the caller's properties this configures:
//!
//! - A logical id ending in `Dlq`
//! - Message retention of 14 days
//! - A queue policy denying requests that do not use TLS
//! - An alarm as soon as any message is visible on the queue
//! - Breach and recovery notifications to the deployment's alarm topic

use infra_context::ContextStore;
use serde::Deserialize;

use super::queue::{self, QueueProps};
use crate::alarm::{self, Alarm, AlarmOptions};
use crate::deployment::DeploymentContext;
use crate::merge::Merge;
use crate::stack::{ResourceRef, Stack};
use crate::Result;

/// Fourteen days, the SQS maximum
pub const DEFAULT_RETENTION_SECS: u64 = 14 * 24 * 60 * 60;

/// Wrapper options for [`create`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeadLetterQueueOptions {
    pub disable_alarm_notifications: bool,
    pub messages_visible_alarm: Option<AlarmOptions>,
}

/// A synthesised dead-letter queue
#[derive(Debug, Clone)]
pub struct DeadLetterQueue {
    pub resource: ResourceRef,
    pub props: QueueProps,
    pub messages_visible_alarm: Alarm,
}

/// Append `Dlq` unless the id already ends with it, in any case
///
/// ```
/// use infra_core::resources::dead_letter_queue::dlq_id;
///
/// assert_eq!(dlq_id("Orders"), "OrdersDlq");
/// assert_eq!(dlq_id("OrdersDLQ"), "OrdersDLQ");
/// ```
pub fn dlq_id(id: &str) -> String {
    if id.to_lowercase().ends_with("dlq") {
        id.to_string()
    } else {
        format!("{id}Dlq")
    }
}

/// Organisation defaults for every dead-letter queue
pub fn default_props() -> QueueProps {
    QueueProps {
        retention_period_secs: Some(DEFAULT_RETENTION_SECS),
        enforce_ssl: Some(true),
        ..Default::default()
    }
}

/// Add a dead-letter queue with organisation defaults and alarms to the stack
pub fn create(
    stack: &mut Stack,
    store: &ContextStore,
    id: &str,
    props: QueueProps,
    options: DeadLetterQueueOptions,
) -> Result<DeadLetterQueue> {
    let deployment = DeploymentContext::from_store(store)?;
    let props = default_props().merge(props);
    let logical_id = dlq_id(id);
    tracing::debug!(id, %logical_id, "Creating dead-letter queue");

    stack.transaction(|stack| {
        let resource = queue::add_queue(stack, &logical_id, &props)?;

        let mut messages_visible_alarm = alarm::create_alarm_with_defaults(
            &queue::metric_messages_visible(&resource),
            &logical_id,
            "ApproximateNumberOfMessagesVisible",
            format!("Messages failed to be processed from {id}"),
            AlarmOptions::defaults(1.0, 1, 1),
            options.messages_visible_alarm.as_ref(),
        )?;

        alarm::attach_alarms(
            stack,
            store,
            &deployment,
            [&mut messages_visible_alarm],
            options.disable_alarm_notifications,
        )?;

        Ok(DeadLetterQueue {
            resource,
            props,
            messages_visible_alarm,
        })
    })
}
