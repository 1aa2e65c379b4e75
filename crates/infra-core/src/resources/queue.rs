//! Message queue with organisation defaults
//!
//! On top of the caller's properties this configures:
//!
//! - A queue policy denying requests that do not use TLS
//! - An alarm when the number of in-flight messages approaches the SQS
//!   limit of 120,000
//! - Breach and recovery notifications to the deployment's alarm topic

use infra_context::ContextStore;
use serde::{Deserialize, Serialize};

use crate::alarm::{self, Alarm, AlarmOptions, Metric, Statistic};
use crate::deployment::DeploymentContext;
use crate::merge::{Merge, impl_merge};
use crate::stack::{PolicyStatement, ResourceKind, ResourceRef, Stack};
use crate::Result;

/// In-flight message threshold, just under the SQS maximum
pub const MESSAGES_NOT_VISIBLE_THRESHOLD: f64 = 110_000.0;

/// Server-side encryption setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEncryption {
    Unencrypted,
    SqsManaged,
    KmsManaged,
}

/// Redrive target for messages that repeatedly fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterTarget {
    /// Logical id of the dead-letter queue in the same stack
    pub queue: String,
    pub max_receive_count: u32,
}

/// Queue construction properties, shared by queues and dead-letter queues
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<QueueEncryption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_period_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_delay_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_letter_queue: Option<DeadLetterTarget>,
}

impl_merge!(QueueProps {
    queue_name,
    fifo,
    enforce_ssl,
    encryption,
    retention_period_secs,
    visibility_timeout_secs,
    delivery_delay_secs,
    dead_letter_queue,
});

/// Wrapper options for [`create`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueOptions {
    pub disable_alarm_notifications: bool,
    pub messages_not_visible_alarm: Option<AlarmOptions>,
}

/// A synthesised queue
#[derive(Debug, Clone)]
pub struct Queue {
    pub resource: ResourceRef,
    pub props: QueueProps,
    pub messages_not_visible_alarm: Alarm,
}

/// Approximate number of messages in flight
pub fn metric_messages_not_visible(resource: &ResourceRef) -> Metric {
    queue_metric(resource, "ApproximateNumberOfMessagesNotVisible")
}

/// Approximate number of messages available for retrieval
pub fn metric_messages_visible(resource: &ResourceRef) -> Metric {
    queue_metric(resource, "ApproximateNumberOfMessagesVisible")
}

fn queue_metric(resource: &ResourceRef, name: &str) -> Metric {
    Metric::new("AWS/SQS", name)
        .with_statistic(Statistic::Maximum)
        .with_dimension("QueueName", resource.attribute("QueueName"))
}

/// Add the queue resource and, when TLS is enforced, its policy
pub(crate) fn add_queue(stack: &mut Stack, id: &str, props: &QueueProps) -> Result<ResourceRef> {
    let resource = stack.add_resource(id, ResourceKind::Queue, props)?;

    if props.enforce_ssl.unwrap_or(false) {
        let statement =
            PolicyStatement::deny_insecure_transport("sqs:*", vec![resource.attribute("Arn")]);
        stack.add_resource(
            format!("{id}Policy"),
            ResourceKind::QueuePolicy,
            &serde_json::json!({
                "queues": [resource.reference()],
                "statements": [statement],
            }),
        )?;
    }

    Ok(resource)
}

/// Organisation defaults for every queue
pub fn default_props() -> QueueProps {
    QueueProps {
        enforce_ssl: Some(true),
        ..Default::default()
    }
}

/// Add a queue with organisation defaults and alarms to the stack
pub fn create(
    stack: &mut Stack,
    store: &ContextStore,
    id: &str,
    props: QueueProps,
    options: QueueOptions,
) -> Result<Queue> {
    let deployment = DeploymentContext::from_store(store)?;
    let props = default_props().merge(props);
    tracing::debug!(id, environment = %deployment.environment, "Creating queue");

    stack.transaction(|stack| {
        let resource = add_queue(stack, id, &props)?;

        let mut messages_not_visible_alarm = alarm::create_alarm_with_defaults(
            &metric_messages_not_visible(&resource),
            id,
            "ApproximateNumberOfMessagesNotVisible",
            format!("In-flight messages close to maximum for {id}"),
            AlarmOptions::defaults(MESSAGES_NOT_VISIBLE_THRESHOLD, 1, 1),
            options.messages_not_visible_alarm.as_ref(),
        )?;

        alarm::attach_alarms(
            stack,
            store,
            &deployment,
            [&mut messages_not_visible_alarm],
            options.disable_alarm_notifications,
        )?;

        Ok(Queue {
            resource,
            props,
            messages_not_visible_alarm,
        })
    })
}
