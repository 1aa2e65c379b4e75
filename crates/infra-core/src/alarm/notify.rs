//! Alarm notification routing
//!
//! The notification topic is configured per deployment at
//! `<customer>.<environment>.alarmNotificationsTopic`. When it is set, and
//! the caller has not disabled notifications, every alarm on a resource is
//! bound to the topic for both the breach and the recovery transition.
//! When it is not set nothing is bound and nothing fails.

use infra_context::ContextStore;
use serde_json::Value;

use super::Alarm;
use crate::Result;
use crate::deployment::DeploymentContext;
use crate::stack::Stack;

/// Setting naming the SNS topic that receives alarm notifications
pub const ALARM_TOPIC_SETTING: &str = "alarmNotificationsTopic";

/// An SNS topic that receives alarm state changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub topic: String,
}

impl NotificationTarget {
    /// The topic ARN in the stack's account and region
    pub fn arn(&self, stack: &Stack) -> String {
        stack.format_arn("sns", &self.topic, None)
    }
}

/// Look up the deployment's alarm notification topic
///
/// Returns `None` if the setting is absent or not a non-empty string.
pub fn resolve_alarm_target(
    store: &ContextStore,
    deployment: &DeploymentContext,
) -> Option<NotificationTarget> {
    deployment
        .setting(store, ALARM_TOPIC_SETTING)
        .and_then(Value::as_str)
        .filter(|topic| !topic.is_empty())
        .map(|topic| NotificationTarget {
            topic: topic.to_string(),
        })
}

/// Bind every alarm to `target` on breach and on recovery
///
/// Returns the number of alarms that were bound, which is zero when
/// `target` is `None` or `disabled` is set.
pub fn wire_notifications<'a>(
    stack: &Stack,
    alarms: impl IntoIterator<Item = &'a mut Alarm>,
    target: Option<&NotificationTarget>,
    disabled: bool,
) -> usize {
    let Some(target) = target else {
        tracing::debug!("No alarm notification topic configured - skipping");
        return 0;
    };
    if disabled {
        tracing::debug!(topic = %target.topic, "Alarm notifications disabled by caller");
        return 0;
    }

    let arn = target.arn(stack);
    let mut count = 0;
    for alarm in alarms {
        alarm.add_alarm_action(arn.clone());
        alarm.add_ok_action(arn.clone());
        count += 1;
    }
    tracing::debug!(topic = %target.topic, count, "Wired alarm notifications");
    count
}

/// Resolve the topic, wire notifications and add the alarms to the stack
pub fn attach_alarms<'a>(
    stack: &mut Stack,
    store: &ContextStore,
    deployment: &DeploymentContext,
    alarms: impl IntoIterator<Item = &'a mut Alarm>,
    disable_notifications: bool,
) -> Result<()> {
    let mut alarms: Vec<&mut Alarm> = alarms.into_iter().collect();
    let target = resolve_alarm_target(store, deployment);
    wire_notifications(
        stack,
        alarms.iter_mut().map(|a| &mut **a),
        target.as_ref(),
        disable_notifications,
    );

    for alarm in &alarms {
        stack.add_alarm(alarm)?;
    }
    Ok(())
}
