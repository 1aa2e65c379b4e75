//! Tests for the queue and dead-letter queue wrappers

use infra_core::alarm::{AlarmOptions, Statistic, TreatMissingData};
use infra_core::resources::dead_letter_queue::{self, DeadLetterQueueOptions};
use infra_core::resources::queue::{self, DeadLetterTarget, QueueOptions, QueueProps};
use infra_core::{Error, ResourceKind, Stack};
use infra_test_utils::context::{context_without_topic, environment_only, sample_context};
use pretty_assertions::assert_eq;
use serde_json::json;

const TOPIC_ARN: &str =
    "arn:${AWS::Partition}:sns:${AWS::Region}:${AWS::AccountId}:exampleSnsTopic";

mod queue_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_queue_defaults_and_alarm() {
        let mut stack = Stack::new("Messaging");
        let queue = queue::create(
            &mut stack,
            &sample_context(),
            "Jobs",
            QueueProps::default(),
            QueueOptions::default(),
        )
        .unwrap();

        assert_eq!(queue.props.enforce_ssl, Some(true));

        let alarm = &queue.messages_not_visible_alarm;
        assert_eq!(alarm.logical_id, "JobsApproximateNumberOfMessagesNotVisible");
        assert_eq!(alarm.threshold, queue::MESSAGES_NOT_VISIBLE_THRESHOLD);
        assert_eq!(alarm.evaluation_periods, 1);
        assert_eq!(alarm.datapoints_to_alarm, Some(1));
        assert_eq!(alarm.treat_missing_data, TreatMissingData::NotBreaching);
        assert_eq!(alarm.metric.statistic, Statistic::Maximum);
        assert_eq!(
            alarm.metric.dimensions["QueueName"],
            json!({"Fn::GetAtt": ["Jobs", "QueueName"]})
        );
        assert_eq!(alarm.alarm_actions, vec![TOPIC_ARN]);
        assert_eq!(alarm.ok_actions, vec![TOPIC_ARN]);

        assert!(stack.resource("JobsPolicy").is_some());
        assert_eq!(stack.resources_of(ResourceKind::Alarm).count(), 1);
    }

    #[test]
    fn test_queue_alarm_options_override_defaults() {
        let mut stack = Stack::new("Messaging");
        let queue = queue::create(
            &mut stack,
            &sample_context(),
            "Jobs",
            QueueProps::default(),
            QueueOptions {
                messages_not_visible_alarm: Some(AlarmOptions {
                    threshold: Some(5000.0),
                    evaluation_periods: Some(3),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .unwrap();

        let alarm = &queue.messages_not_visible_alarm;
        assert_eq!(alarm.threshold, 5000.0);
        assert_eq!(alarm.evaluation_periods, 3);
        assert_eq!(alarm.datapoints_to_alarm, Some(1));
    }

    #[test]
    fn test_queue_redrive_target_is_kept() {
        let mut stack = Stack::new("Messaging");
        let queue = queue::create(
            &mut stack,
            &sample_context(),
            "Jobs",
            QueueProps {
                dead_letter_queue: Some(DeadLetterTarget {
                    queue: "JobsDlq".into(),
                    max_receive_count: 3,
                }),
                ..Default::default()
            },
            QueueOptions::default(),
        )
        .unwrap();

        assert_eq!(queue.props.dead_letter_queue.unwrap().max_receive_count, 3);
        let props = &stack.resource("Jobs").unwrap().properties;
        assert_eq!(props["dead_letter_queue"]["queue"], "JobsDlq");
    }

    #[test]
    fn test_queue_notifications_can_be_disabled() {
        let mut stack = Stack::new("Messaging");
        let queue = queue::create(
            &mut stack,
            &sample_context(),
            "Jobs",
            QueueProps::default(),
            QueueOptions {
                disable_alarm_notifications: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(queue.messages_not_visible_alarm.binding_count(), 0);
        let template = stack.to_template();
        let props =
            &template["Resources"]["JobsApproximateNumberOfMessagesNotVisible"]["Properties"];
        assert!(props.get("alarm_actions").is_none());
        assert!(props.get("ok_actions").is_none());
    }

    #[test]
    fn test_queue_requires_customer() {
        let mut stack = Stack::new("Messaging");
        let err = queue::create(
            &mut stack,
            &environment_only("prod"),
            "Jobs",
            QueueProps::default(),
            QueueOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::MissingContext { .. }));
        assert_eq!(err.to_string(), "Context variables CUSTOMER were not defined");
        assert!(stack.resources().is_empty());
    }
}

mod dead_letter_queue_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dlq_suffix_and_retention() {
        let mut stack = Stack::new("Messaging");
        let dlq = dead_letter_queue::create(
            &mut stack,
            &sample_context(),
            "Orders",
            QueueProps::default(),
            DeadLetterQueueOptions::default(),
        )
        .unwrap();

        assert_eq!(dlq.resource.logical_id, "OrdersDlq");
        assert_eq!(dlq.props.retention_period_secs, Some(1_209_600));
        assert_eq!(dlq.props.enforce_ssl, Some(true));
        assert!(stack.resource("OrdersDlqPolicy").is_some());

        let alarm = &dlq.messages_visible_alarm;
        assert_eq!(alarm.logical_id, "OrdersDlqApproximateNumberOfMessagesVisible");
        assert_eq!(alarm.threshold, 1.0);
        assert_eq!(alarm.description, "Messages failed to be processed from Orders");
        assert_eq!(alarm.binding_count(), 2);
    }

    #[test]
    fn test_dlq_id_already_suffixed() {
        let mut stack = Stack::new("Messaging");
        let dlq = dead_letter_queue::create(
            &mut stack,
            &sample_context(),
            "OrdersDLQ",
            QueueProps::default(),
            DeadLetterQueueOptions::default(),
        )
        .unwrap();

        assert_eq!(dlq.resource.logical_id, "OrdersDLQ");
    }

    #[test]
    fn test_dlq_caller_retention_wins() {
        let mut stack = Stack::new("Messaging");
        let dlq = dead_letter_queue::create(
            &mut stack,
            &sample_context(),
            "Orders",
            QueueProps {
                retention_period_secs: Some(3600),
                ..Default::default()
            },
            DeadLetterQueueOptions::default(),
        )
        .unwrap();

        assert_eq!(dlq.props.retention_period_secs, Some(3600));
    }

    #[test]
    fn test_dlq_without_topic_has_no_bindings() {
        let mut stack = Stack::new("Messaging");
        let dlq = dead_letter_queue::create(
            &mut stack,
            &context_without_topic(),
            "Orders",
            QueueProps::default(),
            DeadLetterQueueOptions::default(),
        )
        .unwrap();

        assert_eq!(dlq.messages_visible_alarm.binding_count(), 0);
    }

    #[test]
    fn test_dlq_notifications_can_be_disabled() {
        let mut stack = Stack::new("Messaging");
        let dlq = dead_letter_queue::create(
            &mut stack,
            &sample_context(),
            "Orders",
            QueueProps::default(),
            DeadLetterQueueOptions {
                disable_alarm_notifications: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(dlq.messages_visible_alarm.binding_count(), 0);
    }
}
