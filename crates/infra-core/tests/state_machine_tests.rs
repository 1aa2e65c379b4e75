//! Tests for the state machine wrapper

use infra_core::alarm::AlarmOptions;
use infra_core::resources::state_machine::{
    self, StateMachineOptions, StateMachineProps, StateMachineType,
};
use infra_core::{Error, ResourceKind, Stack};
use infra_test_utils::context::{context_without_topic, sample_context};
use pretty_assertions::assert_eq;
use serde_json::json;

mod state_machine_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props() -> StateMachineProps {
        StateMachineProps {
            definition: Some(json!({
                "StartAt": "Done",
                "States": {"Done": {"Type": "Succeed"}}
            })),
            ..Default::default()
        }
    }

    #[test]
    fn test_state_machine_defaults() {
        let mut stack = Stack::new("Workflows");
        let sm = state_machine::create(
            &mut stack,
            &sample_context(),
            "Checkout",
            props(),
            StateMachineOptions::default(),
        )
        .unwrap();

        assert_eq!(sm.props.state_machine_type, Some(StateMachineType::Express));
        assert_eq!(sm.props.timeout_secs, Some(300));
        assert_eq!(sm.props.tracing_enabled, Some(true));

        let template = stack.to_template();
        assert_eq!(
            template["Resources"]["Checkout"]["Type"],
            "AWS::StepFunctions::StateMachine"
        );
        assert_eq!(
            template["Resources"]["Checkout"]["Properties"]["state_machine_type"],
            "EXPRESS"
        );
    }

    #[test]
    fn test_state_machine_alarms() {
        let mut stack = Stack::new("Workflows");
        let sm = state_machine::create(
            &mut stack,
            &sample_context(),
            "Checkout",
            props(),
            StateMachineOptions::default(),
        )
        .unwrap();

        assert_eq!(sm.failed_alarm.logical_id, "CheckoutFailedExecutions");
        assert_eq!(sm.failed_alarm.metric.metric_name, "ExecutionsFailed");
        assert_eq!(sm.failed_alarm.description, "Failed executions reported by Checkout");
        assert_eq!(sm.timed_out_alarm.logical_id, "CheckoutTimedOutExecutions");
        assert_eq!(sm.timed_out_alarm.metric.metric_name, "ExecutionsTimedOut");

        for alarm in [&sm.failed_alarm, &sm.timed_out_alarm] {
            assert_eq!(alarm.threshold, 1.0);
            assert_eq!(alarm.metric.namespace, "AWS/States");
            assert_eq!(alarm.metric.dimensions["StateMachineArn"], json!({"Ref": "Checkout"}));
            assert_eq!(alarm.binding_count(), 2);
        }
        assert_eq!(stack.resources_of(ResourceKind::Alarm).count(), 2);
    }

    #[test]
    fn test_state_machine_alarm_overrides() {
        let mut stack = Stack::new("Workflows");
        let sm = state_machine::create(
            &mut stack,
            &context_without_topic(),
            "Checkout",
            StateMachineProps {
                state_machine_type: Some(StateMachineType::Standard),
                ..props()
            },
            StateMachineOptions {
                timed_out_executions_alarm: Some(AlarmOptions {
                    threshold: Some(3.0),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(sm.props.state_machine_type, Some(StateMachineType::Standard));
        assert_eq!(sm.timed_out_alarm.threshold, 3.0);
        assert_eq!(sm.failed_alarm.threshold, 1.0);
        assert_eq!(sm.failed_alarm.binding_count(), 0);
    }

    #[test]
    fn test_state_machine_notifications_can_be_disabled() {
        let mut stack = Stack::new("Workflows");
        let sm = state_machine::create(
            &mut stack,
            &sample_context(),
            "Checkout",
            props(),
            StateMachineOptions {
                disable_alarm_notifications: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(sm.failed_alarm.binding_count(), 0);
        assert_eq!(sm.timed_out_alarm.binding_count(), 0);
        assert_eq!(stack.resources_of(ResourceKind::Alarm).count(), 2);
    }

    #[test]
    fn test_state_machine_requires_definition() {
        let mut stack = Stack::new("Workflows");
        let err = state_machine::create(
            &mut stack,
            &sample_context(),
            "Checkout",
            StateMachineProps::default(),
            StateMachineOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidProps { .. }));
    }
}
