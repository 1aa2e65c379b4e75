//! Metric alarms with organisation defaults
//!
//! Each wrapper builds its alarms the same way: a default [`AlarmOptions`]
//! per alarm kind is merged with whatever the caller supplied, and the
//! result is turned into an [`Alarm`] on a [`Metric`] the resource exposes.
//! Notification wiring lives in [`notify`].

pub mod notify;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::merge::{Merge, impl_merge};
use crate::stack::logical_id;
use crate::{Error, Result};

pub use notify::{NotificationTarget, attach_alarms, resolve_alarm_target, wire_notifications};

/// Default metric period in seconds
pub const DEFAULT_PERIOD_SECS: u32 = 300;

/// How an alarm treats periods with no data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreatMissingData {
    Breaching,
    #[default]
    NotBreaching,
    Ignore,
    Missing,
}

/// Comparison between the statistic and the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[default]
    GreaterThanOrEqualToThreshold,
    GreaterThanThreshold,
    LessThanThreshold,
    LessThanOrEqualToThreshold,
}

/// Aggregation applied to metric datapoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    Sum,
    Average,
    Minimum,
    Maximum,
    SampleCount,
}

/// Caller-facing alarm options
///
/// The description is always generated by the wrapper and cannot be set
/// here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_periods: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datapoints_to_alarm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treat_missing_data: Option<TreatMissingData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_operator: Option<ComparisonOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_name: Option<String>,
}

impl_merge!(AlarmOptions {
    threshold,
    evaluation_periods,
    datapoints_to_alarm,
    treat_missing_data,
    comparison_operator,
    alarm_name,
});

impl AlarmOptions {
    /// The organisation's standard shape: not breaching on missing data
    pub fn defaults(threshold: f64, evaluation_periods: u32, datapoints_to_alarm: u32) -> Self {
        Self {
            threshold: Some(threshold),
            evaluation_periods: Some(evaluation_periods),
            datapoints_to_alarm: Some(datapoints_to_alarm),
            treat_missing_data: Some(TreatMissingData::NotBreaching),
            comparison_operator: None,
            alarm_name: None,
        }
    }
}

/// A metric a resource exposes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub namespace: String,
    pub metric_name: String,
    pub statistic: Statistic,
    pub dimensions: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub period_secs: u32,
}

impl Metric {
    /// A metric with the `Average` statistic and the default period
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            statistic: Statistic::Average,
            dimensions: BTreeMap::new(),
            label: None,
            period_secs: DEFAULT_PERIOD_SECS,
        }
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    pub fn with_dimension(mut self, name: impl Into<String>, value: Value) -> Self {
        self.dimensions.insert(name.into(), value);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Create an alarm on this metric
    ///
    /// `scope` is the logical id of the owning resource; the alarm's logical
    /// id is derived from it and `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteAlarm`] if `options` has no threshold or
    /// evaluation periods.
    pub fn create_alarm(
        &self,
        scope: &str,
        id: &str,
        description: impl Into<String>,
        options: AlarmOptions,
    ) -> Result<Alarm> {
        let logical_id = logical_id(&[scope, id]);
        let threshold = options.threshold.ok_or_else(|| Error::IncompleteAlarm {
            id: logical_id.clone(),
            field: "threshold",
        })?;
        let evaluation_periods = options.evaluation_periods.ok_or_else(|| Error::IncompleteAlarm {
            id: logical_id.clone(),
            field: "evaluation_periods",
        })?;

        Ok(Alarm {
            logical_id,
            alarm_name: options.alarm_name,
            description: description.into(),
            metric: self.clone(),
            threshold,
            evaluation_periods,
            datapoints_to_alarm: options.datapoints_to_alarm,
            comparison_operator: options.comparison_operator.unwrap_or_default(),
            treat_missing_data: options.treat_missing_data.unwrap_or_default(),
            alarm_actions: Vec::new(),
            ok_actions: Vec::new(),
        })
    }
}

/// A fully resolved alarm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alarm {
    #[serde(skip)]
    pub logical_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_name: Option<String>,
    pub description: String,
    pub metric: Metric,
    pub threshold: f64,
    pub evaluation_periods: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datapoints_to_alarm: Option<u32>,
    pub comparison_operator: ComparisonOperator,
    pub treat_missing_data: TreatMissingData,
    /// Targets notified when the alarm enters the ALARM state
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alarm_actions: Vec<String>,
    /// Targets notified when the alarm returns to OK
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ok_actions: Vec<String>,
}

impl Alarm {
    pub fn add_alarm_action(&mut self, target_arn: impl Into<String>) {
        self.alarm_actions.push(target_arn.into());
    }

    pub fn add_ok_action(&mut self, target_arn: impl Into<String>) {
        self.ok_actions.push(target_arn.into());
    }

    /// Number of notification bindings on both transitions
    pub fn binding_count(&self) -> usize {
        self.alarm_actions.len() + self.ok_actions.len()
    }
}

/// Merge caller options over `defaults` and create the alarm
pub fn create_alarm_with_defaults(
    metric: &Metric,
    scope: &str,
    id: &str,
    description: impl Into<String>,
    defaults: AlarmOptions,
    overrides: Option<&AlarmOptions>,
) -> Result<Alarm> {
    let options = match overrides {
        Some(overrides) => defaults.merge(overrides.clone()),
        None => defaults,
    };
    metric.create_alarm(scope, id, description, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric() -> Metric {
        Metric::new("AWS/SQS", "ApproximateNumberOfMessagesVisible")
            .with_statistic(Statistic::Maximum)
    }

    #[test]
    fn create_alarm_applies_standard_defaults() {
        let alarm = create_alarm_with_defaults(
            &metric(),
            "Jobs",
            "Visible",
            "Messages visible",
            AlarmOptions::defaults(1.0, 1, 1),
            None,
        )
        .unwrap();

        assert_eq!(alarm.logical_id, "JobsVisible");
        assert_eq!(alarm.threshold, 1.0);
        assert_eq!(alarm.datapoints_to_alarm, Some(1));
        assert_eq!(alarm.comparison_operator, ComparisonOperator::GreaterThanOrEqualToThreshold);
        assert_eq!(alarm.treat_missing_data, TreatMissingData::NotBreaching);
        assert_eq!(alarm.metric.period_secs, 300);
    }

    #[test]
    fn caller_options_override_defaults_per_field() {
        let overrides = AlarmOptions {
            threshold: Some(10.0),
            treat_missing_data: Some(TreatMissingData::Missing),
            ..Default::default()
        };
        let alarm = create_alarm_with_defaults(
            &metric(),
            "Jobs",
            "Visible",
            "d",
            AlarmOptions::defaults(1.0, 6, 4),
            Some(&overrides),
        )
        .unwrap();

        assert_eq!(alarm.threshold, 10.0);
        assert_eq!(alarm.evaluation_periods, 6);
        assert_eq!(alarm.datapoints_to_alarm, Some(4));
        assert_eq!(alarm.treat_missing_data, TreatMissingData::Missing);
    }

    #[test]
    fn alarm_without_threshold_is_rejected() {
        let err = metric()
            .create_alarm("Jobs", "Visible", "d", AlarmOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::IncompleteAlarm { field: "threshold", .. }));
    }

    #[test]
    fn treat_missing_data_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(TreatMissingData::NotBreaching).unwrap(),
            serde_json::json!("notBreaching")
        );
    }
}
