//! Property tests for the defaults-merge policy

use infra_core::Merge;
use infra_core::alarm::{AlarmOptions, TreatMissingData};
use infra_core::merge::merge_environment;
use infra_core::resources::function::FunctionProps;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_alarm_options() -> impl Strategy<Value = AlarmOptions> {
    (
        proptest::option::of(0.0f64..1e6),
        proptest::option::of(1u32..10),
        proptest::option::of(1u32..10),
        proptest::option::of(prop_oneof![
            Just(TreatMissingData::Breaching),
            Just(TreatMissingData::NotBreaching),
            Just(TreatMissingData::Ignore),
            Just(TreatMissingData::Missing),
        ]),
        proptest::option::of("[a-z]{1,8}"),
    )
        .prop_map(
            |(threshold, evaluation_periods, datapoints_to_alarm, treat_missing_data, alarm_name)| {
                AlarmOptions {
                    threshold,
                    evaluation_periods,
                    datapoints_to_alarm,
                    treat_missing_data,
                    comparison_operator: None,
                    alarm_name,
                }
            },
        )
}

fn arb_env() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[A-Z_]{1,6}", "[a-z0-9]{0,6}", 0..6)
}

proptest! {
    #[test]
    fn merge_with_empty_overrides_is_identity(defaults in arb_alarm_options()) {
        prop_assert_eq!(defaults.clone().merge(AlarmOptions::default()), defaults);
    }

    #[test]
    fn set_override_fields_always_win(
        defaults in arb_alarm_options(),
        overrides in arb_alarm_options(),
    ) {
        let merged = defaults.clone().merge(overrides.clone());

        prop_assert_eq!(merged.threshold, overrides.threshold.or(defaults.threshold));
        prop_assert_eq!(
            merged.evaluation_periods,
            overrides.evaluation_periods.or(defaults.evaluation_periods)
        );
        prop_assert_eq!(merged.alarm_name, overrides.alarm_name.or(defaults.alarm_name));
    }

    #[test]
    fn environment_merge_keeps_every_key(defaults in arb_env(), overrides in arb_env()) {
        let merged = merge_environment(defaults.clone(), overrides.clone());

        for (key, value) in &overrides {
            prop_assert_eq!(merged.get(key), Some(value));
        }
        for (key, value) in &defaults {
            if !overrides.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
        prop_assert!(merged.len() <= defaults.len() + overrides.len());
    }

    #[test]
    fn function_props_environment_never_loses_defaults(
        defaults in arb_env(),
        overrides in arb_env(),
    ) {
        let merged = FunctionProps { environment: defaults.clone(), ..Default::default() }
            .merge(FunctionProps { environment: overrides.clone(), ..Default::default() });

        prop_assert!(defaults.keys().all(|k| merged.environment.contains_key(k)));
        prop_assert!(overrides.keys().all(|k| merged.environment.contains_key(k)));
    }
}
