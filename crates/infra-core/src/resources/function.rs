//! Serverless function with organisation defaults
//!
//! On top of the caller's properties this configures:
//!
//! - Description `{id}-{environment}`
//! - Node.js 18 runtime on arm64
//! - Six months of log retention
//! - Active X-Ray tracing
//! - `ENVIRONMENT` and `LOG_LEVEL` environment variables, the latter read
//!   from `<customer>.<environment>.logLevel` (default `debug`)
//! - Alarms on errors, throttling, and durations above 75% of the timeout
//! - A memory utilization alarm when Lambda Insights is enabled
//! - Breach and recovery notifications to the deployment's alarm topic
//! - Optional read access to SSM parameters

use infra_context::ContextStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::alarm::{self, Alarm, AlarmOptions, Metric, Statistic};
use crate::deployment::DeploymentContext;
use crate::merge::{Merge, impl_merge};
use crate::stack::{Effect, PolicyStatement, ResourceKind, ResourceRef, Stack};
use crate::{Error, Result};

/// Default runtime identifier
pub const NODEJS_18_X: &str = "nodejs18.x";

/// Timeout assumed when none is configured, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Log retention applied by default
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 180;

/// Share of the timeout at which the duration alarm fires
pub const DURATION_ALARM_RATIO: f64 = 0.75;

/// Memory utilization percentage at which the insights alarm fires
pub const MEMORY_UTILIZATION_THRESHOLD: f64 = 75.0;

/// SSM actions granted for each configured parameter path
pub const SSM_READ_ACTIONS: [&str; 3] = [
    "ssm:GetParameter",
    "ssm:GetParameters",
    "ssm:GetParametersByPath",
];

/// Instruction set architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    Arm64,
    X86_64,
}

/// X-Ray tracing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tracing {
    Active,
    PassThrough,
    Disabled,
}

/// Function construction properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Path to the code asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing: Option<Tracing>,
    /// Lambda Insights extension version; enables the memory alarm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_concurrent_executions: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl_merge!(FunctionProps {
    function_name,
    description,
    runtime,
    architecture,
    handler,
    code,
    memory_size,
    timeout_secs,
    log_retention_days,
    tracing,
    insights_version,
    reserved_concurrent_executions,
} maps {
    environment,
});

impl FunctionProps {
    /// The merged timeout, or [`DEFAULT_TIMEOUT_SECS`]
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

/// Wrapper options shared by [`create`] and the Node.js variant
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FunctionOptions {
    pub errors_alarm: Option<AlarmOptions>,
    pub throttles_alarm: Option<AlarmOptions>,
    pub duration_alarm: Option<AlarmOptions>,
    pub memory_utilization_alarm: Option<AlarmOptions>,
    pub disable_alarm_notifications: bool,
    /// SSM parameter paths the function may read
    pub ssm_parameter_paths: Vec<String>,
}

/// The alarms every function gets
#[derive(Debug, Clone)]
pub struct FunctionAlarms {
    pub errors: Alarm,
    pub duration: Alarm,
    pub throttles: Alarm,
    pub memory_utilization: Option<Alarm>,
}

impl FunctionAlarms {
    /// All alarms, in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Alarm> {
        [&self.errors, &self.duration, &self.throttles]
            .into_iter()
            .chain(self.memory_utilization.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Alarm> {
        [&mut self.errors, &mut self.duration, &mut self.throttles]
            .into_iter()
            .chain(self.memory_utilization.as_mut())
    }
}

/// A synthesised function
#[derive(Debug, Clone)]
pub struct Function {
    pub resource: ResourceRef,
    pub props: FunctionProps,
    pub alarms: FunctionAlarms,
    pub role_policy: Option<ResourceRef>,
}

/// Organisation defaults for a function in `deployment`
pub fn default_props(id: &str, deployment: &DeploymentContext, log_level: &str) -> FunctionProps {
    let environment = BTreeMap::from([
        ("ENVIRONMENT".to_string(), deployment.environment.clone()),
        ("LOG_LEVEL".to_string(), log_level.to_string()),
    ]);

    FunctionProps {
        description: Some(format!("{id}-{}", deployment.environment)),
        runtime: Some(NODEJS_18_X.to_string()),
        architecture: Some(Architecture::Arm64),
        log_retention_days: Some(DEFAULT_LOG_RETENTION_DAYS),
        tracing: Some(Tracing::Active),
        environment,
        ..Default::default()
    }
}

/// Invocation errors
pub fn metric_errors(resource: &ResourceRef, statistic: Statistic) -> Metric {
    lambda_metric(resource, "Errors").with_statistic(statistic)
}

/// Invocation duration in milliseconds
pub fn metric_duration(resource: &ResourceRef) -> Metric {
    lambda_metric(resource, "Duration").with_statistic(Statistic::Maximum)
}

/// Throttled invocations
pub fn metric_throttles(resource: &ResourceRef) -> Metric {
    lambda_metric(resource, "Throttles").with_statistic(Statistic::Maximum)
}

/// Memory utilization reported by Lambda Insights
pub fn metric_memory_utilization(resource: &ResourceRef) -> Metric {
    Metric::new("LambdaInsights", "memory_utilization")
        .with_statistic(Statistic::Maximum)
        .with_label("Memory Utilization Percentage")
        .with_dimension("function_name", resource.reference())
}

fn lambda_metric(resource: &ResourceRef, name: &str) -> Metric {
    Metric::new("AWS/Lambda", name).with_dimension("FunctionName", resource.reference())
}

/// Build the function's alarms from the merged properties
///
/// The duration threshold is derived from the merged timeout so that a
/// caller-supplied timeout moves the default threshold with it.
pub(crate) fn build_alarms(
    resource: &ResourceRef,
    id: &str,
    props: &FunctionProps,
    options: &FunctionOptions,
    errors_statistic: Statistic,
) -> Result<FunctionAlarms> {
    let scope = resource.logical_id.as_str();
    let timeout_ms = props.effective_timeout_secs() as f64 * 1000.0;

    let errors = alarm::create_alarm_with_defaults(
        &metric_errors(resource, errors_statistic),
        scope,
        "Errors",
        format!("Lambda errors reported by {id}"),
        AlarmOptions::defaults(1.0, 1, 1),
        options.errors_alarm.as_ref(),
    )?;

    let duration = alarm::create_alarm_with_defaults(
        &metric_duration(resource),
        scope,
        "Duration",
        format!("Lambda invocations close to reaching max timeout for {id}"),
        AlarmOptions::defaults(timeout_ms * DURATION_ALARM_RATIO, 1, 1),
        options.duration_alarm.as_ref(),
    )?;

    let throttles = alarm::create_alarm_with_defaults(
        &metric_throttles(resource),
        scope,
        "Throttles",
        format!("Lambda invocations consistently being throttled for {id}"),
        AlarmOptions::defaults(1.0, 6, 4),
        options.throttles_alarm.as_ref(),
    )?;

    let memory_utilization = match props.insights_version {
        Some(_) => Some(alarm::create_alarm_with_defaults(
            &metric_memory_utilization(resource),
            scope,
            "MemoryUtilization",
            format!("Lambda memory utilization high for {id}"),
            AlarmOptions::defaults(MEMORY_UTILIZATION_THRESHOLD, 1, 1),
            options.memory_utilization_alarm.as_ref(),
        )?),
        None => None,
    };

    Ok(FunctionAlarms {
        errors,
        duration,
        throttles,
        memory_utilization,
    })
}

/// Policy statement granting read access to SSM parameters
pub fn ssm_read_statement(stack: &Stack, paths: &[String]) -> PolicyStatement {
    PolicyStatement {
        effect: Effect::Allow,
        action: SSM_READ_ACTIONS.iter().map(|a| a.to_string()).collect(),
        resource: paths
            .iter()
            .map(|path| stack.format_arn("ssm", "parameter", Some(path)).into())
            .collect(),
        principal: None,
        condition: None,
    }
}

/// Shared tail of function creation: add the resource, alarms and policy
#[allow(clippy::too_many_arguments)]
pub(crate) fn synthesize(
    stack: &mut Stack,
    store: &ContextStore,
    deployment: &DeploymentContext,
    id: &str,
    props: FunctionProps,
    properties: &impl Serialize,
    options: &FunctionOptions,
    errors_statistic: Statistic,
) -> Result<Function> {
    stack.transaction(|stack| {
        let resource = stack.add_resource(id, ResourceKind::Function, properties)?;

        let mut alarms = build_alarms(&resource, id, &props, options, errors_statistic)?;
        alarm::attach_alarms(
            stack,
            store,
            deployment,
            alarms.iter_mut(),
            options.disable_alarm_notifications,
        )?;

        let role_policy = if options.ssm_parameter_paths.is_empty() {
            None
        } else {
            let statement = ssm_read_statement(stack, &options.ssm_parameter_paths);
            let policy = stack.add_resource(
                format!("{id}ServiceRoleDefaultPolicy"),
                ResourceKind::IamPolicy,
                &serde_json::json!({
                    "role": resource.attribute("Role"),
                    "statements": [statement],
                }),
            )?;
            Some(policy)
        };

        Ok(Function {
            resource,
            props,
            alarms,
            role_policy,
        })
    })
}

/// Add a function with organisation defaults and alarms to the stack
///
/// # Errors
///
/// Fails if `CUSTOMER` or `ENVIRONMENT` is missing from the context, or if
/// the merged properties have no `handler` or `code`.
pub fn create(
    stack: &mut Stack,
    store: &ContextStore,
    id: &str,
    props: FunctionProps,
    options: FunctionOptions,
) -> Result<Function> {
    let deployment = DeploymentContext::from_store(store)?;
    let log_level = deployment.log_level(store);
    let props = default_props(id, &deployment, &log_level).merge(props);
    tracing::debug!(
        id,
        runtime = ?props.runtime,
        timeout = props.effective_timeout_secs(),
        "Creating function"
    );

    if props.handler.is_none() {
        return Err(Error::invalid_props("function", id, "handler is required"));
    }
    if props.code.is_none() {
        return Err(Error::invalid_props("function", id, "code is required"));
    }

    synthesize(
        stack,
        store,
        &deployment,
        id,
        props.clone(),
        &props,
        &options,
        Statistic::Maximum,
    )
}
