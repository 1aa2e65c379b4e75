//! In-memory synthesis target
//!
//! A `Stack` collects the resources produced by the wrappers and renders
//! them as a static resource description. It plays the part of the
//! underlying infrastructure framework: it accepts merged properties and
//! hands back references that later constructs can point at.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::alarm::Alarm;
use crate::{Error, Result};

/// Account, region and partition a stack deploys into
///
/// Unset values render as pseudo-parameter placeholders, resolved at
/// deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackEnv {
    pub account: String,
    pub region: String,
    pub partition: String,
}

impl Default for StackEnv {
    fn default() -> Self {
        Self {
            account: "${AWS::AccountId}".to_string(),
            region: "${AWS::Region}".to_string(),
            partition: "${AWS::Partition}".to_string(),
        }
    }
}

/// Kind of resource emitted into the description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Bucket,
    BucketPolicy,
    Queue,
    QueuePolicy,
    Function,
    IamPolicy,
    StateMachine,
    Table,
    Alarm,
}

impl ResourceKind {
    /// The resource type identifier in the rendered description
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Bucket => "AWS::S3::Bucket",
            ResourceKind::BucketPolicy => "AWS::S3::BucketPolicy",
            ResourceKind::Queue => "AWS::SQS::Queue",
            ResourceKind::QueuePolicy => "AWS::SQS::QueuePolicy",
            ResourceKind::Function => "AWS::Lambda::Function",
            ResourceKind::IamPolicy => "AWS::IAM::Policy",
            ResourceKind::StateMachine => "AWS::StepFunctions::StateMachine",
            ResourceKind::Table => "AWS::DynamoDB::Table",
            ResourceKind::Alarm => "AWS::CloudWatch::Alarm",
        }
    }
}

/// A resource that has been added to a stack
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub logical_id: String,
    pub kind: ResourceKind,
    pub properties: Value,
}

/// Reference to a resource in a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub logical_id: String,
    pub kind: ResourceKind,
}

impl ResourceRef {
    /// `{"Ref": id}`
    pub fn reference(&self) -> Value {
        json!({ "Ref": self.logical_id })
    }

    /// `{"Fn::GetAtt": [id, attribute]}`
    pub fn attribute(&self, attribute: &str) -> Value {
        json!({ "Fn::GetAtt": [self.logical_id, attribute] })
    }
}

/// Allow or deny
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// An IAM-style policy statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl PolicyStatement {
    /// Deny every action on `resources` unless the request uses TLS
    pub fn deny_insecure_transport(action: &str, resources: Vec<Value>) -> Self {
        Self {
            effect: Effect::Deny,
            action: vec![action.to_string()],
            resource: resources,
            principal: Some(json!({ "AWS": "*" })),
            condition: Some(json!({ "Bool": { "aws:SecureTransport": "false" } })),
        }
    }
}

/// A collection of resources synthesised together
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    env: StackEnv,
    resources: Vec<Resource>,
}

impl Stack {
    /// Create a stack with placeholder account and region
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_env(name, StackEnv::default())
    }

    /// Create a stack for a specific environment
    pub fn with_env(name: impl Into<String>, env: StackEnv) -> Self {
        Self {
            name: name.into(),
            env,
            resources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &StackEnv {
        &self.env
    }

    /// All resources in insertion order
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Look up a resource by logical id
    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    /// Resources of one kind
    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    /// Add a resource with the given properties
    ///
    /// The id is reduced to its ASCII alphanumeric characters, the same way
    /// alarm ids are derived, so `my-fn` and `myfn` name the same resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] if nothing is left of the id, or
    /// [`Error::DuplicateId`] if the logical id is already taken.
    pub fn add_resource(
        &mut self,
        id: impl Into<String>,
        kind: ResourceKind,
        properties: &impl Serialize,
    ) -> Result<ResourceRef> {
        let id = id.into();
        let logical_id = logical_id(&[&id]);
        if logical_id.is_empty() {
            return Err(Error::InvalidId {
                stack: self.name.clone(),
                id,
            });
        }
        if self.resource(&logical_id).is_some() {
            return Err(Error::DuplicateId {
                stack: self.name.clone(),
                id: logical_id,
            });
        }

        let properties = serde_json::to_value(properties)?;
        tracing::debug!(
            stack = %self.name,
            %logical_id,
            kind = kind.type_name(),
            "Adding resource"
        );
        self.resources.push(Resource {
            logical_id: logical_id.clone(),
            kind,
            properties,
        });

        Ok(ResourceRef { logical_id, kind })
    }

    /// Run `build` against the stack, removing everything it added if it fails
    ///
    /// Wrappers add a resource together with its policies and alarms inside
    /// one transaction, so a failed `create` leaves the stack as it was.
    pub fn transaction<T>(&mut self, build: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.resources.len();
        let result = build(self);
        if result.is_err() && self.resources.len() > mark {
            tracing::debug!(
                stack = %self.name,
                discarded = self.resources.len() - mark,
                "Discarding partially added resources"
            );
            self.resources.truncate(mark);
        }
        result
    }

    /// Add a fully configured alarm
    pub fn add_alarm(&mut self, alarm: &Alarm) -> Result<ResourceRef> {
        self.add_resource(alarm.logical_id.clone(), ResourceKind::Alarm, alarm)
    }

    /// Format an ARN in this stack's partition, region and account
    ///
    /// ```
    /// use infra_core::Stack;
    /// use infra_core::stack::StackEnv;
    ///
    /// let stack = Stack::with_env("Demo", StackEnv {
    ///     account: "123456789012".into(),
    ///     region: "eu-west-1".into(),
    ///     partition: "aws".into(),
    /// });
    /// assert_eq!(
    ///     stack.format_arn("sns", "alerts", None),
    ///     "arn:aws:sns:eu-west-1:123456789012:alerts"
    /// );
    /// assert_eq!(
    ///     stack.format_arn("ssm", "parameter", Some("app/key")),
    ///     "arn:aws:ssm:eu-west-1:123456789012:parameter/app/key"
    /// );
    /// ```
    pub fn format_arn(&self, service: &str, resource: &str, resource_name: Option<&str>) -> String {
        let base = format!(
            "arn:{}:{}:{}:{}:{}",
            self.env.partition, service, self.env.region, self.env.account, resource
        );
        match resource_name {
            Some(name) => format!("{base}/{}", name.trim_start_matches('/')),
            None => base,
        }
    }

    /// Render the stack as a resource description
    pub fn to_template(&self) -> Value {
        let resources: Map<String, Value> = self
            .resources
            .iter()
            .map(|r| {
                (
                    r.logical_id.clone(),
                    json!({
                        "Type": r.kind.type_name(),
                        "Properties": r.properties,
                    }),
                )
            })
            .collect();

        json!({
            "Description": self.name,
            "Resources": resources,
        })
    }
}

/// Strip characters that are not valid in a logical id
pub(crate) fn logical_id(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|p| p.chars())
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
