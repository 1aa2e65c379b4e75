//! Declarative app definitions
//!
//! An app is a TOML file naming one stack and the resources in it:
//!
//! ```toml
//! [stack]
//! name = "Media"
//!
//! [[resources]]
//! type = "bucket"
//! id = "Uploads"
//!
//! [[resources]]
//! type = "queue"
//! id = "Jobs"
//! props = { visibility_timeout_secs = 60 }
//! options = { disable_alarm_notifications = true }
//! ```
//!
//! Resources are created in file order, so a queue can name a dead-letter
//! queue defined above it.

use infra_context::ContextStore;
use serde::Deserialize;

use crate::Result;
use crate::resources::bucket::{self, BucketProps};
use crate::resources::dead_letter_queue::{self, DeadLetterQueueOptions};
use crate::resources::function::{self, FunctionOptions, FunctionProps};
use crate::resources::nodejs_function::{self, NodejsFunctionProps};
use crate::resources::queue::{self, QueueOptions, QueueProps};
use crate::resources::state_machine::{self, StateMachineOptions, StateMachineProps};
use crate::resources::table::{self, TableProps};
use crate::stack::{Stack, StackEnv};

/// `[stack]` table
#[derive(Debug, Clone, Deserialize)]
pub struct StackDefinition {
    pub name: String,
    pub account: Option<String>,
    pub region: Option<String>,
    pub partition: Option<String>,
}

impl StackDefinition {
    fn env(&self) -> StackEnv {
        let defaults = StackEnv::default();
        StackEnv {
            account: self.account.clone().unwrap_or(defaults.account),
            region: self.region.clone().unwrap_or(defaults.region),
            partition: self.partition.clone().unwrap_or(defaults.partition),
        }
    }
}

/// One `[[resources]]` entry, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceDefinition {
    Bucket {
        id: String,
        #[serde(default)]
        props: BucketProps,
    },
    Queue {
        id: String,
        #[serde(default)]
        props: QueueProps,
        #[serde(default)]
        options: QueueOptions,
    },
    DeadLetterQueue {
        id: String,
        #[serde(default)]
        props: QueueProps,
        #[serde(default)]
        options: DeadLetterQueueOptions,
    },
    Function {
        id: String,
        #[serde(default)]
        props: FunctionProps,
        #[serde(default)]
        options: FunctionOptions,
    },
    NodejsFunction {
        id: String,
        #[serde(default)]
        props: NodejsFunctionProps,
        #[serde(default)]
        options: FunctionOptions,
    },
    StateMachine {
        id: String,
        #[serde(default)]
        props: StateMachineProps,
        #[serde(default)]
        options: StateMachineOptions,
    },
    Table {
        id: String,
        #[serde(default)]
        props: TableProps,
    },
}

impl ResourceDefinition {
    pub fn id(&self) -> &str {
        match self {
            Self::Bucket { id, .. }
            | Self::Queue { id, .. }
            | Self::DeadLetterQueue { id, .. }
            | Self::Function { id, .. }
            | Self::NodejsFunction { id, .. }
            | Self::StateMachine { id, .. }
            | Self::Table { id, .. } => id,
        }
    }

    /// Create this resource in `stack`
    pub fn create(&self, stack: &mut Stack, store: &ContextStore) -> Result<()> {
        match self.clone() {
            Self::Bucket { id, props } => {
                bucket::create(stack, &id, props)?;
            }
            Self::Queue { id, props, options } => {
                queue::create(stack, store, &id, props, options)?;
            }
            Self::DeadLetterQueue { id, props, options } => {
                dead_letter_queue::create(stack, store, &id, props, options)?;
            }
            Self::Function { id, props, options } => {
                function::create(stack, store, &id, props, options)?;
            }
            Self::NodejsFunction { id, props, options } => {
                nodejs_function::create(stack, store, &id, props, options)?;
            }
            Self::StateMachine { id, props, options } => {
                state_machine::create(stack, store, &id, props, options)?;
            }
            Self::Table { id, props } => {
                table::create(stack, store, &id, props)?;
            }
        }
        Ok(())
    }
}

/// A parsed app definition
#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub stack: StackDefinition,
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

impl App {
    /// Parse an app definition from TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Synthesise every resource into a new stack
    ///
    /// Stops at the first resource that fails.
    pub fn synth(&self, store: &ContextStore) -> Result<Stack> {
        let mut stack = Stack::with_env(self.stack.name.clone(), self.stack.env());
        tracing::debug!(
            stack = %self.stack.name,
            resources = self.resources.len(),
            "Synthesising app"
        );

        for resource in &self.resources {
            resource.create(&mut stack, store)?;
        }

        Ok(stack)
    }
}
