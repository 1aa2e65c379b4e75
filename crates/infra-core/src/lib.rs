//! Opinionated resource defaults for infra-defaults
//!
//! Each wrapper in [`resources`] merges caller properties over organisation
//! defaults, adds the resource to a [`Stack`], and attaches monitoring:
//!
//! - **Merge policy**: typed props of optional fields, caller wins per field,
//!   function environment variables merged per key
//! - **Alarms**: per-resource defaults merged with caller [`AlarmOptions`]
//! - **Notifications**: every alarm bound on breach and recovery to the
//!   topic configured at `<customer>.<environment>.alarmNotificationsTopic`
//! - **Apps**: TOML definitions synthesised into a resource description
//!
//! # Example
//!
//! ```
//! use infra_context::ContextStore;
//! use infra_core::Stack;
//! use infra_core::resources::bucket::{self, BucketProps};
//! use infra_core::resources::queue::{self, QueueOptions, QueueProps};
//! use serde_json::json;
//!
//! let store = ContextStore::from_value(json!({
//!     "CUSTOMER": "acme",
//!     "ENVIRONMENT": "prod",
//!     "acme": { "prod": { "alarmNotificationsTopic": "alerts" } }
//! })).unwrap();
//!
//! let mut stack = Stack::new("Media");
//! bucket::create(&mut stack, "Uploads", BucketProps::default()).unwrap();
//! let jobs = queue::create(
//!     &mut stack,
//!     &store,
//!     "Jobs",
//!     QueueProps::default(),
//!     QueueOptions::default(),
//! ).unwrap();
//!
//! assert_eq!(jobs.messages_not_visible_alarm.binding_count(), 2);
//! assert!(stack.resource("UploadsPolicy").is_some());
//! ```

pub mod alarm;
pub mod app;
pub mod deployment;
pub mod error;
pub mod merge;
pub mod resources;
pub mod stack;

pub use alarm::{Alarm, AlarmOptions, Metric, NotificationTarget, TreatMissingData};
pub use app::{App, ResourceDefinition};
pub use deployment::DeploymentContext;
pub use error::{Error, Result};
pub use merge::Merge;
pub use stack::{Resource, ResourceKind, ResourceRef, Stack, StackEnv};
