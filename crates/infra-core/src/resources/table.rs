//! Key-value table with organisation defaults
//!
//! Point-in-time recovery is enabled by default in the `prod` environment
//! only. Tables need `ENVIRONMENT` but not `CUSTOMER`.

use infra_context::ContextStore;
use serde::{Deserialize, Serialize};

use crate::deployment::require_environment;
use crate::merge::{Merge, impl_merge};
use crate::stack::{ResourceKind, ResourceRef, Stack};
use crate::{Error, Result};

/// Environment in which point-in-time recovery is on by default
pub const PRODUCTION_ENVIRONMENT: &str = "prod";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "S")]
    String,
    #[serde(rename = "N")]
    Number,
    #[serde(rename = "B")]
    Binary,
}

/// A key attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    PayPerRequest,
    Provisioned,
}

/// Table construction properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<BillingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_in_time_recovery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live_attribute: Option<String>,
}

impl_merge!(TableProps {
    table_name,
    partition_key,
    sort_key,
    billing_mode,
    point_in_time_recovery,
    time_to_live_attribute,
});

/// A synthesised table
#[derive(Debug, Clone)]
pub struct Table {
    pub resource: ResourceRef,
    pub props: TableProps,
}

/// Organisation defaults for a table in `environment`
pub fn default_props(environment: &str) -> TableProps {
    TableProps {
        point_in_time_recovery: Some(environment == PRODUCTION_ENVIRONMENT),
        ..Default::default()
    }
}

/// Add a table with organisation defaults to the stack
///
/// # Errors
///
/// Fails if `ENVIRONMENT` is missing from the context or no partition key
/// is given.
pub fn create(
    stack: &mut Stack,
    store: &ContextStore,
    id: &str,
    props: TableProps,
) -> Result<Table> {
    let environment = require_environment(store)?;
    let props = default_props(&environment).merge(props);
    tracing::debug!(id, %environment, pitr = ?props.point_in_time_recovery, "Creating table");

    if props.partition_key.is_none() {
        return Err(Error::invalid_props("table", id, "partition_key is required"));
    }

    let resource = stack.add_resource(id, ResourceKind::Table, &props)?;
    Ok(Table { resource, props })
}
