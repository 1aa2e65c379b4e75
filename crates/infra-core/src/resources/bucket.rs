//! Storage bucket with organisation defaults
//!
//! On top of the caller's properties this configures:
//!
//! - Versioning enabled
//! - All public access blocked
//! - S3-managed server-side encryption
//! - A bucket policy denying requests that do not use TLS
//! - One lifecycle rule moving current and non-current object versions to
//!   Standard-IA after 90 days and Glacier Instant Retrieval after 180 days
//!
//! Non-current version transitions are rejected by the storage API on
//! unversioned buckets, so they are stripped from every lifecycle rule when
//! the merged `versioned` flag is false.

use serde::{Deserialize, Serialize};

use crate::merge::{Merge, impl_merge};
use crate::stack::{PolicyStatement, ResourceKind, ResourceRef, Stack};
use crate::Result;

/// Public access block setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockPublicAccess {
    BlockAll,
    BlockAcls,
    Off,
}

/// Server-side encryption setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketEncryption {
    Unencrypted,
    S3Managed,
    KmsManaged,
    Kms,
    DsseManaged,
}

/// Storage class an object version can transition to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageClass {
    #[serde(rename = "STANDARD_IA")]
    InfrequentAccess,
    IntelligentTiering,
    #[serde(rename = "GLACIER_IR")]
    GlacierInstantRetrieval,
    Glacier,
    DeepArchive,
}

/// Move objects to `storage_class` after `transition_after_days`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub storage_class: StorageClass,
    pub transition_after_days: u32,
}

/// One lifecycle rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub noncurrent_version_transitions: Vec<Transition>,
}

/// Bucket construction properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_public_access: Option<BlockPublicAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<BucketEncryption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_rules: Option<Vec<LifecycleRule>>,
}

impl_merge!(BucketProps {
    bucket_name,
    versioned,
    block_public_access,
    encryption,
    enforce_ssl,
    lifecycle_rules,
});

/// The standard 90/180-day transition ladder
pub fn default_transitions() -> Vec<Transition> {
    vec![
        Transition {
            storage_class: StorageClass::InfrequentAccess,
            transition_after_days: 90,
        },
        Transition {
            storage_class: StorageClass::GlacierInstantRetrieval,
            transition_after_days: 180,
        },
    ]
}

/// Organisation defaults for every bucket
pub fn default_props() -> BucketProps {
    BucketProps {
        bucket_name: None,
        versioned: Some(true),
        block_public_access: Some(BlockPublicAccess::BlockAll),
        encryption: Some(BucketEncryption::S3Managed),
        enforce_ssl: Some(true),
        lifecycle_rules: Some(vec![LifecycleRule {
            transitions: default_transitions(),
            noncurrent_version_transitions: default_transitions(),
            ..Default::default()
        }]),
    }
}

/// Merge caller props over the defaults and apply the versioning correction
pub fn merged_props(props: BucketProps) -> BucketProps {
    let mut merged = default_props().merge(props);

    if !merged.versioned.unwrap_or(false) {
        if let Some(rules) = merged.lifecycle_rules.as_mut() {
            for rule in rules.iter_mut() {
                rule.noncurrent_version_transitions.clear();
            }
        }
    }

    merged
}

/// A synthesised bucket
#[derive(Debug, Clone)]
pub struct Bucket {
    pub resource: ResourceRef,
    pub props: BucketProps,
    pub policy: Option<ResourceRef>,
}

/// Add a bucket with organisation defaults to the stack
pub fn create(stack: &mut Stack, id: &str, props: BucketProps) -> Result<Bucket> {
    let props = merged_props(props);
    tracing::debug!(id, versioned = ?props.versioned, "Creating bucket");

    stack.transaction(|stack| {
        let resource = stack.add_resource(id, ResourceKind::Bucket, &props)?;

        let policy = if props.enforce_ssl.unwrap_or(false) {
            let arn = resource.attribute("Arn");
            let objects = serde_json::json!({ "Fn::Join": ["", [arn.clone(), "/*"]] });
            let statement = PolicyStatement::deny_insecure_transport("s3:*", vec![arn, objects]);
            let policy = stack.add_resource(
                format!("{id}Policy"),
                ResourceKind::BucketPolicy,
                &serde_json::json!({
                    "bucket": resource.reference(),
                    "statements": [statement],
                }),
            )?;
            Some(policy)
        } else {
            None
        };

        Ok(Bucket {
            resource,
            props,
            policy,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_version_and_lifecycle() {
        let props = merged_props(BucketProps::default());
        assert_eq!(props.versioned, Some(true));

        let rules = props.lifecycle_rules.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].transitions, default_transitions());
        assert_eq!(rules[0].noncurrent_version_transitions, default_transitions());
    }

    #[test]
    fn unversioned_buckets_drop_noncurrent_transitions() {
        let props = merged_props(BucketProps {
            versioned: Some(false),
            ..Default::default()
        });

        let rules = props.lifecycle_rules.unwrap();
        assert_eq!(rules[0].transitions, default_transitions());
        assert!(rules[0].noncurrent_version_transitions.is_empty());
    }

    #[test]
    fn storage_classes_use_api_names() {
        let json = serde_json::to_value(default_transitions()).unwrap();
        assert_eq!(json[0]["storage_class"], "STANDARD_IA");
        assert_eq!(json[1]["storage_class"], "GLACIER_IR");
    }
}
