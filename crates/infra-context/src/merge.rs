//! Merge engine for untyped configuration objects
//!
//! Two merge strategies are provided:
//!
//! - [`shallow_merge`]: override wins per top-level key. This is the rule
//!   used for combining organisation defaults with caller-supplied values.
//! - [`deep_merge`]: recursive object merge. This is the rule used for
//!   layering context files on top of each other.

use serde_json::{Map, Value};

/// Combine `defaults` with `overrides`, override winning per top-level key.
///
/// Keys only present in `defaults` keep the default value. Nested objects
/// are replaced wholesale, not merged.
///
/// ```
/// use infra_context::merge::shallow_merge;
/// use serde_json::json;
///
/// let defaults = json!({"versioned": true, "tags": {"team": "core"}});
/// let overrides = json!({"tags": {"owner": "me"}});
/// let merged = shallow_merge(
///     defaults.as_object().unwrap(),
///     overrides.as_object().unwrap(),
/// );
///
/// assert_eq!(merged["versioned"], true);
/// assert_eq!(merged["tags"], json!({"owner": "me"}));
/// ```
pub fn shallow_merge(
    defaults: &Map<String, Value>,
    overrides: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Deep merge `overlay` into `base`
///
/// If both values are objects, merge them recursively with `overlay` taking
/// precedence. Otherwise, `overlay` replaces `base`.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}
