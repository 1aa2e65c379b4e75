//! Hierarchical path lookup over a context store
//!
//! Resolution happens in two steps. The first segment of the path (split on
//! the caller's delimiter) is looked up directly at the root, so top-level
//! keys may themselves contain characters that collide with the delimiter.
//! The remaining segments are re-joined with `.` and walked inside the
//! top-level value, where keys that contain dots still match (see
//! [`get_nested`]).
//!
//! # Examples
//!
//! ```
//! use infra_context::resolver::resolve;
//! use serde_json::json;
//!
//! let root = json!({"foo": {"bar": {"baz": "hello world"}}});
//! let root = root.as_object().unwrap();
//!
//! assert_eq!(resolve(root, "foo.bar.baz", "."), Some(&json!("hello world")));
//! assert_eq!(resolve(root, "foo:bar:baz", ":"), Some(&json!("hello world")));
//! assert_eq!(resolve(root, "foo.bar.missing", "."), None);
//! ```

use serde_json::{Map, Value};

/// Separator used for traversal below the top-level key.
pub const NESTED_SEPARATOR: char = '.';

/// Default delimiter for splitting the caller's path.
pub const DEFAULT_DELIMITER: &str = ".";

/// Split a path into its top-level key and the re-joined nested remainder.
///
/// An empty delimiter does not split at all: the whole path is the
/// top-level key.
///
/// ```
/// use infra_context::resolver::split_path;
///
/// assert_eq!(split_path("a:b:c", ":"), ("a", Some("b.c".to_string())));
/// assert_eq!(split_path("a", "."), ("a", None));
/// assert_eq!(split_path("a.b", ""), ("a.b", None));
/// ```
pub fn split_path<'a>(path: &'a str, delimiter: &str) -> (&'a str, Option<String>) {
    if delimiter.is_empty() {
        return (path, None);
    }

    let mut parts = path.split(delimiter);
    // `split` always yields at least one item, even for an empty path
    let first = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    if rest.is_empty() {
        (first, None)
    } else {
        (first, Some(rest.join(".")))
    }
}

/// Whether a top-level value counts as present.
///
/// `null`, `false`, zero and the empty string are all treated as if the key
/// were missing. Objects and arrays are always present, even when empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Walk a `.`-separated path inside `value`.
///
/// Object segments are keys; array segments must parse as a decimal index.
/// Scalars cannot be walked into. Values found at the end of the path are
/// returned as-is, including `null` and other falsy values.
///
/// Keys may contain dots. The whole path is first tried as a single key,
/// and a segment that misses is joined with the segments after it until a
/// key matches. `\.` escapes a dot inside a segment.
///
/// ```
/// use infra_context::resolver::get_nested;
/// use serde_json::json;
///
/// let value = json!({"prod.logLevel": "info", "a": {"b.c": 1}, "x.y": {"z": 2}});
/// assert_eq!(get_nested(&value, "prod.logLevel"), Some(&json!("info")));
/// assert_eq!(get_nested(&value, "a.b.c"), Some(&json!(1)));
/// assert_eq!(get_nested(&value, "x\\.y.z"), Some(&json!(2)));
/// ```
pub fn get_nested<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(found) = child(value, path) {
        return Some(found);
    }

    let segments = nested_segments(path);
    let mut current = value;
    let mut index = 0;

    while index < segments.len() {
        if !matches!(current, Value::Object(_) | Value::Array(_)) {
            return None;
        }

        let mut key = segments[index].clone();
        let mut found = child(current, &key);
        while found.is_none() && index + 1 < segments.len() {
            index += 1;
            key.push(NESTED_SEPARATOR);
            key.push_str(&segments[index]);
            found = child(current, &key);
        }

        current = found?;
        index += 1;
    }

    Some(current)
}

/// Look up one key in an object, or one index in an array
fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Split on unescaped `.`, turning `\.` into a literal dot
fn nested_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut segment = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&NESTED_SEPARATOR) => {
                segment.push(NESTED_SEPARATOR);
                chars.next();
            }
            NESTED_SEPARATOR => segments.push(std::mem::take(&mut segment)),
            _ => segment.push(c),
        }
    }
    segments.push(segment);
    segments
}

/// Resolve `path` against the root of a context store.
///
/// Returns `None` when the top-level key is missing or falsy, when a nested
/// segment is missing, or when a nested path is requested below a scalar.
pub fn resolve<'a>(
    root: &'a Map<String, Value>,
    path: &str,
    delimiter: &str,
) -> Option<&'a Value> {
    let (top, rest) = split_path(path, delimiter);

    let Some(top_value) = root.get(top).filter(|v| is_present(v)) else {
        tracing::debug!(path, key = top, "Top-level context key not found");
        return None;
    };

    let Some(rest) = rest else {
        return Some(top_value);
    };

    if !matches!(top_value, Value::Object(_) | Value::Array(_)) {
        tracing::debug!(path, key = top, "Cannot resolve nested path below a scalar");
        return None;
    }

    let found = get_nested(top_value, &rest);
    if found.is_none() {
        tracing::debug!(path, nested = %rest, "Nested context path not found");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test roots are objects"),
        }
    }

    #[test]
    fn test_split_path_default_delimiter() {
        assert_eq!(split_path("a.b.c", "."), ("a", Some("b.c".to_string())));
    }

    #[test]
    fn test_split_path_empty_path() {
        assert_eq!(split_path("", "."), ("", None));
    }

    #[test]
    fn test_split_path_multichar_delimiter() {
        assert_eq!(split_path("a::b::c", "::"), ("a", Some("b.c".to_string())));
    }

    #[test]
    fn test_is_present() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!(false)));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(0.0)));
        assert!(!is_present(&json!("")));
        assert!(is_present(&json!(true)));
        assert!(is_present(&json!(-1)));
        assert!(is_present(&json!("x")));
        assert!(is_present(&json!({})));
        assert!(is_present(&json!([])));
    }

    #[test]
    fn test_get_nested_walks_arrays_by_index() {
        let value = json!({"items": [{"name": "first"}, {"name": "second"}]});
        assert_eq!(get_nested(&value, "items.1.name"), Some(&json!("second")));
        assert_eq!(get_nested(&value, "items.2.name"), None);
        assert_eq!(get_nested(&value, "items.x"), None);
    }

    #[test]
    fn test_nested_segments_honour_escapes() {
        assert_eq!(nested_segments("a.b"), vec!["a", "b"]);
        assert_eq!(nested_segments("a\\.b.c"), vec!["a.b", "c"]);
        assert_eq!(nested_segments(""), vec![""]);
    }

    #[test]
    fn test_get_nested_prefers_the_whole_path_as_a_key() {
        let value = json!({"a.b": "flat", "a": {"b": "nested"}});
        assert_eq!(get_nested(&value, "a.b"), Some(&json!("flat")));
    }

    #[test]
    fn test_get_nested_joins_segments_on_a_miss() {
        let value = json!({"a.b": {"c.d": {"e": 5}}});
        assert_eq!(get_nested(&value, "a.b.c.d.e"), Some(&json!(5)));
        assert_eq!(get_nested(&value, "a.b.c.x"), None);
    }

    #[test]
    fn test_nested_falsy_values_are_returned() {
        let ctx = root(json!({"app": {"enabled": false, "name": ""}}));
        assert_eq!(resolve(&ctx, "app.enabled", "."), Some(&json!(false)));
        assert_eq!(resolve(&ctx, "app.name", "."), Some(&json!("")));
    }

    #[test]
    fn test_scalar_top_level_cannot_be_drilled() {
        let ctx = root(json!({"ENVIRONMENT": "prod"}));
        assert_eq!(resolve(&ctx, "ENVIRONMENT", "."), Some(&json!("prod")));
        assert_eq!(resolve(&ctx, "ENVIRONMENT.length", "."), None);
    }

    #[test]
    fn test_custom_delimiter_only_applies_to_first_split() {
        // "b.c" inside a ':'-split segment still splits on '.'
        let ctx = root(json!({"a": {"b": {"c": 1}}}));
        assert_eq!(resolve(&ctx, "a:b.c", ":"), Some(&json!(1)));
    }

    #[test]
    fn test_top_level_key_may_contain_nested_separator() {
        let ctx = root(json!({"acme.io": {"region": "eu-west-1"}}));
        assert_eq!(resolve(&ctx, "acme.io/region", "/"), Some(&json!("eu-west-1")));
        assert_eq!(resolve(&ctx, "acme.io.region", "."), None);
    }
}
