//! Merge-on-read for mapping-typed keys.
//!
//! When a key holds a mapping in both trees, reads see the default mapping
//! with the loaded entries written over it. The merge is one level deep:
//! a loaded entry replaces the default entry of the same name entirely, even
//! when both are mappings themselves.

use serde_json::{Map, Value};

/// Merge `data` over `defaults`, returning a new mapping.
///
/// Neither input is modified.
///
/// # Example
/// ```
/// use serde_json::json;
/// use agent_config::config::merge_over_defaults;
///
/// let defaults = json!({"dd_port": 10516, "batch_wait": 5});
/// let data = json!({"batch_wait": "2"});
/// let merged = merge_over_defaults(
///     defaults.as_object().unwrap(),
///     data.as_object().unwrap(),
/// );
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({"dd_port": 10516, "batch_wait": "2"})
/// );
/// ```
pub fn merge_over_defaults(
    defaults: &Map<String, Value>,
    data: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in data {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Resolve the value a read of one key should see.
///
/// Returns `None` when the key is absent from both trees.
pub fn resolve_entry(data: Option<&Value>, default: Option<&Value>) -> Option<Value> {
    match (data, default) {
        (Some(Value::Object(data_map)), Some(Value::Object(default_map))) => {
            Some(Value::Object(merge_over_defaults(default_map, data_map)))
        }
        (Some(value), _) => Some(value.clone()),
        (None, default) => default.cloned(),
    }
}
