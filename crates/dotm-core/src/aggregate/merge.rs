//! Combining several contributions to one target.

use serde_json::{Map, Value};

/// Separator between text contributions.
pub const TEXT_SEPARATOR: &str = "\n\n";

/// Deep-merge `other` into `base`.
///
/// Objects merge key by key; any other pairing, arrays included, is a
/// wholesale replacement by `other`.
pub fn deep_merge(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Object(base_map), Value::Object(other_map)) => {
            for (key, other_val) in other_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, other_val);
                } else {
                    base_map.insert(key.clone(), other_val.clone());
                }
            }
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}

/// Merge JSON documents left to right into a 2-space indented document.
///
/// Contributions that do not parse are logged and skipped. No contributions
/// at all yields an empty string so a stale managed region gets cleared.
pub fn merge_json_contents(contents: &[String]) -> String {
    if contents.is_empty() {
        return String::new();
    }

    let mut merged = Value::Object(Map::new());
    for (idx, content) in contents.iter().enumerate() {
        match serde_json::from_str::<Value>(content.trim()) {
            Ok(parsed) => deep_merge(&mut merged, &parsed),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "Skipping JSON contribution that failed to parse");
            }
        }
    }

    // Serializing a Value cannot fail
    serde_json::to_string_pretty(&merged).unwrap_or_default()
}

/// Join text contributions with a blank line.
pub fn join_text_contents(contents: &[String]) -> String {
    contents.join(TEXT_SEPARATOR)
}
