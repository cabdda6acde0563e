//! Dotted-path lookup over loosely shaped JSON.
//!
//! Paths such as `about.mission.title` or `slides.fpt.3` walk objects by key
//! and arrays by decimal index. Lookups never fail: an absent segment, a
//! scalar in the middle of the path, or a terminal `null` all resolve to the
//! caller's default.

use serde_json::Value;

/// Walk `dotted_path` through `root`. Returns `None` when any segment does
/// not resolve or when the resolved value is `null`.
pub fn lookup<'a>(root: &'a Value, dotted_path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in dotted_path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    match current {
        Value::Null => None,
        value => Some(value),
    }
}

/// Resolve `dotted_path` or fall back to `default`.
pub fn get_or(root: &Value, dotted_path: &str, default: Value) -> Value {
    lookup(root, dotted_path).cloned().unwrap_or(default)
}
