//! Dotted-path access into JSON documents
//!
//! Paths are dot-separated segments. Numeric segments index arrays and every
//! other segment names an object key. The `*` segment is transparent when
//! reading, so `children.*.id` reads like `children.id` does on a single item.

use serde_json::{Map, Value};

/// Segment matching any single path segment
pub const WILDCARD: &str = "*";

/// Split a path into its non-empty segments
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

/// Whether the path contains a `*` segment
pub fn has_wildcard(path: &str) -> bool {
    segments(path).any(|segment| segment == WILDCARD)
}

pub fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Join a parent path and a child segment
pub fn join(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}.{child}"),
    }
}

/// The path without its last segment, or `None` for a single-segment path
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('.').map(|(parent, _)| parent)
}

pub fn last_segment(path: &str) -> &str {
    path.rsplit_once('.').map_or(path, |(_, last)| last)
}

/// Read the value at `path`; the empty path is the document itself
pub fn get<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in segments(path) {
        if segment == WILDCARD {
            continue;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn get_mut<'a>(data: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = data;
    for segment in segments(path) {
        if segment == WILDCARD {
            continue;
        }
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediate containers as needed
///
/// A missing intermediate becomes an array when the following segment is
/// numeric and an object otherwise. Scalars standing in the way are replaced.
pub fn set(data: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        *data = value;
        return;
    };

    let mut current = data;
    for (i, segment) in parents.iter().enumerate() {
        current = child_mut(current, segment);
        if !current.is_object() && !current.is_array() {
            *current = if is_index(parts[i + 1]) {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
        }
    }
    *child_mut(current, last) = value;
}

/// Remove and return the value at `path`
pub fn remove(data: &mut Value, path: &str) -> Option<Value> {
    let (container, key) = match parent(path) {
        Some(parent) => (get_mut(data, parent)?, last_segment(path)),
        None => (data, path),
    };
    match container {
        Value::Object(map) => map.remove(key),
        Value::Array(items) => {
            let index = key.parse::<usize>().ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}

/// Every leaf path of a document in document order
///
/// Empty arrays and objects count as leaves. A scalar or null document has no
/// paths at all.
pub fn data_paths(data: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    match data {
        Value::Object(map) => {
            for (key, value) in map {
                collect_paths(value, key.clone(), &mut paths);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                collect_paths(value, index.to_string(), &mut paths);
            }
        }
        _ => {}
    }
    paths
}

fn collect_paths(value: &Value, prefix: String, paths: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_paths(child, join(&prefix, key), paths);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                collect_paths(child, join(&prefix, &index.to_string()), paths);
            }
        }
        _ => paths.push(prefix),
    }
}

fn child_mut<'a>(container: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = segment.parse::<usize>().ok();
    if !(container.is_array() && index.is_some()) && !container.is_object() {
        *container = Value::Object(Map::new());
    }
    match (container, index) {
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        // converted to an object above
        (other, _) => other,
    }
}
