//! Path operations on a JSON document tree.
//!
//! Paths are slash-separated; empty segments are ignored, so `"machines/"`
//! and `"/machines"` both address the `machines` child of the root. The
//! empty path addresses the root itself.

use serde_json::{Map, Value};

use uvv_contracts::error::{UvvError, UvvResult};

pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub(crate) fn get<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = root;
    for segment in segments(path) {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Overwrite the value at `path`, creating intermediate objects. A non-object
/// value standing where an intermediate object is needed is replaced.
/// Writing `null` removes the value.
pub(crate) fn set(root: &mut Value, path: &str, value: Value) {
    if value.is_null() {
        remove(root, path);
        return;
    }

    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(last.to_string(), value);
}

/// Merge each key of `partial` into the object at `path`.
pub(crate) fn update(root: &mut Value, path: &str, partial: Value) -> UvvResult<()> {
    let Value::Object(fields) = partial else {
        return Err(UvvError::Store {
            path: path.to_string(),
            reason: "update requires a JSON object".to_string(),
        });
    };

    let base = segments(path).join("/");
    for (key, value) in fields {
        let child = if base.is_empty() {
            key
        } else {
            format!("{}/{}", base, key)
        };
        set(root, &child, value);
    }
    Ok(())
}

/// Remove the value at `path`. Removing a missing path is a no-op; removing
/// the root empties it.
pub(crate) fn remove(root: &mut Value, path: &str) {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        *root = Value::Object(Map::new());
        return;
    };

    let mut current = root;
    for segment in parents {
        match current.as_object_mut().and_then(|o| o.get_mut(*segment)) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(object) = current.as_object_mut() {
        object.remove(*last);
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}
