//! Deep merge with array-replace semantics.

use serde_json::Value;

/// Merge `overlay` into `base`, with `overlay` winning at every leaf.
///
/// Objects are merged recursively (union of keys, the overlay's value wins
/// on conflict). Arrays are replaced wholesale by the overlay's array,
/// never concatenated or index-merged — a tsconfig that redefines `lib` or
/// a path-alias list supersedes its parent's list entirely. Scalars are
/// replaced.
pub fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}
