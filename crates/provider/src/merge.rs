// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deep merge for machine-create configs

use serde_json::Value;

/// Merge `overlay` into `base`.
///
/// Objects merge recursively (union of keys); any other collision is won by
/// `overlay`, arrays included. This is the semantics the machine-create
/// payload needs: callers override `env` entries without restating the
/// whole default config.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
