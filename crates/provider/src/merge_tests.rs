// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn disjoint_keys_union() {
    let merged = deep_merge(json!({"a": 1}), json!({"b": 2}));
    assert_eq!(merged, json!({"a": 1, "b": 2}));
}

#[test]
fn nested_objects_recurse() {
    let base = json!({"env": {"USERNAME": "alice", "KEEP": "yes"}});
    let overlay = json!({"env": {"USERNAME": "bob"}});
    assert_eq!(
        deep_merge(base, overlay),
        json!({"env": {"USERNAME": "bob", "KEEP": "yes"}})
    );
}

#[test]
fn scalars_are_replaced() {
    assert_eq!(deep_merge(json!({"a": 1}), json!({"a": 2})), json!({"a": 2}));
    assert_eq!(
        deep_merge(json!({"a": {"x": 1}}), json!({"a": 2})),
        json!({"a": 2})
    );
}

#[test]
fn arrays_are_replaced_wholesale() {
    let merged = deep_merge(json!({"services": [1, 2, 3]}), json!({"services": [4]}));
    assert_eq!(merged, json!({"services": [4]}));
}

#[test]
fn create_config_override_shape() {
    let default = json!({
        "image": "porter-workspace:latest",
        "guest": {"cpu_kind": "shared", "cpus": 1, "memory_mb": 512},
        "env": {}
    });
    let merged = deep_merge(
        default,
        json!({"env": {"USERNAME": "alice", "REPO_NAME": "demo"}}),
    );
    assert_eq!(merged["image"], "porter-workspace:latest");
    assert_eq!(merged["guest"]["memory_mb"], 512);
    assert_eq!(merged["env"]["USERNAME"], "alice");
    assert_eq!(merged["env"]["REPO_NAME"], "demo");
}
