// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: local state is corrupt or stale; the provider is ground truth.

use crate::prelude::*;
use porter_provider::ProviderCall;

#[tokio::test]
async fn corrupt_record_falls_back_to_listing_then_create() {
    let specs = Specs::start().await;

    // Plant a record the store cannot parse
    let path = specs
        .data_dir
        .path()
        .join("s")
        .join("alice")
        .join("demo.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"bogus":1}"#).unwrap();

    let response = specs
        .get_with_session("alice--demo.eureka.local", "/", "s")
        .await;
    assert_eq!(response.status(), http::StatusCode::OK);

    // Listing consulted before creating
    let calls = specs.provider.calls();
    assert!(matches!(calls[0], ProviderCall::List));
    assert!(matches!(calls[1], ProviderCall::Create { .. }));

    // The store healed with the new id
    let record = specs
        .store
        .load(&specs.key("s", "alice", "demo"))
        .unwrap()
        .expect("healed record");
    assert_eq!(record.machine_id.as_str(), "m_1");
}

#[tokio::test]
async fn orphaned_machine_is_adopted_instead_of_created() {
    let specs = Specs::start().await;
    // The provider still has alice/demo's machine, but local state is gone
    specs.provider.seed_machine("m_44", "alice", "demo");

    let response = specs
        .get_with_session("alice--demo.eureka.local", "/", "s")
        .await;
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(specs.provider.create_count(), 0);

    let record = specs
        .store
        .load(&specs.key("s", "alice", "demo"))
        .unwrap()
        .expect("adopted record");
    assert_eq!(record.machine_id.as_str(), "m_44");
}
