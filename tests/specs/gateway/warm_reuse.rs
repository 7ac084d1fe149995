// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: the store already knows this workspace's machine.

use crate::prelude::*;

#[tokio::test]
async fn warm_reuse_restarts_the_persisted_machine() {
    let specs = Specs::start().await;
    specs.seed_record("s", "alice", "demo", "m_1");
    specs.provider.seed_machine("m_1", "alice", "demo");

    let response = specs
        .get_with_session("alice--demo.eureka.local", "/x?y=1", "s")
        .await;
    assert_eq!(response.status(), http::StatusCode::OK);

    // No create; one start of the persisted machine
    assert_eq!(specs.provider.create_count(), 0);
    assert_eq!(specs.provider.started().len(), 1);
    assert_eq!(specs.provider.started()[0].as_str(), "m_1");

    // Path and query reached the machine unrewritten
    let body = body_json(response).await;
    assert_eq!(body["path"], "/x");
    assert_eq!(body["query"], "y=1");
}

#[tokio::test]
async fn client_host_and_connection_headers_stay_behind() {
    let specs = Specs::start().await;
    specs.seed_record("s", "alice", "demo", "m_1");
    specs.provider.seed_machine("m_1", "alice", "demo");

    let request = http::Request::builder()
        .uri("/check")
        .header("host", "alice--demo.eureka.local")
        .header("connection", "keep-alive")
        .header("cookie", "workspace_session_id=s")
        .header("x-custom", "survives")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = specs.request(request).await;
    let body = body_json(response).await;

    // The upstream dials its own authority; the client's host never crosses
    let upstream_host = body["headers"]["host"].as_str().unwrap_or_default();
    assert!(upstream_host.starts_with("127.0.0.1:"));
    assert!(body["headers"].get("connection").is_none());
    assert_eq!(body["headers"]["x-custom"], "survives");
}
