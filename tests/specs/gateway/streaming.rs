// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: response streaming, header relay, and the chunk idle timeout.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test]
async fn event_stream_is_relayed_chunk_by_chunk() {
    let specs = Specs::start().await;
    specs.seed_record("s", "alice", "demo", "m_1");
    specs.provider.seed_machine("m_1", "alice", "demo");

    let response = specs
        .get_with_session("alice--demo.eureka.local", "/stream", "s")
        .await;
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );

    let body = body_string(response).await;
    assert_eq!(body, "data: one\n\ndata: two\n\ndata: three\n\n");
}

#[tokio::test]
async fn multi_valued_upstream_headers_are_comma_joined() {
    let specs = Specs::start().await;
    specs.seed_record("s", "alice", "demo", "m_1");
    specs.provider.seed_machine("m_1", "alice", "demo");

    let response = specs
        .get_with_session("alice--demo.eureka.local", "/multi", "s")
        .await;
    assert_eq!(
        response
            .headers()
            .get("x-multi")
            .and_then(|v| v.to_str().ok()),
        Some("a, b")
    );
    assert_eq!(response.headers().get_all("x-multi").iter().count(), 1);
}

#[tokio::test]
async fn silent_upstream_is_cut_off_at_the_idle_timeout() {
    let specs = Specs::start_with(SpecOptions {
        chunk_idle_timeout: Duration::from_millis(200),
        ..SpecOptions::default()
    })
    .await;
    specs.seed_record("s", "alice", "demo", "m_1");
    specs.provider.seed_machine("m_1", "alice", "demo");

    let started = std::time::Instant::now();
    let response = specs
        .get_with_session("alice--demo.eureka.local", "/hang", "s")
        .await;
    let body = body_string(response).await;

    // Only the first chunk made it; the stream ended at the idle window,
    // not after the upstream's 60 s stall
    assert_eq!(body, "chunk\n");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn oversized_request_bodies_are_rejected() {
    let specs = Specs::start_with(SpecOptions {
        body_limit: 1024,
        ..SpecOptions::default()
    })
    .await;
    specs.seed_record("s", "alice", "demo", "m_1");
    specs.provider.seed_machine("m_1", "alice", "demo");

    let request = http::Request::builder()
        .method("POST")
        .uri("/upload")
        .header("host", "alice--demo.eureka.local")
        .header("cookie", "workspace_session_id=s")
        .body(axum::body::Body::from(vec![0u8; 4096]))
        .unwrap();
    let response = specs.request(request).await;
    assert_eq!(response.status(), http::StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn post_bodies_are_forwarded() {
    let specs = Specs::start().await;
    specs.seed_record("s", "alice", "demo", "m_1");
    specs.provider.seed_machine("m_1", "alice", "demo");

    let request = http::Request::builder()
        .method("POST")
        .uri("/submit")
        .header("host", "alice--demo.eureka.local")
        .header("cookie", "workspace_session_id=s")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(r#"{"hello":"world"}"#))
        .unwrap();
    let response = specs.request(request).await;
    assert_eq!(response.status(), http::StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/submit");
}
