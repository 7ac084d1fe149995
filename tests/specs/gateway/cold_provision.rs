// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: first request to a workspace nobody has visited before.

use crate::prelude::*;
use porter_provider::ProviderCall;

#[tokio::test]
async fn cold_provision_creates_machine_and_streams_response() {
    let specs = Specs::start().await;

    let response = specs.get("alice--demo.eureka.local:4000", "/").await;
    assert_eq!(response.status(), http::StatusCode::OK);

    // A fresh workspace session was minted on the wildcard domain
    let session = set_session_cookie(&response).expect("session cookie");
    let cookie_header = response
        .headers()
        .get(http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie_header.contains("Domain=.eureka.local"));
    assert!(cookie_header.contains("HttpOnly"));

    // Exactly one machine was created, booted for alice/demo
    assert_eq!(specs.provider.create_count(), 1);
    let creates: Vec<_> = specs
        .provider
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ProviderCall::Create { overrides } => Some(overrides),
            _ => None,
        })
        .collect();
    assert_eq!(creates[0]["config"]["env"]["USERNAME"], "alice");
    assert_eq!(creates[0]["config"]["env"]["REPO_NAME"], "demo");

    // The response body came from the upstream machine
    let body = body_json(response).await;
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/");

    // The machine id was persisted under the new session's key
    let record = specs
        .store
        .load(&specs.key(&session, "alice", "demo"))
        .unwrap()
        .expect("persisted record");
    assert_eq!(record.machine_id.as_str(), "m_1");
}

#[tokio::test]
async fn second_request_reuses_the_machine() {
    let specs = Specs::start().await;

    let first = specs.get("alice--demo.eureka.local", "/").await;
    let session = set_session_cookie(&first).unwrap();

    let second = specs
        .get_with_session("alice--demo.eureka.local", "/", &session)
        .await;
    assert_eq!(second.status(), http::StatusCode::OK);
    // Same actor, same machine: no second create, no re-issued cookie
    assert_eq!(specs.provider.create_count(), 1);
    assert!(set_session_cookie(&second).is_none());
}

#[tokio::test]
async fn different_repos_get_different_machines() {
    let specs = Specs::start().await;

    let first = specs.get("alice--demo.eureka.local", "/").await;
    let session = set_session_cookie(&first).unwrap();
    let second = specs
        .get_with_session("alice--other.eureka.local", "/", &session)
        .await;

    assert_eq!(second.status(), http::StatusCode::OK);
    assert_eq!(specs.provider.create_count(), 2);
}
