// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: non-workspace hosts never touch auth or the proxy.

use crate::prelude::*;

#[tokio::test]
async fn www_host_passes_through_to_the_app_router() {
    let specs = Specs::start_with(SpecOptions {
        authenticated: false,
        ..SpecOptions::default()
    })
    .await;

    let response = specs.get("www.eureka.local", "/").await;
    assert_eq!(response.status(), http::StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("porter"));

    // No auth redirect happened and no provisioning was attempted
    assert!(specs.provider.calls().is_empty());
}

#[tokio::test]
async fn apex_host_passes_through() {
    let specs = Specs::start_with(SpecOptions {
        authenticated: false,
        ..SpecOptions::default()
    })
    .await;

    let response = specs.get("eureka.local", "/healthz").await;
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn unauthenticated_workspace_host_redirects() {
    let specs = Specs::start_with(SpecOptions {
        authenticated: false,
        ..SpecOptions::default()
    })
    .await;

    let response = specs.get("alice--demo.eureka.local", "/").await;
    assert_eq!(response.status(), http::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response
            .headers()
            .get(http::header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("http://eureka.local/auth/github")
    );
    assert!(specs.provider.calls().is_empty());
}
