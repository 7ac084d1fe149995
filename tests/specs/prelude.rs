// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for gateway specs: an assembled router wired to fakes
//! plus a real upstream HTTP server standing in for a workspace machine.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::StreamExt as _;
use porter_core::{SessionId, UpstreamAuthority, WorkspaceKey};
use porter_engine::{ActorConfig, FakeMachineApi, Registry};
use porter_gateway::{build_router, AppState, FakeAuthenticator};
use porter_provider::FakeProvider;
use porter_storage::{MachineRecord, StateStore};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct SpecOptions {
    pub body_limit: usize,
    pub chunk_idle_timeout: Duration,
    pub authenticated: bool,
}

impl Default for SpecOptions {
    fn default() -> Self {
        Self {
            body_limit: 1024 * 1024,
            chunk_idle_timeout: Duration::from_secs(5),
            authenticated: true,
        }
    }
}

pub struct Specs {
    pub provider: FakeProvider,
    pub router: Router,
    pub store: StateStore,
    pub data_dir: TempDir,
}

impl Specs {
    pub async fn start() -> Self {
        Self::start_with(SpecOptions::default()).await
    }

    pub async fn start_with(options: SpecOptions) -> Self {
        let upstream_port = spawn_upstream().await;

        let data_dir = TempDir::new().unwrap();
        let store = StateStore::new(data_dir.path());
        let provider = FakeProvider::new();
        let registry = Arc::new(Registry::new(
            provider.clone(),
            FakeMachineApi::new(),
            store.clone(),
            ActorConfig::default(),
        ));

        let auth = if options.authenticated {
            FakeAuthenticator::logged_in("alice")
        } else {
            FakeAuthenticator::anonymous()
        };

        let state = AppState::new(
            registry,
            Arc::new(auth),
            UpstreamAuthority::new(format!("127.0.0.1:{upstream_port}"), "porter"),
            "eureka.local",
            options.body_limit,
            options.chunk_idle_timeout,
            Duration::from_secs(1),
        )
        .unwrap();

        Self {
            provider,
            router: build_router(state),
            store,
            data_dir,
        }
    }

    pub async fn get(&self, host: &str, path: &str) -> Response {
        self.request(
            http::Request::builder()
                .uri(path)
                .header("host", host)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn get_with_session(&self, host: &str, path: &str, session: &str) -> Response {
        self.request(
            http::Request::builder()
                .uri(path)
                .header("host", host)
                .header("cookie", format!("workspace_session_id={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn request(&self, request: Request) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn key(&self, session: &str, user: &str, repo: &str) -> WorkspaceKey {
        WorkspaceKey::new(SessionId::new(session), user, repo).unwrap()
    }

    pub fn seed_record(&self, session: &str, user: &str, repo: &str, machine: &str) {
        self.store
            .save(
                &self.key(session, user, repo),
                &MachineRecord {
                    machine_id: machine.into(),
                    created_at_ms: 0,
                },
            )
            .unwrap();
    }
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of the `workspace_session_id` cookie set on a response, if any.
pub fn set_session_cookie(response: &Response) -> Option<String> {
    let cookie = response
        .headers()
        .get(http::header::SET_COOKIE)?
        .to_str()
        .ok()?;
    let (name_value, _) = cookie.split_once(';')?;
    let (name, value) = name_value.split_once('=')?;
    (name == "workspace_session_id").then(|| value.to_string())
}

/// Start the upstream machine stand-in on an ephemeral port.
async fn spawn_upstream() -> u16 {
    let app = Router::new()
        .route("/stream", get(stream_chunks))
        .route("/hang", get(hang_after_first_chunk))
        .route("/multi", get(multi_valued_headers))
        .fallback(echo);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// Echo the request back as JSON so specs can assert what was forwarded.
async fn echo(request: Request) -> Response {
    let headers: serde_json::Map<String, serde_json::Value> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                json!(value.to_str().unwrap_or_default()),
            )
        })
        .collect();
    let body = json!({
        "method": request.method().as_str(),
        "path": request.uri().path(),
        "query": request.uri().query(),
        "headers": headers,
    });
    ([("x-upstream", "machine")], axum::Json(body)).into_response()
}

async fn stream_chunks() -> Response {
    let chunks = ["data: one\n\n", "data: two\n\n", "data: three\n\n"];
    let stream = futures::stream::iter(chunks).then(|chunk| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, Infallible>(Bytes::from(chunk))
    });
    (
        [("content-type", "text/event-stream")],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn hang_after_first_chunk() -> Response {
    let stream = futures::stream::iter([0u8, 1]).then(|n| async move {
        if n > 0 {
            // Far longer than any spec's chunk idle timeout
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Ok::<_, Infallible>(Bytes::from("chunk\n"))
    });
    Body::from_stream(stream).into_response()
}

async fn multi_valued_headers() -> Response {
    let mut response = "multi".into_response();
    response.headers_mut().append(
        "x-multi",
        http::HeaderValue::from_static("a"),
    );
    response.headers_mut().append(
        "x-multi",
        http::HeaderValue::from_static("b"),
    );
    response
}
