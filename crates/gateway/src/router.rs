// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subdomain router in front of the application router.
//!
//! Host classification happens on every request: hosts whose first label
//! contains `--` are workspaces; everything else (the apex, `www`, plain
//! subdomains) falls through untouched, auth never consulted. Workspace
//! requests are authenticated, stamped with a `workspace_session_id`
//! cookie, and handed to the streaming proxy.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use http::HeaderValue;
use porter_core::{base_host, parse_host, HostError, SessionId, UpstreamAuthority, WorkspaceKey};
use porter_engine::{MachineApi, Registry};
use porter_provider::ProviderApi;
use tracing::debug;

use crate::auth::Authenticator;
use crate::cookies;
use crate::pages;
use crate::proxy;

/// Shared gateway state for the router and proxy
pub struct AppState<P, M> {
    pub registry: Arc<Registry<P, M>>,
    pub auth: Arc<dyn Authenticator>,
    pub upstream: UpstreamAuthority,
    /// Upstream dialer: bounded connect, unbounded response
    pub http: reqwest::Client,
    pub base_domain: String,
    pub body_limit: usize,
    pub chunk_idle_timeout: Duration,
}

impl<P, M> Clone for AppState<P, M> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            auth: Arc::clone(&self.auth),
            upstream: self.upstream.clone(),
            http: self.http.clone(),
            base_domain: self.base_domain.clone(),
            body_limit: self.body_limit,
            chunk_idle_timeout: self.chunk_idle_timeout,
        }
    }
}

impl<P, M> AppState<P, M>
where
    P: ProviderApi,
    M: MachineApi,
{
    pub fn new(
        registry: Arc<Registry<P, M>>,
        auth: Arc<dyn Authenticator>,
        upstream: UpstreamAuthority,
        base_domain: impl Into<String>,
        body_limit: usize,
        chunk_idle_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            registry,
            auth,
            upstream,
            http,
            base_domain: base_domain.into(),
            body_limit,
            chunk_idle_timeout,
        })
    }
}

/// Assemble the gateway: application routes behind the workspace layer.
pub fn build_router<P, M>(state: AppState<P, M>) -> Router
where
    P: ProviderApi,
    M: MachineApi,
{
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(landing)
        .layer(middleware::from_fn_with_state(
            state,
            workspace_layer::<P, M>,
        ))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Minimal apex response. The real landing and status UI consume the
/// lifecycle manager through their own service; this is just the fallback.
async fn landing() -> Html<&'static str> {
    Html("<!doctype html><html><body><h1>porter</h1></body></html>")
}

async fn workspace_layer<P, M>(
    State(state): State<AppState<P, M>>,
    request: Request,
    next: Next,
) -> Response
where
    P: ProviderApi,
    M: MachineApi,
{
    let host = request_host(&request);
    match parse_host(&host) {
        Err(HostError::NotAWorkspace(_)) => next.run(request).await,
        Err(HostError::Unparseable(_)) => {
            debug!(%host, "unparseable workspace subdomain");
            pages::unparseable_subdomain()
        }
        Ok((user, repo)) => workspace_request(state, request, &host, user, repo).await,
    }
}

async fn workspace_request<P, M>(
    state: AppState<P, M>,
    request: Request,
    host: &str,
    user: String,
    repo: String,
) -> Response
where
    P: ProviderApi,
    M: MachineApi,
{
    let scheme = request_scheme(&request);

    if state.auth.principal(request.headers()).is_none() {
        let target = format!("{scheme}://{}/auth/github", base_host(host));
        debug!(%host, %target, "unauthenticated workspace request");
        return Redirect::temporary(&target).into_response();
    }

    // Workspace identity: the wildcard-domain session cookie, minted here
    // when the browser does not have one yet.
    let (session, fresh_session) = match cookies::session_id(request.headers()) {
        Some(session) => (session, false),
        None => (SessionId::generate(), true),
    };

    let key = match WorkspaceKey::new(session, user, repo) {
        Ok(key) => key,
        Err(err) => {
            debug!(%host, error = %err, "host parsed but key is invalid");
            return pages::invalid_workspace();
        }
    };

    let mut response = proxy::forward(&state, &key, request).await;

    if fresh_session {
        let cookie =
            cookies::session_set_cookie(&key.session, &state.base_domain, scheme == "https");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response
                .headers_mut()
                .append(http::header::SET_COOKIE, value);
        }
    }
    response
}

/// Request host: the `Host` header, falling back to the URI authority
/// (HTTP/2 requests carry it there).
fn request_host(request: &Request) -> String {
    request
        .headers()
        .get(http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Effective scheme: `x-forwarded-proto` from the TLS terminator, else the
/// URI scheme, else plain http.
fn request_scheme(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string())
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
