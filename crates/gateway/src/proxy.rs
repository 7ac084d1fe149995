// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streaming reverse proxy to workspace machines.
//!
//! The proxy asks the workspace actor for a live machine id, forwards the
//! request upstream, and relays the response chunk-by-chunk. There is no
//! total-response deadline: SSE and other long-lived streams run until the
//! upstream closes, the client disconnects, or no chunk arrives within the
//! configured idle window.

use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};
use porter_core::WorkspaceKey;
use porter_provider::ProviderApi;
use tokio_stream::StreamExt as _;
use tracing::{debug, warn};

use porter_engine::MachineApi;

use crate::pages;
use crate::router::AppState;

pub(crate) async fn forward<P, M>(
    state: &AppState<P, M>,
    key: &WorkspaceKey,
    request: Request,
) -> Response
where
    P: ProviderApi,
    M: MachineApi,
{
    let workspace = state.registry.get_or_create(key);
    let machine = match workspace.ensure_machine().await {
        Ok(id) => id,
        Err(err) => {
            warn!(workspace = %key, error = %err, "workspace not ready");
            return pages::starting_workspace();
        }
    };

    let (parts, body) = request.into_parts();
    let path_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = state.upstream.http_url(&machine, path_query);

    let body = match axum::body::to_bytes(body, state.body_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(workspace = %key, error = %err, "request body over limit");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    debug!(workspace = %key, machine = %machine, %url, "proxying request");
    let upstream_request = state
        .http
        .request(parts.method.clone(), url)
        .headers(request_headers(&parts.headers))
        .body(body);

    let upstream_response = match upstream_request.send().await {
        Ok(resp) => resp,
        Err(err) => {
            // Usually the machine is still booting; the starting page's
            // auto-reload is the retry loop.
            warn!(workspace = %key, machine = %machine, error = %err, "upstream dial failed");
            return pages::starting_workspace();
        }
    };

    let status = upstream_response.status();
    let headers = response_headers(upstream_response.headers());

    let chunks = Box::pin(
        upstream_response
            .bytes_stream()
            .timeout(state.chunk_idle_timeout),
    );
    let stream = futures::stream::unfold(chunks, |mut chunks| async move {
        match chunks.next().await {
            Some(Ok(Ok(chunk))) => Some((Ok::<Bytes, std::convert::Infallible>(chunk), chunks)),
            Some(Ok(Err(err))) => {
                debug!(error = %err, "upstream stream ended with error");
                None
            }
            Some(Err(_)) => {
                debug!("upstream chunk idle timeout, terminating stream");
                None
            }
            None => None,
        }
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Headers forwarded upstream: everything except `host` (the upstream has
/// its own) and `connection` (hop-by-hop).
fn request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    forwarded.remove(http::header::HOST);
    forwarded.remove(http::header::CONNECTION);
    forwarded
}

/// Headers relayed downstream: every upstream header under its lowercased
/// name, multi-valued headers joined with `, `. Framing headers are dropped
/// because the relay re-frames the body as a chunked stream.
fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in upstream.keys() {
        if *name == http::header::CONNECTION
            || *name == http::header::TRANSFER_ENCODING
            || *name == http::header::CONTENT_LENGTH
        {
            continue;
        }
        let joined = upstream
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&joined) {
            headers.insert(name.clone(), value);
        }
    }
    headers
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
