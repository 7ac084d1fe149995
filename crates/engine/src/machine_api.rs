// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for calls against a workspace machine's own HTTP API.
//!
//! These are the operations the actor runs *inside* a booted machine, as
//! opposed to the provider's lifecycle verbs. They share the provider error
//! classification so the suspended-machine recovery predicate (DNS failure
//! or timeout) applies uniformly.

use std::time::Duration;

use async_trait::async_trait;
use porter_core::{MachineId, UpstreamAuthority};
use porter_provider::ProviderError;
use serde_json::Value;

/// Deadline for one machine-level call. Machines answer fast once booted;
/// anything slower is treated as "suspended or still booting".
const MACHINE_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Adapter for a machine's internal HTTP API
#[async_trait]
pub trait MachineApi: Clone + Send + Sync + 'static {
    /// List the live sessions inside the machine (`GET /api/sessions`).
    async fn list_sessions(&self, id: &MachineId) -> Result<Value, ProviderError>;
}

/// Production machine API client over the provider's internal network
#[derive(Clone)]
pub struct HttpMachineApi {
    http: reqwest::Client,
    upstream: UpstreamAuthority,
}

impl HttpMachineApi {
    pub fn new(upstream: UpstreamAuthority) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(MACHINE_CALL_TIMEOUT)
            .build()?;
        Ok(Self { http, upstream })
    }
}

#[async_trait]
impl MachineApi for HttpMachineApi {
    async fn list_sessions(&self, id: &MachineId) -> Result<Value, ProviderError> {
        let url = self.upstream.http_url(id, "/api/sessions");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body, false));
        }
        resp.json().await.map_err(|e| ProviderError::ServerError {
            status: status.as_u16(),
            body: format!("invalid response body: {e}"),
        })
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMachineApi, MachineCall};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    /// Recorded machine API call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MachineCall {
        ListSessions { id: MachineId },
    }

    #[derive(Default)]
    struct FakeMachineState {
        calls: Vec<MachineCall>,
        results: VecDeque<Result<Value, ProviderError>>,
    }

    /// Fake machine API for testing.
    ///
    /// Serves scripted results in order; once the script is exhausted every
    /// call succeeds with an empty session list.
    #[derive(Clone, Default)]
    pub struct FakeMachineApi {
        inner: Arc<Mutex<FakeMachineState>>,
    }

    impl FakeMachineApi {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the result for the next call.
        pub fn push_result(&self, result: Result<Value, ProviderError>) {
            self.inner.lock().results.push_back(result);
        }

        pub fn calls(&self) -> Vec<MachineCall> {
            self.inner.lock().calls.clone()
        }

        pub fn call_count(&self) -> usize {
            self.inner.lock().calls.len()
        }
    }

    #[async_trait]
    impl MachineApi for FakeMachineApi {
        async fn list_sessions(&self, id: &MachineId) -> Result<Value, ProviderError> {
            let mut state = self.inner.lock();
            state.calls.push(MachineCall::ListSessions { id: id.clone() });
            state
                .results
                .pop_front()
                .unwrap_or_else(|| Ok(json!({"sessions": []})))
        }
    }
}
