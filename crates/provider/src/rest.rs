// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the compute provider's machines REST API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use porter_core::MachineId;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::api::{Machine, ProviderApi};
use crate::error::ProviderError;
use crate::merge::deep_merge;

/// Request timeout for provider REST calls. Machine creation is the slowest
/// verb and completes well under this on the provider side.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider connection settings, from gateway configuration
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base API URL, e.g. `https://api.machines.dev/v1/`
    pub api_url: String,
    pub api_key: String,
    pub app_name: String,
    /// Image booted into every workspace machine
    pub image: String,
    pub region: String,
}

/// Errors building a [`MachinesClient`]
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid provider api url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the provider's machines REST surface.
///
/// All requests carry the configured bearer token. Error mapping: transport
/// failures classify via [`ProviderError::from_transport`], non-2xx statuses
/// via [`ProviderError::from_status`].
#[derive(Clone)]
pub struct MachinesClient {
    http: reqwest::Client,
    base: Url,
    settings: Arc<ProviderSettings>,
}

#[derive(Deserialize)]
struct CreateResponse {
    id: MachineId,
}

impl MachinesClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, ClientBuildError> {
        // Url::join drops the last path segment without a trailing slash
        let normalized = if settings.api_url.ends_with('/') {
            settings.api_url.clone()
        } else {
            format!("{}/", settings.api_url)
        };
        let base = Url::parse(&normalized)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base,
            settings: Arc::new(settings),
        })
    }

    /// Built-in machine-create document, before per-call overrides.
    fn default_create_doc(&self) -> Value {
        json!({
            "region": self.settings.region,
            "config": {
                "image": self.settings.image,
                "guest": {"cpu_kind": "shared", "cpus": 1, "memory_mb": 512},
                "auto_destroy": true,
                "restart": {"policy": "no"},
                "services": [{
                    "protocol": "tcp",
                    "internal_port": 8080,
                    "ports": [{"port": 80, "handlers": ["http"]}],
                }],
                "env": {},
            },
        })
    }

    fn machines_url(&self, suffix: &str) -> Result<Url, ProviderError> {
        let path = format!("apps/{}/machines{}", self.settings.app_name, suffix);
        self.base
            .join(&path)
            .map_err(|e| ProviderError::ClientError {
                status: 0,
                body: format!("invalid request url: {e}"),
            })
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        not_found_is_missing: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let resp = req
            .bearer_auth(&self.settings.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ProviderError::from_status(
            status.as_u16(),
            body,
            not_found_is_missing,
        ))
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = resp.status().as_u16();
    resp.json::<T>()
        .await
        .map_err(|e| ProviderError::ServerError {
            status,
            body: format!("invalid response body: {e}"),
        })
}

#[async_trait]
impl ProviderApi for MachinesClient {
    async fn create_machine(
        &self,
        overrides: Value,
    ) -> Result<MachineId, ProviderError> {
        let doc = deep_merge(self.default_create_doc(), overrides);
        let url = self.machines_url("")?;
        let resp = self.send(self.http.post(url).json(&doc), false).await?;
        let created: CreateResponse = decode(resp).await?;
        info!(machine = %created.id, app = %self.settings.app_name, "created machine");
        Ok(created.id)
    }

    async fn start_machine(&self, id: &MachineId) -> Result<(), ProviderError> {
        let url = self.machines_url(&format!("/{id}/start"))?;
        self.send(self.http.post(url), false).await?;
        info!(machine = %id, "started machine");
        Ok(())
    }

    async fn stop_machine(&self, id: &MachineId) -> Result<(), ProviderError> {
        let url = self.machines_url(&format!("/{id}/stop"))?;
        self.send(self.http.post(url), false).await?;
        info!(machine = %id, "stopped machine");
        Ok(())
    }

    async fn list_machines(&self) -> Result<Vec<Machine>, ProviderError> {
        let url = self.machines_url("")?;
        let resp = self.send(self.http.get(url), false).await?;
        let machines: Vec<Machine> = decode(resp).await?;
        debug!(count = machines.len(), "listed machines");
        Ok(machines)
    }

    async fn get_machine(&self, id: &MachineId) -> Result<Machine, ProviderError> {
        let url = self.machines_url(&format!("/{id}"))?;
        let resp = self.send(self.http.get(url), true).await?;
        decode(resp).await
    }
}

/// Per-call overrides for a workspace machine: the env vars the image uses
/// to clone and serve `github.com/<user>/<repo>`.
pub fn workspace_overrides(user: &str, repo: &str) -> Value {
    json!({
        "config": {
            "env": {
                "USERNAME": user,
                "REPO_NAME": repo,
            },
        },
    })
}
