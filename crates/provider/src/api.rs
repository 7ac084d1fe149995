// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider adapter trait and wire types

use std::collections::HashMap;

use async_trait::async_trait;
use porter_core::MachineId;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Machine configuration as reported by the provider.
///
/// Only the fields porter reads are modeled; the provider sends more.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// A machine as reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub config: MachineConfig,
}

impl Machine {
    /// True when this machine was booted for the given user/repo pair.
    ///
    /// Used to adopt an orphaned machine after local state is lost.
    pub fn matches_workspace(&self, user: &str, repo: &str) -> bool {
        self.config.env.get("USERNAME").is_some_and(|u| u == user)
            && self.config.env.get("REPO_NAME").is_some_and(|r| r == repo)
    }
}

/// Adapter for the compute provider's machines API
#[async_trait]
pub trait ProviderApi: Clone + Send + Sync + 'static {
    /// Create a machine from the default config deep-merged with `overrides`.
    ///
    /// Overrides must at minimum set `env.USERNAME` and `env.REPO_NAME`.
    /// Returns the provider-assigned machine id.
    async fn create_machine(&self, overrides: serde_json::Value)
        -> Result<MachineId, ProviderError>;

    /// Start a stopped machine.
    async fn start_machine(&self, id: &MachineId) -> Result<(), ProviderError>;

    /// Stop a running machine. The id stays valid for a later start.
    async fn stop_machine(&self, id: &MachineId) -> Result<(), ProviderError>;

    /// List all machines in the app.
    async fn list_machines(&self) -> Result<Vec<Machine>, ProviderError>;

    /// Fetch one machine by id. 404 maps to [`ProviderError::NotFound`].
    async fn get_machine(&self, id: &MachineId) -> Result<Machine, ProviderError>;
}
