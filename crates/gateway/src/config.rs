// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway configuration: a TOML file plus `PORTER_*` env overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

mod env;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the HTTP listener binds
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Apex host; workspace hosts are `<user>--<repo>.<base_domain>`
    pub base_domain: String,
    /// Root of the per-workspace state files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Daemon log file; stderr when unset
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    /// Seconds of idle time before a workspace machine is suspended
    #[serde(default = "default_inactivity_secs")]
    pub inactivity_timeout_secs: u64,
    pub provider: ProviderSection,
    #[serde(default)]
    pub proxy: ProxySection,
    #[serde(default)]
    pub auth: AuthSection,
}

/// Compute provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSection {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub api_key: String,
    pub app_name: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_region")]
    pub region: String,
}

/// Reverse proxy settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySection {
    /// Largest request body forwarded upstream, in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
    /// Seconds without an upstream chunk before a stream is terminated
    #[serde(default = "default_chunk_idle_secs")]
    pub chunk_idle_timeout_secs: u64,
    /// Upstream connect timeout in seconds
    #[serde(default = "default_connect_secs")]
    pub connect_timeout_secs: u64,
    /// Authority template for machine addresses. `{machine}` and `{app}`
    /// are substituted; defaults to the provider's `.internal` zone.
    #[serde(default)]
    pub upstream_authority: Option<String>,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            body_limit: default_body_limit(),
            chunk_idle_timeout_secs: default_chunk_idle_secs(),
            connect_timeout_secs: default_connect_secs(),
            upstream_authority: None,
        }
    }
}

/// Authenticator settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    /// Name of the cookie issued by the upstream login service
    #[serde(default = "default_auth_cookie")]
    pub cookie_name: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            cookie_name: default_auth_cookie(),
        }
    }
}

impl Config {
    /// Load from the path in `PORTER_CONFIG` (default `porter.toml`),
    /// then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::config_path();
        let mut config = Self::load_file(&path)?;
        env::apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_domain.is_empty() {
            return Err(ConfigError::Missing("base_domain"));
        }
        if self.provider.api_key.is_empty() {
            return Err(ConfigError::Missing("provider.api_key"));
        }
        if self.provider.app_name.is_empty() {
            return Err(ConfigError::Missing("provider.app_name"));
        }
        Ok(())
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

impl ProxySection {
    pub fn chunk_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_idle_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:4000".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_inactivity_secs() -> u64 {
    30 * 60
}

fn default_api_url() -> String {
    "https://api.machines.dev/v1".to_string()
}

fn default_image() -> String {
    "registry.fly.io/porter-workspace:latest".to_string()
}

fn default_region() -> String {
    "iad".to_string()
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_chunk_idle_secs() -> u64 {
    60
}

fn default_connect_secs() -> u64 {
    60
}

fn default_auth_cookie() -> String {
    "porter_auth".to_string()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
