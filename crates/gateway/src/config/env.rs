// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the gateway.

use std::path::PathBuf;

use super::Config;

/// Config file path: `PORTER_CONFIG` > `./porter.toml`
pub(super) fn config_path() -> PathBuf {
    std::env::var("PORTER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("porter.toml"))
}

/// Apply `PORTER_*` overrides on top of the loaded file.
///
/// The API key override exists so the secret can stay out of the config
/// file; the rest are deployment conveniences.
pub(super) fn apply_overrides(config: &mut Config) {
    if let Ok(addr) = std::env::var("PORTER_LISTEN_ADDR") {
        config.listen_addr = addr;
    }
    if let Ok(domain) = std::env::var("PORTER_BASE_DOMAIN") {
        config.base_domain = domain;
    }
    if let Ok(dir) = std::env::var("PORTER_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(key) = std::env::var("PORTER_PROVIDER_API_KEY") {
        config.provider.api_key = key;
    }
    if let Ok(secs) = std::env::var("PORTER_INACTIVITY_TIMEOUT_SECS") {
        if let Ok(secs) = secs.parse() {
            config.inactivity_timeout_secs = secs;
        }
    }
}
