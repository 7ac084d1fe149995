// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream machine addressing.
//!
//! A started machine is reachable over the provider's private network at
//! `<machine_id>.vm.<app>.internal:8080`. The authority is templated so
//! tests can point it at a local listener instead of the `.internal` zone.

use crate::id::MachineId;

/// Default authority template for the provider's internal DNS zone.
pub const DEFAULT_UPSTREAM_TEMPLATE: &str = "{machine}.vm.{app}.internal:8080";

/// Resolves a machine id to the host:port its HTTP API listens on.
#[derive(Debug, Clone)]
pub struct UpstreamAuthority {
    template: String,
    app: String,
}

impl UpstreamAuthority {
    pub fn new(template: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            app: app.into(),
        }
    }

    /// The default `.internal` addressing for an app.
    pub fn internal(app: impl Into<String>) -> Self {
        Self::new(DEFAULT_UPSTREAM_TEMPLATE, app)
    }

    /// `host:port` for one machine.
    pub fn authority(&self, machine: &MachineId) -> String {
        self.template
            .replace("{machine}", machine.as_str())
            .replace("{app}", &self.app)
    }

    /// Full `http://` URL for a machine plus a path-and-query suffix.
    ///
    /// `path_and_query` must start with `/`.
    pub fn http_url(&self, machine: &MachineId, path_and_query: &str) -> String {
        format!("http://{}{}", self.authority(machine), path_and_query)
    }
}

#[cfg(test)]
#[path = "upstream_tests.rs"]
mod tests;
