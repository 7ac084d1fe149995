// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace hostname parsing.
//!
//! Workspace hosts have the form `<user>--<repo>.<base-domain>`: the first
//! DNS label carries the identity, split on a literal `--`. `www.<base>` and
//! the bare base domain are the public site and never classify as
//! workspaces. Multi-dash user or repo names are not supported.

use thiserror::Error;

/// Errors from workspace hostname parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("host is not a workspace subdomain: {0:?}")]
    NotAWorkspace(String),
    #[error("unparseable workspace subdomain: {0:?}")]
    Unparseable(String),
}

/// Parse a request host into `(user, repo)`.
///
/// Returns `NotAWorkspace` when the first label contains no `--` or the
/// label is `www`; those hosts fall through to the application router.
/// Returns `Unparseable` when a `--` is present but the label does not
/// split into exactly two non-empty `[A-Za-z0-9-]+` parts.
pub fn parse_host(host: &str) -> Result<(String, String), HostError> {
    let label = first_label(host);
    if label.eq_ignore_ascii_case("www") || !label.contains("--") {
        return Err(HostError::NotAWorkspace(host.to_string()));
    }
    let Some((user, repo)) = label.split_once("--") else {
        return Err(HostError::Unparseable(host.to_string()));
    };
    if user.is_empty() || repo.is_empty() || repo.contains("--") {
        return Err(HostError::Unparseable(host.to_string()));
    }
    if !is_host_label(user) || !is_host_label(repo) {
        return Err(HostError::Unparseable(host.to_string()));
    }
    Ok((user.to_string(), repo.to_string()))
}

/// Strip the first dot-label from a host, keeping any port.
///
/// `alice--demo.eureka.local:4000` -> `eureka.local:4000`. A single-label
/// host is returned unchanged.
pub fn base_host(host: &str) -> &str {
    let (name, _port) = split_port(host);
    match name.split_once('.') {
        Some((_, rest)) if !rest.is_empty() => &host[name.len() - rest.len()..],
        _ => host,
    }
}

/// Format the workspace host for a `(user, repo)` pair on a base domain.
pub fn workspace_host(user: &str, repo: &str, base: &str) -> String {
    format!("{}--{}.{}", user, repo, base)
}

/// The first DNS label of a host, port excluded.
fn first_label(host: &str) -> &str {
    let (name, _port) = split_port(host);
    name.split('.').next().unwrap_or(name)
}

fn split_port(host: &str) -> (&str, Option<&str>) {
    match host.rsplit_once(':') {
        // Only treat the suffix as a port if it is numeric; IPv6 literals
        // are never workspace hosts, so this is sufficient.
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => (name, Some(port)),
        _ => (host, None),
    }
}

fn is_host_label(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
#[path = "subdomain_tests.rs"]
mod tests;
