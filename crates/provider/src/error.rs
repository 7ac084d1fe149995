// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider error classification.
//!
//! Every provider and machine-level call resolves to one of these variants.
//! The actor's recovery path keys off [`ProviderError::is_dns_failure`] and
//! [`ProviderError::is_timeout`]: a suspended machine's internal DNS name
//! stops resolving, and a machine mid-boot accepts connections late, so
//! those two signals mean "start the machine and retry".

use thiserror::Error;

/// Classified errors from the compute provider and machine APIs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transient network error: {0}")]
    TransientNetwork(String),
    #[error("machine not found: {0}")]
    NotFound(String),
    #[error("client error ({status}): {body}")]
    ClientError { status: u16, body: String },
    #[error("server error ({status}): {body}")]
    ServerError { status: u16, body: String },
    #[error("request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Classify a reqwest transport failure (no HTTP status available).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(err.to_string());
        }
        Self::TransientNetwork(error_chain(err))
    }

    /// Classify a non-2xx HTTP status.
    ///
    /// `not_found_is_missing` applies the GetMachine rule: only there does a
    /// 404 mean "no such machine" rather than a generic client error.
    pub fn from_status(status: u16, body: String, not_found_is_missing: bool) -> Self {
        match status {
            404 if not_found_is_missing => Self::NotFound(body),
            400..=499 => Self::ClientError { status, body },
            _ => Self::ServerError { status, body },
        }
    }

    /// A transient failure caused by DNS resolution (NXDOMAIN and friends).
    pub fn is_dns_failure(&self) -> bool {
        matches!(self, Self::TransientNetwork(msg) if is_dns_message(msg))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Fabricate the NXDOMAIN-shaped error a suspended machine produces.
    #[cfg(any(test, feature = "test-support"))]
    pub fn nxdomain(host: &str) -> Self {
        Self::TransientNetwork(format!("dns error: failed to lookup address for {host}"))
    }
}

/// Flatten a reqwest error and its sources into one line.
///
/// The DNS failure marker lives several levels down the source chain
/// (hyper connect -> getaddrinfo), so classification needs the whole chain.
fn error_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

fn is_dns_message(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.contains("dns error") || msg.contains("failed to lookup")
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
