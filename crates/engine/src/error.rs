// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for workspace actors

use porter_provider::ProviderError;
use thiserror::Error;

/// Errors surfaced by workspace actor operations
#[derive(Debug, Clone, Error)]
pub enum ActorError {
    /// The workspace has no machine yet and none was provisioned.
    #[error("workspace has no machine")]
    NoMachine,
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// The actor did not reply within the caller's deadline. The actor keeps
    /// running and will finish the operation; only this caller gives up.
    #[error("workspace operation timed out")]
    Deadline,
    /// The actor task is gone (process shutdown).
    #[error("workspace actor closed")]
    Closed,
}
