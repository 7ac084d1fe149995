// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace identity: the `(session, user, repo)` triple.
//!
//! A [`WorkspaceKey`] maps to at most one upstream machine. Two requests
//! carrying the same triple must reach the same machine, so the key is both
//! the actor-registry key and the state-store path. Every component is
//! validated at construction; nothing downstream re-checks hostname or
//! filesystem safety.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::SessionId;

/// Errors from workspace key validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("empty {0}")]
    Empty(&'static str),
    #[error("invalid character in {component}: {value:?}")]
    InvalidCharacter { component: &'static str, value: String },
    #[error("{component} must not contain '--': {value:?}")]
    DoubleDash { component: &'static str, value: String },
}

/// Identity of one workspace: `(session, user, repo)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceKey {
    pub session: SessionId,
    pub user: String,
    pub repo: String,
}

impl WorkspaceKey {
    /// Build a validated key.
    ///
    /// `user` and `repo` must match `[A-Za-z0-9-]+` and must not contain
    /// `--` (the subdomain separator). The session id must be non-empty and
    /// restricted to the base64url alphabet, which keeps every component
    /// safe to use as a path segment.
    pub fn new(
        session: SessionId,
        user: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let user = user.into();
        let repo = repo.into();
        validate_session(session.as_str())?;
        validate_label("user", &user)?;
        validate_label("repo", &repo)?;
        Ok(Self { session, user, repo })
    }
}

impl std::fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}--{}@{}", self.user, self.repo, self.session)
    }
}

fn validate_session(session: &str) -> Result<(), KeyError> {
    if session.is_empty() {
        return Err(KeyError::Empty("session"));
    }
    if !session
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(KeyError::InvalidCharacter {
            component: "session",
            value: session.to_string(),
        });
    }
    Ok(())
}

fn validate_label(component: &'static str, value: &str) -> Result<(), KeyError> {
    if value.is_empty() {
        return Err(KeyError::Empty(component));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(KeyError::InvalidCharacter {
            component,
            value: value.to_string(),
        });
    }
    if value.contains("--") {
        return Err(KeyError::DoubleDash {
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
