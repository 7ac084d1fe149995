// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticator seam.
//!
//! Login and token issuance belong to the upstream OAuth service; the
//! gateway only asks "is there a verified principal on this request". The
//! production impl reads the cookie that service issues. Workspace identity
//! (the `workspace_session_id` cookie) is deliberately independent of this.

use http::HeaderMap;

use crate::cookies;

/// An authenticated principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Opaque subject from the auth cookie
    pub subject: String,
}

/// Source of the authenticated principal for a request
pub trait Authenticator: Send + Sync {
    fn principal(&self, headers: &HeaderMap) -> Option<Principal>;
}

/// Reads the upstream-issued auth cookie.
///
/// A present, non-empty cookie is an authenticated principal; verifying the
/// token's signature and expiry is the issuing service's job (it sits on the
/// same apex domain and owns the login redirect target).
#[derive(Debug, Clone)]
pub struct CookieAuthenticator {
    cookie_name: String,
}

impl CookieAuthenticator {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

impl Authenticator for CookieAuthenticator {
    fn principal(&self, headers: &HeaderMap) -> Option<Principal> {
        let value = cookies::get(headers, &self.cookie_name)?;
        if value.is_empty() {
            return None;
        }
        Some(Principal { subject: value })
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAuthenticator;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Fake authenticator for testing
    #[derive(Clone, Default)]
    pub struct FakeAuthenticator {
        principal: Arc<Mutex<Option<Principal>>>,
    }

    impl FakeAuthenticator {
        /// Authenticates nobody.
        pub fn anonymous() -> Self {
            Self::default()
        }

        /// Authenticates every request as `subject`.
        pub fn logged_in(subject: &str) -> Self {
            let auth = Self::default();
            auth.set(Some(Principal {
                subject: subject.to_string(),
            }));
            auth
        }

        pub fn set(&self, principal: Option<Principal>) {
            *self.principal.lock() = principal;
        }
    }

    impl Authenticator for FakeAuthenticator {
        fn principal(&self, _headers: &HeaderMap) -> Option<Principal> {
            self.principal.lock().clone()
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
