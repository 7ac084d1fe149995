// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Porter gateway: subdomain router and streaming reverse proxy.
//!
//! Requests to `<user>--<repo>.<base-domain>` are authenticated, mapped to a
//! workspace actor via the `workspace_session_id` cookie, and streamed to
//! that workspace's machine. Everything else falls through to the
//! application router.

pub mod auth;
pub mod config;
pub mod cookies;
mod pages;
mod proxy;
mod router;

pub use auth::{Authenticator, CookieAuthenticator, Principal};
pub use config::{Config, ConfigError};
pub use router::{build_router, AppState};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use auth::FakeAuthenticator;
