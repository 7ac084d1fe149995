// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! porter-core: Core types for the Porter workspace gateway

pub mod id;
pub mod key;
pub mod subdomain;
pub mod upstream;

pub use id::{MachineId, SessionId};
pub use key::{KeyError, WorkspaceKey};
pub use subdomain::{base_host, parse_host, workspace_host, HostError};
pub use upstream::{UpstreamAuthority, DEFAULT_UPSTREAM_TEMPLATE};
