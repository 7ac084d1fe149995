// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cookie parsing and the workspace session cookie.
//!
//! `workspace_session_id` is set on a wildcard domain (`.<base-domain>`) so
//! the apex and every workspace subdomain share one workspace identity. On
//! `localhost` the Domain attribute is omitted; browsers reject it there.

use http::header::COOKIE;
use http::HeaderMap;
use porter_core::SessionId;

/// Name of the workspace identity cookie
pub const SESSION_COOKIE: &str = "workspace_session_id";

/// Cookie lifetime: one day
const SESSION_MAX_AGE_SECS: u64 = 86_400;

/// Read one cookie value from the request headers.
pub fn get(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let pair = pair.trim();
            if let Some((k, v)) = pair.split_once('=') {
                if k == name {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

/// The workspace session from the request, if any.
pub fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    get(headers, SESSION_COOKIE)
        .filter(|v| !v.is_empty())
        .map(SessionId::new)
}

/// `Set-Cookie` value for a freshly generated workspace session.
///
/// HttpOnly + SameSite=Lax always; Secure only over https; Domain set to
/// `.<base_domain>` except on localhost.
pub fn session_set_cookie(session: &SessionId, base_domain: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; Max-Age={SESSION_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Lax",
        session.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    if !is_localhost(base_domain) {
        cookie.push_str(&format!("; Domain=.{base_domain}"));
    }
    cookie
}

fn is_localhost(base_domain: &str) -> bool {
    let host = base_domain
        .rsplit_once(':')
        .map_or(base_domain, |(name, _)| name);
    host == "localhost" || host == "127.0.0.1" || host == "::1"
}

#[cfg(test)]
#[path = "cookies_tests.rs"]
mod tests;
