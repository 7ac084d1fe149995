// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible error responses

use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;

/// 502 shown while a workspace machine is provisioning or failed to
/// provision. Auto-reloads after 3 s; repeated reloads are the retry loop.
pub fn starting_workspace() -> Response {
    let html = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <meta http-equiv="refresh" content="3">
    <title>Starting workspace</title>
  </head>
  <body>
    <h1>Starting your workspace&hellip;</h1>
    <p>This can take a few seconds. The page reloads automatically.</p>
  </body>
</html>
"#;
    (StatusCode::BAD_GATEWAY, Html(html)).into_response()
}

/// 404 for hosts that parse as workspaces but name an impossible one.
pub fn invalid_workspace() -> Response {
    let html = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Not a workspace</title>
  </head>
  <body>
    <h1>Not a valid workspace subdomain</h1>
    <p>Workspace addresses look like <code>user--repo.your-domain</code>.</p>
  </body>
</html>
"#;
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

/// 502 plain text for hosts with a `--` label that does not parse.
pub fn unparseable_subdomain() -> Response {
    (StatusCode::BAD_GATEWAY, "invalid workspace subdomain").into_response()
}
