//! Bearer-token authentication middleware.
//!
//! Every request passes through here before any tool logic runs. The public
//! routes are a fixed set decided at startup; everything else requires
//! `Authorization: Bearer <token>` with a token present in the store file.
//! The file is re-read on every check so an out-of-band revocation takes
//! effect immediately, and an unreadable store denies everything rather than
//! crashing. The response never says whether a token was missing, malformed
//! or simply unknown, and token values are never logged.

use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tome_core::TokenStore;

/// Routes reachable without a token.
const PUBLIC: &[(&str, &str)] = &[("/", "GET"), ("/health", "GET")];

/// Whether a (path, method) pair bypasses authentication.
pub fn is_public(path: &str, method: &Method) -> bool {
    PUBLIC
        .iter()
        .any(|(p, m)| *p == path && *m == method.as_str())
}

/// Extract the token from an Authorization header value. Only the exact
/// `Bearer <token>` scheme is accepted; surrounding whitespace is trimmed.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Middleware enforcing bearer auth on all non-public routes.
pub async fn require_bearer(
    State(store): State<Arc<TokenStore>>,
    request: Request,
    next: Next,
) -> Response {
    if is_public(request.uri().path(), request.method()) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    match token {
        Some(token) if store.is_valid(token).await => next.run(request).await,
        _ => unauthorized(),
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}
