//! Session-version response stamping.
//!
//! Stamps the `X-Session-Version` header onto every response to a request
//! that carried a bearer token mapping to a known user. Clients cache the
//! first observed value and force a logout when a later response disagrees,
//! which is how a server-side version bump propagates to running clients.
//!
//! The stamp is applied regardless of the response status so that even a
//! rejected request tells the client the current version.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use crewbase_core::SESSION_VERSION_HEADER;

use crate::types::hash_token;

use super::auth::AuthState;

/// Middleware that stamps the current session version onto responses.
///
/// Apply with `axum::middleware::from_fn_with_state(auth_state, stamp_session_version)`.
pub async fn stamp_session_version(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.session_config.version_header_enabled {
        return next.run(request).await;
    }

    // Resolve the token to a user before the request is consumed by the
    // handler chain. Validation outcomes are left to the extractor; the
    // stamp only needs to know whose version to report.
    let user_id = match request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
    {
        Some(token) => {
            let token_hash = hash_token(token);
            match state.token_storage.find_access_token(&token_hash).await {
                Ok(Some(record)) => Some(record.user_id),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Session-version lookup failed");
                    None
                }
            }
        }
        None => None,
    };

    let mut response = next.run(request).await;

    if let Some(user_id) = user_id {
        match state.version_storage.current(user_id).await {
            Ok(version) => {
                if let Ok(value) = HeaderValue::from_str(&version.to_string()) {
                    response.headers_mut().insert(SESSION_VERSION_HEADER, value);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Session-version read failed");
            }
        }
    }

    response
}
