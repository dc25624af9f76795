//! Logout handler.
//!
//! Revokes the presented access token (and, when supplied, the refresh
//! token). The client clears its persisted bearer token and cached session
//! version after this call.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::middleware::BearerAuth;

use super::authorize::AuthHttpState;

/// Request body for `POST /auth/logout`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// Refresh token to revoke alongside the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// `POST /auth/logout` handler.
pub async fn logout_handler(
    State(state): State<AuthHttpState>,
    BearerAuth(auth): BearerAuth,
    body: Option<Json<LogoutRequest>>,
) -> Result<StatusCode, AuthError> {
    state
        .auth
        .token_storage
        .revoke_access_token(&auth.token.token_hash)
        .await?;

    if let Some(Json(request)) = body
        && let Some(refresh_token) = request.refresh_token.as_deref().filter(|t| !t.is_empty())
    {
        state
            .auth
            .token_storage
            .revoke_refresh_token(&crate::types::hash_token(refresh_token))
            .await?;
    }

    tracing::info!(user_id = %auth.user_id(), "User logged out");

    Ok(StatusCode::NO_CONTENT)
}
