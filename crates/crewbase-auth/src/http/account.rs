//! Account handlers: password change and administrative force-logout.
//!
//! Both operations advance the target user's session version. Every token
//! issued before the bump becomes stale, and running clients self-evict on
//! the next `X-Session-Version` mismatch they observe.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crewbase_core::Role;

use crate::error::AuthError;
use crate::middleware::BearerAuth;

use super::authorize::AuthHttpState;

/// Request body for `POST /auth/password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// The user's current password.
    pub current_password: String,
    /// The replacement password.
    pub new_password: String,
}

/// `POST /auth/password` handler.
///
/// Changes the caller's password and bumps their session version so that
/// every other device is forced to re-authenticate. The caller's own token
/// goes stale too; the SPA re-authenticates immediately after this call.
pub async fn change_password_handler(
    State(state): State<AuthHttpState>,
    BearerAuth(auth): BearerAuth,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AuthError> {
    if body.new_password.len() < 8 {
        return Err(AuthError::invalid_request(
            "New password must be at least 8 characters",
        ));
    }

    let verified = state
        .user_storage
        .verify_password(auth.user_id(), &body.current_password)
        .await?;
    if !verified {
        return Err(AuthError::access_denied("Current password is incorrect"));
    }

    let new_hash = crate::password::hash_password(&body.new_password)?;
    state
        .user_storage
        .set_password_hash(auth.user_id(), &new_hash)
        .await?;

    let version = state.auth.version_storage.bump(auth.user_id()).await?;

    tracing::info!(
        user_id = %auth.user_id(),
        session_version = %version,
        "Password changed, sessions invalidated"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /auth/users/{id}/force-logout` handler.
///
/// Administrative mass invalidation: bumps the target user's session
/// version and deletes their pending authorization codes. Outstanding
/// tokens are not individually revoked; they go stale by version mismatch.
///
/// Organization admins may only force out members of their own
/// organization; the platform operator may force out anyone.
pub async fn force_logout_handler(
    State(state): State<AuthHttpState>,
    BearerAuth(auth): BearerAuth,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AuthError> {
    if !auth.is_admin() {
        return Err(AuthError::forbidden(
            "Only administrators may force logout",
        ));
    }

    let target = state
        .user_storage
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AuthError::invalid_request(format!("User not found: {user_id}")))?;

    if auth.role() != Role::SuperAdmin && auth.user.organization_id != target.organization_id {
        return Err(AuthError::forbidden(
            "Cannot force logout outside your organization",
        ));
    }

    let version = state.auth.version_storage.bump(target.id).await?;
    let dropped = state.session_storage.delete_by_user(target.id).await?;

    tracing::info!(
        admin_id = %auth.user_id(),
        user_id = %target.id,
        session_version = %version,
        pending_codes_dropped = dropped,
        "Forced logout"
    );

    Ok(StatusCode::NO_CONTENT)
}
