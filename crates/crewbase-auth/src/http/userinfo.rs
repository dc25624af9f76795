//! Authenticated user info handler.
//!
//! `GET /auth/me` returns the profile of the token's subject. The SPA
//! calls this after login to populate the session.

use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crewbase_core::Role;

use crate::error::AuthError;
use crate::middleware::BearerAuth;

/// Response body for `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    /// The user's unique identifier.
    pub id: Uuid,

    /// Login email.
    pub email: String,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Platform role.
    pub role: Role,

    /// Organization the user belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,

    /// Scopes granted to the presenting token.
    pub scopes: Vec<String>,
}

/// `GET /auth/me` handler.
pub async fn me_handler(BearerAuth(auth): BearerAuth) -> Result<Json<UserInfoResponse>, AuthError> {
    let scopes = auth.scopes().map(ToString::to_string).collect();
    Ok(Json(UserInfoResponse {
        id: auth.user.id,
        email: auth.user.email.clone(),
        name: auth.user.name.clone(),
        role: auth.role(),
        organization_id: auth.user.organization_id,
        scopes,
    }))
}
