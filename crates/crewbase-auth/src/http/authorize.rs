//! Authorization endpoint handlers.
//!
//! `GET /oauth/authorize` validates the request and returns the client's
//! display metadata as JSON; the SPA renders the consent screen from it.
//! `POST /oauth/authorize/login` authenticates the user (unless the call
//! already carries a valid bearer token), issues the authorization code,
//! and returns the redirect URL that hands the code back to the requesting
//! application.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, Query, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::middleware::AuthState;
use crate::oauth::authorize::{AuthorizationRequest, AuthorizationResponse};
use crate::oauth::service::{AuthorizationService, ClientMetadata};
use crate::storage::session::SessionStorage;
use crate::storage::user::UserStorage;

/// Shared state for the OAuth and account handlers.
#[derive(Clone)]
pub struct AuthHttpState {
    /// Bearer-auth state: token service, token storage, session versions.
    pub auth: AuthState,
    /// Authorization service for validation and code issuance.
    pub authorization_service: Arc<AuthorizationService>,
    /// User storage for authentication.
    pub user_storage: Arc<dyn UserStorage>,
    /// Authorization session storage for force-logout cleanup.
    pub session_storage: Arc<dyn SessionStorage>,
}

impl FromRef<AuthHttpState> for AuthState {
    fn from_ref(state: &AuthHttpState) -> Self {
        state.auth.clone()
    }
}

/// Raw query parameters of the authorization endpoint.
///
/// All fields are optional at the transport layer so that missing-parameter
/// errors surface as OAuth error payloads instead of deserialization
/// rejections.
#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    #[serde(default)]
    response_type: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl AuthorizeParams {
    fn into_request(self) -> AuthResult<AuthorizationRequest> {
        let response_type = self
            .response_type
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter: response_type"))?;
        let client_id = self
            .client_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter: client_id"))?;
        let redirect_uri = self
            .redirect_uri
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter: redirect_uri"))?;

        Ok(AuthorizationRequest {
            response_type,
            client_id,
            redirect_uri,
            scope: self.scope.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
        })
    }
}

/// `GET /oauth/authorize` handler.
///
/// Validates the authorization request and returns the client display
/// metadata for the consent screen. No code is issued and no state is
/// written by this call.
pub async fn authorize_metadata_handler(
    State(state): State<AuthHttpState>,
    Query(params): Query<AuthorizeParams>,
) -> Result<Json<ClientMetadata>, AuthError> {
    let request = params.into_request()?;
    let metadata = state.authorization_service.client_metadata(&request).await?;
    Ok(Json(metadata))
}

/// Request body for `POST /oauth/authorize/login`.
///
/// Credentials are optional when the call carries a valid bearer token
/// (already-authenticated user approving a new client).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAuthorizeRequest {
    /// Login email (omitted when already authenticated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Login password (omitted when already authenticated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// The client being authorized.
    pub client_id: String,

    /// Redirect URI from the authorization request.
    pub redirect_uri: String,

    /// Requested scopes (space-separated).
    #[serde(default)]
    pub scope: String,

    /// State parameter, echoed on the redirect.
    #[serde(default)]
    pub state: String,
}

/// Response body for `POST /oauth/authorize/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAuthorizeResponse {
    /// Full redirect URL carrying the authorization code and state.
    /// The SPA navigates here directly (full-page redirect).
    pub redirect_url: String,
}

/// `POST /oauth/authorize/login` handler.
///
/// Authenticates the user and issues the authorization code in one step.
/// Credential failures return `access_denied` and are retryable; the SPA
/// keeps the user on the consent screen.
pub async fn login_authorize_handler(
    State(state): State<AuthHttpState>,
    headers: HeaderMap,
    Json(body): Json<LoginAuthorizeRequest>,
) -> Result<Json<LoginAuthorizeResponse>, AuthError> {
    let user_id = resolve_user(&state, &headers, &body).await?;

    let request = AuthorizationRequest {
        response_type: "code".to_string(),
        client_id: body.client_id.clone(),
        redirect_uri: body.redirect_uri.clone(),
        scope: body.scope.clone(),
        state: body.state.clone(),
    };

    let session = state.authorization_service.authorize(&request, user_id).await?;

    let redirect_url =
        AuthorizationResponse::new(session.code.clone(), session.state.clone())
            .to_redirect_url(&session.redirect_uri)
            .map_err(|e| AuthError::internal(format!("Failed to build redirect URL: {e}")))?;

    tracing::info!(
        client_id = %session.client_id,
        user_id = %user_id,
        "Authorization granted"
    );

    Ok(Json(LoginAuthorizeResponse { redirect_url }))
}

/// Resolves the acting user: a valid bearer token wins, otherwise the
/// submitted credentials are verified.
async fn resolve_user(
    state: &AuthHttpState,
    headers: &HeaderMap,
    body: &LoginAuthorizeRequest,
) -> AuthResult<Uuid> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
    {
        match state.auth.token_service.validate_access(token).await {
            Ok((_, user)) => return Ok(user.id),
            Err(e) => {
                // A dead token is not fatal: fall through to credentials.
                tracing::debug!(error = %e, "Ignoring invalid bearer on login+authorize");
            }
        }
    }

    let email = body
        .email
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AuthError::access_denied("Email and password are required"))?;
    let password = body
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AuthError::access_denied("Email and password are required"))?;

    let user = state
        .user_storage
        .find_by_email(email)
        .await?
        .filter(|u| u.is_active())
        .ok_or_else(|| AuthError::access_denied("Invalid email or password"))?;

    if !state.user_storage.verify_password(user.id, password).await? {
        tracing::warn!(user_id = %user.id, "Password verification failed");
        return Err(AuthError::access_denied("Invalid email or password"));
    }

    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_into_request() {
        let params = AuthorizeParams {
            response_type: Some("code".to_string()),
            client_id: Some("dispatch-portal".to_string()),
            redirect_uri: Some("https://dispatch.example.com/callback".to_string()),
            scope: Some("profile".to_string()),
            state: Some("xyz".to_string()),
        };

        let request = params.into_request().unwrap();
        assert_eq!(request.response_type, "code");
        assert_eq!(request.client_id, "dispatch-portal");
        assert_eq!(request.scope, "profile");
    }

    #[test]
    fn test_params_missing_redirect_uri() {
        let params = AuthorizeParams {
            response_type: Some("code".to_string()),
            client_id: Some("dispatch-portal".to_string()),
            redirect_uri: None,
            scope: None,
            state: None,
        };

        let err = params.into_request().unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
        assert!(err.to_string().contains("redirect_uri"));
    }

    #[test]
    fn test_params_missing_client_id() {
        let params = AuthorizeParams {
            response_type: Some("code".to_string()),
            client_id: Some(String::new()),
            redirect_uri: Some("https://dispatch.example.com/callback".to_string()),
            scope: None,
            state: None,
        };

        let err = params.into_request().unwrap_err();
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn test_login_request_wire_format() {
        let json = r#"{
            "email": "driver@fleet.example",
            "password": "secret",
            "clientId": "dispatch-portal",
            "redirectUri": "https://dispatch.example.com/callback",
            "scope": "profile",
            "state": "xyz"
        }"#;

        let request: LoginAuthorizeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email.as_deref(), Some("driver@fleet.example"));
        assert_eq!(request.client_id, "dispatch-portal");
        assert_eq!(request.state, "xyz");
    }

    #[test]
    fn test_login_request_credentials_optional() {
        let json = r#"{
            "clientId": "dispatch-portal",
            "redirectUri": "https://dispatch.example.com/callback"
        }"#;

        let request: LoginAuthorizeRequest = serde_json::from_str(json).unwrap();
        assert!(request.email.is_none());
        assert!(request.password.is_none());
        assert!(request.scope.is_empty());
    }

    #[test]
    fn test_login_response_wire_format() {
        let response = LoginAuthorizeResponse {
            redirect_url: "https://dispatch.example.com/callback?code=abc&state=xyz".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("redirectUrl"));
    }
}
