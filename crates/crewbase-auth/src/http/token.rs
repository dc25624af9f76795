//! Token endpoint handler.
//!
//! `POST /oauth/token` accepts form-encoded requests per RFC 6749 and
//! supports the `authorization_code` and `refresh_token` grants.

use axum::Json;
use axum::extract::{Form, State};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

use super::authorize::AuthHttpState;

/// Token request parameters.
///
/// Different fields are required depending on the `grant_type`:
///
/// - `authorization_code`: code, redirect_uri, client_id
/// - `refresh_token`: refresh_token, client_id
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    /// One of: "authorization_code", "refresh_token"
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match the authorization request).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Client ID.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "wg2Fq...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "refresh_token": "M9idJ...",
///   "scope": "profile fleet.read"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The opaque access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// The opaque refresh token.
    pub refresh_token: String,

    /// Granted scopes (space-separated).
    pub scope: String,
}

impl From<crate::token::TokenPair> for TokenResponse {
    fn from(pair: crate::token::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
            refresh_token: pair.refresh_token,
            scope: pair.scope,
        }
    }
}

/// `POST /oauth/token` handler.
pub async fn token_handler(
    State(state): State<AuthHttpState>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let client_id = request
        .client_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AuthError::invalid_request("Missing required parameter: client_id"))?;

    let pair = match request.grant_type.as_str() {
        "authorization_code" => {
            let code = request
                .code
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AuthError::invalid_request("Missing required parameter: code"))?;
            let redirect_uri = request.redirect_uri.as_deref().filter(|s| !s.is_empty()).ok_or_else(
                || AuthError::invalid_request("Missing required parameter: redirect_uri"),
            )?;

            state
                .auth
                .token_service
                .exchange_code(code, client_id, redirect_uri)
                .await?
        }
        "refresh_token" => {
            let refresh_token =
                request.refresh_token.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
                    AuthError::invalid_request("Missing required parameter: refresh_token")
                })?;

            state.auth.token_service.refresh(refresh_token, client_id).await?
        }
        other => return Err(AuthError::unsupported_grant_type(other)),
    };

    Ok(Json(pair.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_form_decode() {
        let body = "grant_type=authorization_code&code=abc&redirect_uri=https%3A%2F%2Fapp.example%2Fcb&client_id=dispatch-portal";
        let request: TokenRequest = serde_urlencoded::from_str(body).unwrap();

        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code.as_deref(), Some("abc"));
        assert_eq!(request.redirect_uri.as_deref(), Some("https://app.example/cb"));
        assert_eq!(request.client_id.as_deref(), Some("dispatch-portal"));
        assert!(request.refresh_token.is_none());
    }

    #[test]
    fn test_token_response_serializes_all_fields() {
        let response = TokenResponse {
            access_token: "at".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            refresh_token: "rt".to_string(),
            scope: "profile".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "at");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
        assert_eq!(json["refresh_token"], "rt");
        assert_eq!(json["scope"], "profile");
    }
}
