//! Error response handling for authentication middleware.
//!
//! This module implements `IntoResponse` for `AuthError`, producing
//! OAuth-style JSON error bodies.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let oauth_error = self.oauth_error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        }

        let body = json!({
            "error": oauth_error,
            "error_description": message,
        });

        let mut headers = HeaderMap::new();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(oauth_error, &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an AuthError to an HTTP status code.
fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::InvalidClient { .. } => StatusCode::UNAUTHORIZED,
        AuthError::InvalidGrant { .. } => StatusCode::BAD_REQUEST,
        AuthError::InvalidScope { .. } => StatusCode::FORBIDDEN,
        AuthError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
        AuthError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
        AuthError::StaleSession => StatusCode::UNAUTHORIZED,
        AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AuthError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        AuthError::UnsupportedResponseType { .. } => StatusCode::BAD_REQUEST,
        AuthError::UnsupportedGrantType { .. } => StatusCode::BAD_REQUEST,
        AuthError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
///
/// Format: `Bearer realm="crewbase", error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!(
        "Bearer realm=\"crewbase\", error=\"{error}\", error_description=\"{escaped_desc}\""
    )
}
