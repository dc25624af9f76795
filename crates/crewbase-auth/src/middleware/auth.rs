//! Bearer token authentication extractor.
//!
//! This module provides the Axum extractor that validates Bearer tokens
//! and extracts authentication context from requests.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use crewbase_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.user.email)
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::storage::session_version::SessionVersionStorage;
use crate::storage::token::TokenStorage;
use crate::token::TokenService;

use super::types::AuthContext;

/// State required for bearer token authentication.
///
/// Include this in your application state and make it available to the
/// `BearerAuth` extractor via `FromRef`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct AppState {
///     auth: AuthState,
///     // ... other state
/// }
///
/// impl FromRef<AppState> for AuthState {
///     fn from_ref(state: &AppState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthState {
    /// Token service for access token validation.
    pub token_service: Arc<TokenService>,

    /// Token storage for raw record lookups (session-version stamping).
    pub token_storage: Arc<dyn TokenStorage>,

    /// Per-user session versions.
    pub version_storage: Arc<dyn SessionVersionStorage>,

    /// Session-version configuration.
    pub session_config: SessionConfig,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(
        token_service: Arc<TokenService>,
        token_storage: Arc<dyn TokenStorage>,
        version_storage: Arc<dyn SessionVersionStorage>,
    ) -> Self {
        Self {
            token_service,
            token_storage,
            version_storage,
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the session-version configuration.
    #[must_use]
    pub fn with_session_config(mut self, session_config: SessionConfig) -> Self {
        self.session_config = session_config;
        self
    }
}

/// Extracts the bearer token from the Authorization header, if present.
pub(crate) fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

/// Axum extractor that validates Bearer tokens and extracts auth context.
///
/// This extractor:
/// 1. Extracts the `Authorization: Bearer <token>` header
/// 2. Validates the opaque token (existence, revocation, expiry)
/// 3. Loads the user and verifies the account is active
/// 4. Rejects tokens whose session version is stale
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) if the header is
/// missing or malformed, or the token fails validation.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?;

        let (record, user) = auth_state
            .token_service
            .validate_access(&token)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Bearer token rejected");
                e
            })?;

        tracing::debug!(
            user_id = %user.id,
            client_id = %record.client_id,
            "Token validated successfully"
        );

        Ok(BearerAuth(AuthContext {
            token: record,
            user,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        assert_eq!(bearer_token(&parts), Some("abc123".to_string()));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let parts = parts_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&parts), None);
    }
}
