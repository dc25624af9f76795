//! OAuth authorization service.
//!
//! This module provides the authorization service that validates
//! authorization requests, produces consent-screen metadata, and creates
//! single-use code sessions once the user has approved.
//!
//! # Usage
//!
//! ```ignore
//! use crewbase_auth::oauth::{AuthorizationService, AuthorizeConfig};
//!
//! let service = AuthorizationService::new(client_storage, session_storage, AuthorizeConfig::default());
//!
//! // Consent screen data for GET /oauth/authorize
//! let metadata = service.client_metadata(&request).await?;
//!
//! // Code issuance after the user approved
//! let session = service.authorize(&request, user_id).await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::authorize::AuthorizationRequest;
use crate::oauth::session::AuthorizationSession;
use crate::storage::ClientStorage;
use crate::storage::session::SessionStorage;
use crate::types::Client;

/// Display metadata for the consent screen.
///
/// Returned by the authorization endpoint so the SPA can render what the
/// user is approving. Contains no secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    /// The client identifier.
    pub client_id: String,

    /// Display name of the requesting application.
    pub name: String,

    /// Description of the requesting application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Logo URL for the consent screen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// The scopes the client is requesting.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Configuration for the authorization service.
#[derive(Debug, Clone)]
pub struct AuthorizeConfig {
    /// Authorization code lifetime.
    /// Default: 10 minutes (as recommended by the OAuth 2.0 spec).
    pub code_lifetime: Duration,
}

impl Default for AuthorizeConfig {
    fn default() -> Self {
        Self {
            code_lifetime: Duration::minutes(10),
        }
    }
}

impl AuthorizeConfig {
    /// Creates a new configuration with a custom code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.code_lifetime = lifetime;
        self
    }
}

/// Authorization service for handling OAuth 2.0 authorization requests.
pub struct AuthorizationService {
    /// Client storage for looking up registered clients.
    client_storage: Arc<dyn ClientStorage>,

    /// Session storage for persisting code sessions.
    session_storage: Arc<dyn SessionStorage>,

    /// Service configuration.
    config: AuthorizeConfig,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        session_storage: Arc<dyn SessionStorage>,
        config: AuthorizeConfig,
    ) -> Self {
        Self {
            client_storage,
            session_storage,
            config,
        }
    }

    /// Validates an authorization request and returns consent metadata.
    ///
    /// This backs the initial `GET /oauth/authorize` call: the request is
    /// fully validated but no code is issued and no state is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `response_type` is not "code" (`UnsupportedResponseType`)
    /// - `client_id` or `redirect_uri` is empty (`InvalidRequest`)
    /// - Client is not found or inactive (`InvalidClient`)
    /// - Redirect URI is not registered for the client (`InvalidGrant`)
    /// - A requested scope is not allowed for the client (`InvalidScope`)
    pub async fn client_metadata(
        &self,
        request: &AuthorizationRequest,
    ) -> AuthResult<ClientMetadata> {
        let client = self.validate_request(request).await?;

        Ok(ClientMetadata {
            client_id: client.client_id,
            name: client.name,
            description: client.description,
            logo_url: client.logo_url,
            scopes: request
                .scope
                .split_whitespace()
                .map(ToString::to_string)
                .collect(),
        })
    }

    /// Processes an approved authorization request.
    ///
    /// Re-validates the request, then creates and stores a single-use code
    /// session bound to the client, redirect URI, scope, and user.
    ///
    /// # Security
    ///
    /// - Never log the authorization code
    /// - Redirect URI must exactly match a registered URI
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as [`Self::client_metadata`],
    /// plus storage errors from session creation.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        user_id: Uuid,
    ) -> AuthResult<AuthorizationSession> {
        self.validate_request(request).await?;

        let now = OffsetDateTime::now_utc();
        let session = AuthorizationSession {
            id: Uuid::new_v4(),
            code: AuthorizationSession::generate_code(),
            client_id: request.client_id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            scope: request.scope.clone(),
            state: request.state.clone(),
            user_id,
            created_at: now,
            expires_at: now + self.config.code_lifetime,
            consumed_at: None,
        };

        self.session_storage.create(&session).await?;

        tracing::debug!(
            client_id = %session.client_id,
            user_id = %session.user_id,
            "Authorization code issued"
        );

        Ok(session)
    }

    /// Runs the shared validation sequence and returns the client.
    async fn validate_request(&self, request: &AuthorizationRequest) -> AuthResult<Client> {
        // 1. Required parameters
        if request.client_id.is_empty() {
            return Err(AuthError::invalid_request(
                "Missing required parameter: client_id",
            ));
        }
        if request.redirect_uri.is_empty() {
            return Err(AuthError::invalid_request(
                "Missing required parameter: redirect_uri",
            ));
        }

        // 2. Response type
        if request.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        // 3. Client exists and is active
        let client = self
            .client_storage
            .find_by_client_id(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

        if !client.active {
            return Err(AuthError::invalid_client("Client is inactive"));
        }

        // 4. Redirect URI is on the allowlist
        if !client.is_redirect_uri_allowed(&request.redirect_uri) {
            return Err(AuthError::invalid_grant("Invalid redirect_uri"));
        }

        // 5. Requested scopes are allowed
        for scope in request.scope.split_whitespace() {
            if !client.is_scope_allowed(scope) {
                return Err(AuthError::invalid_scope(format!(
                    "Scope '{scope}' is not allowed for this client"
                )));
            }
        }

        Ok(client)
    }

    /// Gets the session storage reference.
    #[must_use]
    pub fn session_storage(&self) -> &Arc<dyn SessionStorage> {
        &self.session_storage
    }

    /// Gets the client storage reference.
    #[must_use]
    pub fn client_storage(&self) -> &Arc<dyn ClientStorage> {
        &self.client_storage
    }

    /// Gets the service configuration.
    #[must_use]
    pub fn config(&self) -> &AuthorizeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::{InMemoryClientStorage, InMemorySessionStorage};

    fn create_test_client() -> Client {
        Client {
            client_id: "dispatch-portal".to_string(),
            client_secret_hash: None,
            name: "Dispatch Portal".to_string(),
            description: Some("Partner dispatch integration".to_string()),
            logo_url: Some("https://cdn.crewbase.dev/logos/dispatch.png".to_string()),
            redirect_uris: vec!["https://dispatch.example.com/callback".to_string()],
            scopes: vec![],
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        }
    }

    fn create_test_request() -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: "code".to_string(),
            client_id: "dispatch-portal".to_string(),
            redirect_uri: "https://dispatch.example.com/callback".to_string(),
            scope: "profile fleet.read".to_string(),
            state: "abc123xyz".to_string(),
        }
    }

    async fn create_service() -> (
        AuthorizationService,
        Arc<InMemoryClientStorage>,
        Arc<InMemorySessionStorage>,
    ) {
        let client_storage = Arc::new(InMemoryClientStorage::new());
        let session_storage = Arc::new(InMemorySessionStorage::new());

        let service = AuthorizationService::new(
            client_storage.clone(),
            session_storage.clone(),
            AuthorizeConfig::default(),
        );

        (service, client_storage, session_storage)
    }

    #[tokio::test]
    async fn test_client_metadata_success() {
        let (service, client_storage, _) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let metadata = service
            .client_metadata(&create_test_request())
            .await
            .unwrap();

        assert_eq!(metadata.client_id, "dispatch-portal");
        assert_eq!(metadata.name, "Dispatch Portal");
        assert_eq!(
            metadata.logo_url,
            Some("https://cdn.crewbase.dev/logos/dispatch.png".to_string())
        );
        assert_eq!(metadata.scopes, vec!["profile", "fleet.read"]);
    }

    #[tokio::test]
    async fn test_client_metadata_writes_nothing() {
        let (service, client_storage, session_storage) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let request = create_test_request();
        service.client_metadata(&request).await.unwrap();

        // No code session is created by the metadata call
        assert_eq!(session_storage.cleanup_expired().await.unwrap(), 0);
        assert!(
            session_storage
                .find_by_code("any")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_authorize_success() {
        let (service, client_storage, session_storage) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let user_id = Uuid::new_v4();
        let session = service
            .authorize(&create_test_request(), user_id)
            .await
            .unwrap();

        assert_eq!(session.client_id, "dispatch-portal");
        assert_eq!(session.redirect_uri, "https://dispatch.example.com/callback");
        assert_eq!(session.scope, "profile fleet.read");
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.code.len(), 43);
        assert!(session.is_valid());

        let stored = session_storage.find_by_code(&session.code).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_missing_client_id() {
        let (service, client_storage, _) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let mut request = create_test_request();
        request.client_id = String::new();

        let result = service.client_metadata(&request).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_missing_redirect_uri() {
        let (service, client_storage, _) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let mut request = create_test_request();
        request.redirect_uri = String::new();

        let result = service.client_metadata(&request).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_invalid_response_type() {
        let (service, client_storage, _) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let mut request = create_test_request();
        request.response_type = "token".to_string();

        let result = service.client_metadata(&request).await;
        assert!(matches!(
            result,
            Err(AuthError::UnsupportedResponseType { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let (service, _, _) = create_service().await;

        let result = service.client_metadata(&create_test_request()).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_inactive_client() {
        let (service, client_storage, _) = create_service().await;
        let mut client = create_test_client();
        client.active = false;
        client_storage.create(&client).await.unwrap();

        let result = service.client_metadata(&create_test_request()).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_unregistered_redirect_uri() {
        let (service, client_storage, _) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let mut request = create_test_request();
        request.redirect_uri = "https://evil.example.com/callback".to_string();

        let result = service.client_metadata(&request).await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_scope_not_allowed() {
        let (service, client_storage, _) = create_service().await;
        let mut client = create_test_client();
        client.scopes = vec!["profile".to_string()];
        client_storage.create(&client).await.unwrap();

        let mut request = create_test_request();
        request.scope = "profile fleet.write".to_string();

        let result = service.client_metadata(&request).await;
        assert!(matches!(result, Err(AuthError::InvalidScope { .. })));
    }

    #[tokio::test]
    async fn test_authorize_validates_too() {
        let (service, client_storage, _) = create_service().await;
        client_storage.create(&create_test_client()).await.unwrap();

        let mut request = create_test_request();
        request.redirect_uri = "https://evil.example.com/callback".to_string();

        let result = service.authorize(&request, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[test]
    fn test_config_builder() {
        let config = AuthorizeConfig::default().with_code_lifetime(Duration::minutes(5));
        assert_eq!(config.code_lifetime, Duration::minutes(5));
    }
}
