//! Token service for issuing and validating opaque tokens.
//!
//! This module handles the OAuth 2.0 token operations:
//!
//! - Authorization code exchange
//! - Refresh token rotation
//! - Access token validation, including session-version staleness
//!
//! Tokens are opaque 256-bit random values. Issuance stamps each access
//! token with the user's current session version; validation compares the
//! stamp against the current version, so a single counter bump invalidates
//! every outstanding token for that user.
//!
//! # Usage
//!
//! ```ignore
//! use crewbase_auth::token::{TokenService, TokenConfig};
//!
//! let service = TokenService::new(
//!     session_storage,
//!     token_storage,
//!     user_storage,
//!     version_storage,
//!     TokenConfig::default(),
//! );
//!
//! let pair = service.exchange_code(&code, "dispatch-portal", &redirect_uri).await?;
//! ```

use std::sync::Arc;

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::session::SessionStorage;
use crate::storage::session_version::SessionVersionStorage;
use crate::storage::token::TokenStorage;
use crate::storage::user::{User, UserStorage};
use crate::types::{AccessTokenRecord, RefreshTokenRecord, generate_token, hash_token};

/// Issued token pair returned to the client.
///
/// The plaintext values exist only in this response; storage holds hashes.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
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

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Default access token lifetime.
    pub access_token_lifetime: Duration,

    /// Default refresh token lifetime.
    pub refresh_token_lifetime: Duration,

    /// Whether to rotate refresh tokens on use.
    /// When true, the old token is revoked and a new one is issued.
    pub rotate_refresh_tokens: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::hours(1),
            refresh_token_lifetime: Duration::days(90),
            rotate_refresh_tokens: true,
        }
    }
}

impl TokenConfig {
    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets whether to rotate refresh tokens on use.
    #[must_use]
    pub fn with_rotate_refresh_tokens(mut self, rotate: bool) -> Self {
        self.rotate_refresh_tokens = rotate;
        self
    }
}

/// Token service for issuing and validating opaque tokens.
pub struct TokenService {
    /// Session storage for authorization codes.
    session_storage: Arc<dyn SessionStorage>,

    /// Token record storage.
    token_storage: Arc<dyn TokenStorage>,

    /// User storage for loading the token subject.
    user_storage: Arc<dyn UserStorage>,

    /// Per-user session versions.
    version_storage: Arc<dyn SessionVersionStorage>,

    /// Service configuration.
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        session_storage: Arc<dyn SessionStorage>,
        token_storage: Arc<dyn TokenStorage>,
        user_storage: Arc<dyn UserStorage>,
        version_storage: Arc<dyn SessionVersionStorage>,
        config: TokenConfig,
    ) -> Self {
        Self {
            session_storage,
            token_storage,
            user_storage,
            version_storage,
            config,
        }
    }

    /// Exchanges an authorization code for a token pair.
    ///
    /// The code is consumed atomically; replays fail. The code's bindings
    /// (client and redirect URI) must match the token request exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code is unknown, consumed, or expired (`InvalidGrant`)
    /// - The client or redirect URI doesn't match the code (`InvalidGrant`)
    /// - The user no longer exists or is inactive (`InvalidGrant`)
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        redirect_uri: &str,
    ) -> AuthResult<TokenPair> {
        let session = self.session_storage.consume(code).await?;

        if session.client_id != client_id {
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to a different client",
            ));
        }
        if session.redirect_uri != redirect_uri {
            return Err(AuthError::invalid_grant(
                "redirect_uri does not match the authorization request",
            ));
        }

        let user = self.load_active_user(session.user_id).await?;

        tracing::info!(
            client_id = %session.client_id,
            user_id = %user.id,
            "Authorization code exchanged"
        );

        self.issue_pair(&user, client_id, &session.scope).await
    }

    /// Refreshes a token pair.
    ///
    /// With rotation enabled (the default) the presented refresh token is
    /// revoked and a new one issued, so token theft is detectable by the
    /// legitimate client's next refresh failing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The refresh token is unknown, expired, or revoked (`InvalidGrant`)
    /// - The token belongs to a different client (`InvalidGrant`)
    /// - The user no longer exists or is inactive (`InvalidGrant`)
    pub async fn refresh(&self, refresh_token: &str, client_id: &str) -> AuthResult<TokenPair> {
        let token_hash = hash_token(refresh_token);

        let record = self
            .token_storage
            .find_refresh_token(&token_hash)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Unknown refresh token"))?;

        if record.client_id != client_id {
            return Err(AuthError::invalid_grant(
                "Refresh token was issued to a different client",
            ));
        }
        if record.is_revoked() {
            return Err(AuthError::invalid_grant("Refresh token has been revoked"));
        }
        if record.is_expired() {
            return Err(AuthError::invalid_grant("Refresh token has expired"));
        }

        let user = self.load_active_user(record.user_id).await?;

        if self.config.rotate_refresh_tokens {
            self.token_storage.revoke_refresh_token(&token_hash).await?;
        }

        tracing::debug!(client_id = %client_id, user_id = %user.id, "Refresh token exchanged");

        self.issue_pair(&user, client_id, &record.scope).await
    }

    /// Validates an access token and returns its record and subject.
    ///
    /// Checks, in order: existence, revocation, expiry, user activity, and
    /// session-version staleness. Roles exempt from forced logout skip the
    /// staleness check so that a mass invalidation cannot evict the
    /// platform operator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token is unknown or revoked (`InvalidToken`)
    /// - The token has expired (`TokenExpired`)
    /// - The user no longer exists or is inactive (`InvalidToken`)
    /// - The token's session version is stale (`StaleSession`)
    pub async fn validate_access(&self, token: &str) -> AuthResult<(AccessTokenRecord, User)> {
        let token_hash = hash_token(token);

        let record = self
            .token_storage
            .find_access_token(&token_hash)
            .await?
            .ok_or_else(|| AuthError::invalid_token("Unknown access token"))?;

        if record.is_revoked() {
            return Err(AuthError::invalid_token("Token has been revoked"));
        }
        if record.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .user_storage
            .find_by_id(record.user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AuthError::invalid_token("User is unknown or inactive"))?;

        if !user.role.is_exempt_from_forced_logout() {
            let current = self.version_storage.current(user.id).await?;
            if record.session_version != current {
                tracing::debug!(user_id = %user.id, "Rejecting token with stale session version");
                return Err(AuthError::StaleSession);
            }
        }

        Ok((record, user))
    }

    /// Revokes the presented access token and, if given, its refresh token.
    ///
    /// Used by logout. Revoking unknown tokens is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn revoke_pair(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> AuthResult<()> {
        self.token_storage
            .revoke_access_token(&hash_token(access_token))
            .await?;
        if let Some(refresh) = refresh_token {
            self.token_storage
                .revoke_refresh_token(&hash_token(refresh))
                .await?;
        }
        Ok(())
    }

    /// Gets the service configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    async fn load_active_user(&self, user_id: Uuid) -> AuthResult<User> {
        self.user_storage
            .find_by_id(user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AuthError::invalid_grant("User is unknown or inactive"))
    }

    async fn issue_pair(&self, user: &User, client_id: &str, scope: &str) -> AuthResult<TokenPair> {
        let now = OffsetDateTime::now_utc();
        let session_version = self.version_storage.current(user.id).await?;

        let access_token = generate_token();
        let refresh_token = generate_token();

        let access_record = AccessTokenRecord {
            id: Uuid::new_v4(),
            token_hash: hash_token(&access_token),
            client_id: client_id.to_string(),
            user_id: user.id,
            scope: scope.to_string(),
            session_version,
            created_at: now,
            expires_at: now + self.config.access_token_lifetime,
            revoked_at: None,
        };
        let refresh_record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            token_hash: hash_token(&refresh_token),
            client_id: client_id.to_string(),
            user_id: user.id,
            scope: scope.to_string(),
            created_at: now,
            expires_at: now + self.config.refresh_token_lifetime,
            revoked_at: None,
        };

        self.token_storage.create_access_token(&access_record).await?;
        self.token_storage
            .create_refresh_token(&refresh_record)
            .await?;

        Ok(TokenPair {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_lifetime.whole_seconds().max(0) as u64,
            refresh_token,
            scope: scope.to_string(),
        })
    }
}
