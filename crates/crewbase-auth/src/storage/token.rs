//! Token storage trait.
//!
//! Defines the interface for persisting opaque access and refresh token
//! records. Lookups are by SHA-256 hash; plaintext tokens never reach
//! storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::{AccessTokenRecord, RefreshTokenRecord};

/// Storage operations for access and refresh token records.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Stores a new access token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create_access_token(&self, token: &AccessTokenRecord) -> AuthResult<()>;

    /// Finds an access token record by token hash.
    ///
    /// Returns records regardless of validity; callers check expiry and
    /// revocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_access_token(&self, token_hash: &str) -> AuthResult<Option<AccessTokenRecord>>;

    /// Revokes an access token by hash.
    ///
    /// Revoking an already-revoked or unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_access_token(&self, token_hash: &str) -> AuthResult<()>;

    /// Stores a new refresh token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create_refresh_token(&self, token: &RefreshTokenRecord) -> AuthResult<()>;

    /// Finds a refresh token record by token hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_refresh_token(&self, token_hash: &str)
    -> AuthResult<Option<RefreshTokenRecord>>;

    /// Revokes a refresh token by hash.
    ///
    /// Revoking an already-revoked or unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_refresh_token(&self, token_hash: &str) -> AuthResult<()>;

    /// Revokes all tokens (access and refresh) issued to a user.
    ///
    /// # Returns
    ///
    /// Returns the number of records revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<u64>;

    /// Deletes expired token records.
    ///
    /// Should be called periodically to prevent storage growth.
    ///
    /// # Returns
    ///
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
