//! Authorization session storage trait.
//!
//! Defines the storage interface for authorization code sessions.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Support efficient lookup by authorization code
//! - Ensure atomicity for consume operations (prevent replay)
//! - Clean up expired sessions periodically
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - Ensure consume is atomic to prevent race conditions

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::oauth::session::AuthorizationSession;

/// Storage trait for authorization sessions.
///
/// Sessions are created when a user approves an authorization request and
/// consumed when the code is exchanged for tokens.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Creates a new authorization session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored (e.g., duplicate
    /// code, storage unavailable).
    async fn create(&self, session: &AuthorizationSession) -> AuthResult<()>;

    /// Finds a session by authorization code.
    ///
    /// Returns sessions regardless of their consumed/expired status;
    /// callers should check `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationSession>>;

    /// Consumes an authorization code (marks as used).
    ///
    /// This operation must be atomic to prevent replay attacks where the
    /// same code is used multiple times concurrently. A SQL implementation
    /// would use a conditional update:
    ///
    /// ```sql
    /// UPDATE sessions
    /// SET consumed_at = NOW()
    /// WHERE code = $1 AND consumed_at IS NULL AND expires_at > NOW()
    /// RETURNING *
    /// ```
    ///
    /// # Returns
    ///
    /// Returns the consumed session with `consumed_at` set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the code is not found, already consumed,
    /// or expired.
    async fn consume(&self, code: &str) -> AuthResult<AuthorizationSession>;

    /// Deletes expired sessions.
    ///
    /// Should be called periodically to prevent storage growth.
    ///
    /// # Returns
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;

    /// Deletes all sessions for a specific user.
    ///
    /// Used when forcing a user out to invalidate pending authorizations
    /// alongside issued tokens.
    ///
    /// # Returns
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    async fn delete_by_user(&self, user_id: Uuid) -> AuthResult<u64>;
}
