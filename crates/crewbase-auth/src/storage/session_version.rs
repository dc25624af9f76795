//! Session version storage trait.
//!
//! Each user has a monotonically advancing session version. Tokens are
//! stamped with the version current at issue time; bumping the version
//! marks every previously issued token for that user as stale without a
//! per-token revocation write.

use async_trait::async_trait;
use uuid::Uuid;

use crewbase_core::SessionVersion;

use crate::AuthResult;

/// Storage operations for per-user session versions.
#[async_trait]
pub trait SessionVersionStorage: Send + Sync {
    /// Returns the user's current session version.
    ///
    /// Allocates [`SessionVersion::INITIAL`] on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn current(&self, user_id: Uuid) -> AuthResult<SessionVersion>;

    /// Advances the user's session version and returns the new value.
    ///
    /// All tokens stamped with an earlier version become stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn bump(&self, user_id: Uuid) -> AuthResult<SessionVersion>;
}
