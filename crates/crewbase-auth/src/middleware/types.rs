//! Authentication context types.
//!
//! This module provides the context extracted from validated bearer tokens.

use uuid::Uuid;

use crewbase_core::Role;

use crate::storage::user::User;
use crate::types::AccessTokenRecord;

/// Authenticated request context.
///
/// Extracted from requests by the `BearerAuth` extractor and carries the
/// validated token record plus the loaded user.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Validated access token record.
    pub token: AccessTokenRecord,

    /// The authenticated user.
    pub user: User,
}

impl AuthContext {
    /// Checks if the token has a specific scope.
    ///
    /// This performs exact matching on space-separated scopes.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.token.scope.split_whitespace().any(|s| s == scope)
    }

    /// Returns all scopes as an iterator.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.token.scope.split_whitespace()
    }

    /// Gets the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Gets the client ID the token was issued to.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.token.client_id
    }

    /// Gets the authenticated user's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Returns `true` if the user may administer other users' sessions.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }
}
