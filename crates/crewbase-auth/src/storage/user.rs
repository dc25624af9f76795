//! User type and storage trait.
//!
//! Users sign in with email and password. Every user belongs to an
//! organization (tenant) and carries exactly one [`Role`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crewbase_core::Role;

use crate::AuthResult;

fn default_datetime() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// A user in the authentication system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,

    /// Email address, the login identifier.
    pub email: String,

    /// Full name of the user (display name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Argon2-hashed password (None for federated users).
    ///
    /// Stored for password authentication; filter this field out manually
    /// when exposing User via API.
    #[serde(default)]
    pub password_hash: Option<String>,

    /// The user's platform role.
    pub role: Role,

    /// Organization (tenant) the user belongs to.
    /// None only for the platform operator account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,

    /// Whether the user account is active.
    /// Inactive users cannot authenticate.
    pub active: bool,

    /// When the user was created.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new active user with the given email and role.
    #[must_use]
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: None,
            password_hash: None,
            role,
            organization_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user builder.
    #[must_use]
    pub fn builder(email: impl Into<String>, role: Role) -> UserBuilder {
        UserBuilder::new(email, role)
    }

    /// Returns `true` if the user account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Builder for creating `User` instances.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            user: User::new(email, role),
        }
    }

    /// Sets the user ID.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.user.id = id;
        self
    }

    /// Sets the full name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.user.name = Some(name.into());
        self
    }

    /// Sets the password hash.
    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.user.password_hash = Some(hash.into());
        self
    }

    /// Sets the organization.
    #[must_use]
    pub fn organization_id(mut self, id: Uuid) -> Self {
        self.user.organization_id = Some(id);
        self
    }

    /// Sets whether the user is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.user.active = active;
        self
    }

    /// Builds the user.
    #[must_use]
    pub fn build(self) -> User {
        self.user
    }
}

/// Storage operations for users.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>>;

    /// Find a user by their email address.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if a user with the same email already exists or the
    /// storage operation fails.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Update an existing user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist.
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Verify a user's password.
    ///
    /// Compares the provided password against the stored argon2 hash.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the password matches
    /// - `Ok(false)` if the password doesn't match or user has no password
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the storage operation
    /// fails.
    async fn verify_password(&self, user_id: Uuid, password: &str) -> AuthResult<bool>;

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist.
    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> AuthResult<()>;
}
