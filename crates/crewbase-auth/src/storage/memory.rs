//! In-memory storage backends.
//!
//! These implementations back the default server configuration and the
//! test suite. State lives in `RwLock<HashMap>` maps; critical sections
//! are short and never await.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crewbase_core::SessionVersion;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::session::AuthorizationSession;
use crate::password;
use crate::types::{AccessTokenRecord, Client, RefreshTokenRecord};

use super::client::ClientStorage;
use super::session::SessionStorage;
use super::session_version::SessionVersionStorage;
use super::token::TokenStorage;
use super::user::{User, UserStorage};

// =============================================================================
// Clients
// =============================================================================

/// In-memory client storage.
#[derive(Default)]
pub struct InMemoryClientStorage {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientStorage {
    /// Creates an empty client storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.read().unwrap().get(client_id).cloned())
    }

    async fn create(&self, client: &Client) -> AuthResult<Client> {
        client
            .validate()
            .map_err(|e| AuthError::invalid_client(e.to_string()))?;

        let mut clients = self.clients.write().unwrap();
        if clients.contains_key(&client.client_id) {
            return Err(AuthError::invalid_client(format!(
                "Client already exists: {}",
                client.client_id
            )));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(client.clone())
    }

    async fn update(&self, client_id: &str, client: &Client) -> AuthResult<Client> {
        client
            .validate()
            .map_err(|e| AuthError::invalid_client(e.to_string()))?;

        let mut clients = self.clients.write().unwrap();
        if !clients.contains_key(client_id) {
            return Err(AuthError::invalid_client(format!(
                "Client not found: {client_id}"
            )));
        }
        clients.insert(client_id.to_string(), client.clone());
        Ok(client.clone())
    }

    async fn delete(&self, client_id: &str) -> AuthResult<()> {
        let mut clients = self.clients.write().unwrap();
        if clients.remove(client_id).is_none() {
            return Err(AuthError::invalid_client(format!(
                "Client not found: {client_id}"
            )));
        }
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Client>> {
        let clients = self.clients.read().unwrap();
        let mut all: Vec<Client> = clients.values().cloned().collect();
        all.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

// =============================================================================
// Users
// =============================================================================

/// In-memory user storage.
#[derive(Default)]
pub struct InMemoryUserStorage {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStorage {
    /// Creates an empty user storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.users.read().unwrap().get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::invalid_request(format!(
                "User already exists: {}",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().unwrap();
        if !users.contains_key(&user.id) {
            return Err(AuthError::invalid_request(format!(
                "User not found: {}",
                user.id
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn verify_password(&self, user_id: Uuid, candidate: &str) -> AuthResult<bool> {
        let stored_hash = {
            let users = self.users.read().unwrap();
            let user = users
                .get(&user_id)
                .ok_or_else(|| AuthError::invalid_request(format!("User not found: {user_id}")))?;
            user.password_hash.clone()
        };

        match stored_hash {
            Some(hash) => password::verify_password(candidate, &hash),
            None => Ok(false),
        }
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> AuthResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::invalid_request(format!("User not found: {user_id}")))?;
        user.password_hash = Some(password_hash.to_string());
        user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

// =============================================================================
// Authorization sessions
// =============================================================================

/// In-memory authorization session storage, keyed by code.
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: RwLock<HashMap<String, AuthorizationSession>>,
}

impl InMemorySessionStorage {
    /// Creates an empty session storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn create(&self, session: &AuthorizationSession) -> AuthResult<()> {
        self.sessions
            .write()
            .unwrap()
            .insert(session.code.clone(), session.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationSession>> {
        Ok(self.sessions.read().unwrap().get(code).cloned())
    }

    async fn consume(&self, code: &str) -> AuthResult<AuthorizationSession> {
        // The write lock makes the check-and-set atomic.
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get_mut(code)
            .ok_or_else(|| AuthError::invalid_grant("Unknown authorization code"))?;

        if session.is_consumed() {
            return Err(AuthError::invalid_grant("Authorization code already used"));
        }
        if session.is_expired() {
            return Err(AuthError::invalid_grant("Authorization code expired"));
        }

        session.consumed_at = Some(OffsetDateTime::now_utc());
        Ok(session.clone())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// In-memory token storage, keyed by token hash.
#[derive(Default)]
pub struct InMemoryTokenStorage {
    access: RwLock<HashMap<String, AccessTokenRecord>>,
    refresh: RwLock<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryTokenStorage {
    /// Creates an empty token storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
    async fn create_access_token(&self, token: &AccessTokenRecord) -> AuthResult<()> {
        self.access
            .write()
            .unwrap()
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_access_token(&self, token_hash: &str) -> AuthResult<Option<AccessTokenRecord>> {
        Ok(self.access.read().unwrap().get(token_hash).cloned())
    }

    async fn revoke_access_token(&self, token_hash: &str) -> AuthResult<()> {
        if let Some(token) = self.access.write().unwrap().get_mut(token_hash) {
            token.revoked_at.get_or_insert(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn create_refresh_token(&self, token: &RefreshTokenRecord) -> AuthResult<()> {
        self.refresh
            .write()
            .unwrap()
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> AuthResult<Option<RefreshTokenRecord>> {
        Ok(self.refresh.read().unwrap().get(token_hash).cloned())
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> AuthResult<()> {
        if let Some(token) = self.refresh.write().unwrap().get_mut(token_hash) {
            token.revoked_at.get_or_insert(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut revoked = 0u64;

        for token in self.access.write().unwrap().values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        for token in self.refresh.write().unwrap().values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut deleted = 0u64;
        {
            let mut access = self.access.write().unwrap();
            let before = access.len();
            access.retain(|_, t| !t.is_expired());
            deleted += (before - access.len()) as u64;
        }
        {
            let mut refresh = self.refresh.write().unwrap();
            let before = refresh.len();
            refresh.retain(|_, t| !t.is_expired());
            deleted += (before - refresh.len()) as u64;
        }
        Ok(deleted)
    }
}

// =============================================================================
// Session versions
// =============================================================================

/// In-memory session version storage.
#[derive(Default)]
pub struct InMemorySessionVersionStorage {
    versions: RwLock<HashMap<Uuid, SessionVersion>>,
}

impl InMemorySessionVersionStorage {
    /// Creates an empty session version storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionVersionStorage for InMemorySessionVersionStorage {
    async fn current(&self, user_id: Uuid) -> AuthResult<SessionVersion> {
        Ok(*self
            .versions
            .write()
            .unwrap()
            .entry(user_id)
            .or_insert(SessionVersion::INITIAL))
    }

    async fn bump(&self, user_id: Uuid) -> AuthResult<SessionVersion> {
        let mut versions = self.versions.write().unwrap();
        let next = versions
            .get(&user_id)
            .copied()
            .unwrap_or(SessionVersion::INITIAL)
            .next();
        versions.insert(user_id, next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewbase_core::Role;
    use time::Duration;

    fn make_client(client_id: &str) -> Client {
        Client {
            client_id: client_id.to_string(),
            client_secret_hash: None,
            name: "Test Client".to_string(),
            description: None,
            logo_url: None,
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            scopes: vec![],
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        }
    }

    fn make_session(user_id: Uuid, expires_in: Duration) -> AuthorizationSession {
        let now = OffsetDateTime::now_utc();
        AuthorizationSession {
            id: Uuid::new_v4(),
            code: AuthorizationSession::generate_code(),
            client_id: "test-client".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: "profile".to_string(),
            state: "test-state".to_string(),
            user_id,
            created_at: now,
            expires_at: now + expires_in,
            consumed_at: None,
        }
    }

    #[tokio::test]
    async fn test_client_crud() {
        let storage = InMemoryClientStorage::new();
        let client = make_client("c1");

        storage.create(&client).await.unwrap();
        assert!(storage.create(&client).await.is_err());

        let found = storage.find_by_client_id("c1").await.unwrap().unwrap();
        assert_eq!(found.name, "Test Client");

        let mut updated = client.clone();
        updated.name = "Renamed".to_string();
        storage.update("c1", &updated).await.unwrap();
        assert_eq!(
            storage
                .find_by_client_id("c1")
                .await
                .unwrap()
                .unwrap()
                .name,
            "Renamed"
        );

        storage.delete("c1").await.unwrap();
        assert!(storage.find_by_client_id("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_client_list_pagination() {
        let storage = InMemoryClientStorage::new();
        for id in ["a", "b", "c"] {
            storage.create(&make_client(id)).await.unwrap();
        }

        let page = storage.list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].client_id, "a");

        let page = storage.list(2, 2).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].client_id, "c");
    }

    #[tokio::test]
    async fn test_user_password_verification() {
        let storage = InMemoryUserStorage::new();
        let hash = password::hash_password("hunter2!").unwrap();
        let user = User::builder("driver@fleet.example", Role::Driver)
            .password_hash(hash)
            .build();
        storage.create(&user).await.unwrap();

        assert!(storage.verify_password(user.id, "hunter2!").await.unwrap());
        assert!(!storage.verify_password(user.id, "wrong").await.unwrap());

        let new_hash = password::hash_password("new-password").unwrap();
        storage.set_password_hash(user.id, &new_hash).await.unwrap();
        assert!(
            storage
                .verify_password(user.id, "new-password")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_user_without_password_never_verifies() {
        let storage = InMemoryUserStorage::new();
        let user = User::new("sso-only@fleet.example", Role::Employee);
        storage.create(&user).await.unwrap();

        assert!(!storage.verify_password(user.id, "anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = InMemoryUserStorage::new();
        storage
            .create(&User::new("dup@fleet.example", Role::Employee))
            .await
            .unwrap();
        let err = storage
            .create(&User::new("dup@fleet.example", Role::Driver))
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_session_consume_is_single_use() {
        let storage = InMemorySessionStorage::new();
        let session = make_session(Uuid::new_v4(), Duration::minutes(10));
        storage.create(&session).await.unwrap();

        let consumed = storage.consume(&session.code).await.unwrap();
        assert!(consumed.is_consumed());

        let replay = storage.consume(&session.code).await;
        assert!(matches!(replay, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_session_consume_expired() {
        let storage = InMemorySessionStorage::new();
        let session = make_session(Uuid::new_v4(), Duration::minutes(-1));
        storage.create(&session).await.unwrap();

        let result = storage.consume(&session.code).await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_session_cleanup_and_delete_by_user() {
        let storage = InMemorySessionStorage::new();
        let user = Uuid::new_v4();
        storage
            .create(&make_session(user, Duration::minutes(-1)))
            .await
            .unwrap();
        storage
            .create(&make_session(user, Duration::minutes(10)))
            .await
            .unwrap();
        storage
            .create(&make_session(Uuid::new_v4(), Duration::minutes(10)))
            .await
            .unwrap();

        assert_eq!(storage.cleanup_expired().await.unwrap(), 1);
        assert_eq!(storage.delete_by_user(user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_token_revocation() {
        let storage = InMemoryTokenStorage::new();
        let user = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let access = AccessTokenRecord {
            id: Uuid::new_v4(),
            token_hash: crate::types::hash_token("a"),
            client_id: "c".to_string(),
            user_id: user,
            scope: "profile".to_string(),
            session_version: SessionVersion::INITIAL,
            created_at: now,
            expires_at: now + Duration::hours(1),
            revoked_at: None,
        };
        let refresh = RefreshTokenRecord {
            id: Uuid::new_v4(),
            token_hash: crate::types::hash_token("r"),
            client_id: "c".to_string(),
            user_id: user,
            scope: "profile".to_string(),
            created_at: now,
            expires_at: now + Duration::days(90),
            revoked_at: None,
        };

        storage.create_access_token(&access).await.unwrap();
        storage.create_refresh_token(&refresh).await.unwrap();

        assert_eq!(storage.revoke_all_for_user(user).await.unwrap(), 2);

        let found = storage
            .find_access_token(&access.token_hash)
            .await
            .unwrap()
            .unwrap();
        assert!(found.is_revoked());

        // Idempotent on already-revoked tokens
        assert_eq!(storage.revoke_all_for_user(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_session_version_allocation_and_bump() {
        let storage = InMemorySessionVersionStorage::new();
        let user = Uuid::new_v4();

        let v1 = storage.current(user).await.unwrap();
        assert_eq!(v1, SessionVersion::INITIAL);

        // Stable until bumped
        assert_eq!(storage.current(user).await.unwrap(), v1);

        let v2 = storage.bump(user).await.unwrap();
        assert_eq!(v2, v1.next());
        assert_eq!(storage.current(user).await.unwrap(), v2);
    }
}
