//! Persisted session state and navigation.
//!
//! The SPA persists exactly two values between requests: the bearer token
//! and the last-seen session version. Both live behind [`SessionStore`] so
//! the interceptor and consent flow never touch ambient globals; clearing
//! the store is the client-side definition of logout.

use std::sync::RwLock;

use crewbase_core::Role;

/// Persisted client-side session state.
///
/// Implementations are process-scoped. The cached session version has a
/// defined lifecycle: set on first observation, replaced on change, cleared
/// on logout.
pub trait SessionStore: Send + Sync {
    /// Returns the persisted bearer token, if any.
    fn token(&self) -> Option<String>;

    /// Persists a bearer token and the authenticated role.
    fn set_token(&self, token: String, role: Role);

    /// Returns the authenticated user's role, if known.
    fn role(&self) -> Option<Role>;

    /// Returns the cached session version, if one has been observed.
    fn session_version(&self) -> Option<String>;

    /// Caches an observed session version.
    fn set_session_version(&self, version: String);

    /// Clears all persisted state (logout).
    fn clear(&self);
}

/// In-memory session store.
///
/// The browser build persists the same fields to local storage; tests and
/// native clients use this directly.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<SessionState>,
}

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    role: Option<Role>,
    session_version: Option<String>,
}

impl MemorySessionStore {
    /// Creates an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a token and role.
    #[must_use]
    pub fn with_token(token: impl Into<String>, role: Role) -> Self {
        let store = Self::new();
        store.set_token(token.into(), role);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.inner.read().unwrap().token.clone()
    }

    fn set_token(&self, token: String, role: Role) {
        let mut inner = self.inner.write().unwrap();
        inner.token = Some(token);
        inner.role = Some(role);
    }

    fn role(&self) -> Option<Role> {
        self.inner.read().unwrap().role
    }

    fn session_version(&self) -> Option<String> {
        self.inner.read().unwrap().session_version.clone()
    }

    fn set_session_version(&self, version: String) {
        self.inner.write().unwrap().session_version = Some(version);
    }

    fn clear(&self) {
        *self.inner.write().unwrap() = SessionState::default();
    }
}

/// Navigation abstraction.
///
/// `navigate` performs a full-page redirect (not a route change); the
/// browser build assigns `window.location`.
pub trait Navigator: Send + Sync {
    /// Navigates to the given URL or route.
    fn navigate(&self, url: &str);

    /// Returns the path of the current view.
    fn current_path(&self) -> String;
}

/// In-memory navigator that records navigations.
#[derive(Default)]
pub struct MemoryNavigator {
    inner: RwLock<NavigatorState>,
}

#[derive(Default)]
struct NavigatorState {
    current_path: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    /// Creates a navigator positioned at "/".
    #[must_use]
    pub fn new() -> Self {
        Self::at("/")
    }

    /// Creates a navigator positioned at the given path.
    #[must_use]
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(NavigatorState {
                current_path: path.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Returns all recorded navigations, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.inner.read().unwrap().history.clone()
    }

    /// Returns the most recent navigation target, if any.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.inner.read().unwrap().history.last().cloned()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, url: &str) {
        let mut inner = self.inner.write().unwrap();
        inner.current_path = url.to_string();
        inner.history.push(url.to_string());
    }

    fn current_path(&self) -> String {
        self.inner.read().unwrap().current_path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_lifecycle() {
        let store = MemorySessionStore::new();
        assert!(store.token().is_none());
        assert!(store.role().is_none());
        assert!(store.session_version().is_none());

        store.set_token("tok".to_string(), Role::Driver);
        store.set_session_version("1".to_string());
        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(store.role(), Some(Role::Driver));
        assert_eq!(store.session_version().as_deref(), Some("1"));

        store.clear();
        assert!(store.token().is_none());
        assert!(store.role().is_none());
        assert!(store.session_version().is_none());
    }

    #[test]
    fn test_navigator_records_history() {
        let nav = MemoryNavigator::at("/dashboard");
        assert_eq!(nav.current_path(), "/dashboard");
        assert!(nav.last().is_none());

        nav.navigate("/login");
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.last().as_deref(), Some("/login"));
        assert_eq!(nav.history(), vec!["/login"]);
    }
}
