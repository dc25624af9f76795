//! Session interceptor.
//!
//! Applied around every outgoing request the application makes:
//!
//! - attaches `Authorization: Bearer <token>` when a token is persisted
//! - sets JSON headers, except for multipart/file uploads where the
//!   content type is left for the transport to set
//! - tracks the `X-Session-Version` response header: the first observed
//!   value is cached; a later mismatch updates the cache and forces a
//!   logout, unless the authenticated role is exempt
//! - on 401, redirects to the login route unless the current view is the
//!   login/OAuth page or the request targeted an optional endpoint
//!
//! The server realizes mass session invalidation by bumping a per-user
//! counter; this interceptor is the client half that notices the change
//! and evicts the session. Two racing responses may both update the cache;
//! the last writer wins, which is acceptable because logout is idempotent.

use std::sync::Arc;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};

use crewbase_core::SESSION_VERSION_HEADER;

use crate::session::{Navigator, SessionStore};

/// Body classification for outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBody {
    /// JSON (or empty) body; JSON headers are set.
    Json,
    /// Multipart/file upload; the transport sets the content type.
    Multipart,
}

/// Interceptor configuration.
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    /// Route of the login screen.
    pub login_route: String,

    /// Path prefixes of views that must never trigger a 401 redirect
    /// (the login screen itself and the OAuth consent screen).
    pub auth_view_prefixes: Vec<String>,

    /// Path prefixes of optional endpoints whose 401s fail silently
    /// (background polling and other non-critical calls).
    pub optional_endpoint_prefixes: Vec<String>,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            auth_view_prefixes: vec!["/login".to_string(), "/oauth".to_string()],
            optional_endpoint_prefixes: vec![
                "/api/notifications".to_string(),
                "/api/organizations".to_string(),
                "/api/setup".to_string(),
                "/oauth".to_string(),
            ],
        }
    }
}

/// Session interceptor applied to every outgoing request.
pub struct SessionInterceptor {
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    config: InterceptorConfig,
}

impl SessionInterceptor {
    /// Creates a new interceptor with the default configuration.
    #[must_use]
    pub fn new(session: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_config(session, navigator, InterceptorConfig::default())
    }

    /// Creates a new interceptor with a custom configuration.
    #[must_use]
    pub fn with_config(
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        config: InterceptorConfig,
    ) -> Self {
        Self {
            session,
            navigator,
            config,
        }
    }

    /// Prepares the headers of an outgoing request.
    ///
    /// Returns `true` if a bearer token was attached; the caller passes
    /// that flag back to [`Self::on_response`].
    pub fn on_request(&self, headers: &mut HeaderMap, body: RequestBody) -> bool {
        let mut sent_bearer = false;

        if let Some(token) = self.session.token()
            && let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}"))
        {
            headers.insert(AUTHORIZATION, value);
            sent_bearer = true;
        }

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        match body {
            RequestBody::Json => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            RequestBody::Multipart => {
                // The transport sets the multipart boundary.
                headers.remove(CONTENT_TYPE);
            }
        }

        sent_bearer
    }

    /// Processes a completed response.
    ///
    /// # Arguments
    ///
    /// * `request_path` - path the request targeted
    /// * `sent_bearer` - whether [`Self::on_request`] attached a token
    /// * `status` - response status
    /// * `headers` - response headers
    pub fn on_response(
        &self,
        request_path: &str,
        sent_bearer: bool,
        status: StatusCode,
        headers: &HeaderMap,
    ) {
        if sent_bearer {
            self.track_session_version(headers);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(request_path);
        }
    }

    /// Tracks the session version carried by a response.
    ///
    /// Absence of the header means no enforcement for that response.
    fn track_session_version(&self, headers: &HeaderMap) {
        let Some(observed) = headers
            .get(SESSION_VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
        else {
            return;
        };

        match self.session.session_version() {
            None => {
                self.session.set_session_version(observed);
            }
            Some(cached) if cached != observed => {
                self.session.set_session_version(observed);

                let exempt = self
                    .session
                    .role()
                    .is_some_and(|role| role.is_exempt_from_forced_logout());
                if exempt {
                    tracing::debug!("Session version changed; role is exempt from forced logout");
                    return;
                }

                tracing::info!("Session version changed, logging out");
                self.force_logout();
            }
            Some(_) => {}
        }
    }

    /// Evicts the session and returns to the login screen.
    ///
    /// Not surfaced as an error: a stale session is a normal
    /// re-authentication trigger.
    fn force_logout(&self) {
        self.session.clear();
        if !self.is_on_auth_view() {
            self.navigator.navigate(&self.config.login_route);
        }
    }

    /// Applies the 401 redirect policy.
    fn handle_unauthorized(&self, request_path: &str) {
        if self.is_on_auth_view() {
            return;
        }
        if self.is_optional_endpoint(request_path) {
            tracing::debug!(path = %request_path, "401 on optional endpoint, ignoring");
            return;
        }
        self.navigator.navigate(&self.config.login_route);
    }

    fn is_on_auth_view(&self) -> bool {
        let current = self.navigator.current_path();
        self.config
            .auth_view_prefixes
            .iter()
            .any(|prefix| current.starts_with(prefix.as_str()))
    }

    fn is_optional_endpoint(&self, path: &str) -> bool {
        self.config
            .optional_endpoint_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryNavigator, MemorySessionStore};
    use crewbase_core::Role;

    struct Fixture {
        session: Arc<MemorySessionStore>,
        navigator: Arc<MemoryNavigator>,
        interceptor: SessionInterceptor,
    }

    fn fixture(session: MemorySessionStore, current_path: &str) -> Fixture {
        let session = Arc::new(session);
        let navigator = Arc::new(MemoryNavigator::at(current_path));
        let interceptor = SessionInterceptor::new(session.clone(), navigator.clone());
        Fixture {
            session,
            navigator,
            interceptor,
        }
    }

    fn version_headers(version: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            SESSION_VERSION_HEADER,
            HeaderValue::from_str(version).unwrap(),
        );
        headers
    }

    #[test]
    fn test_attaches_bearer_and_json_headers() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        let mut headers = HeaderMap::new();
        let sent = f.interceptor.on_request(&mut headers, RequestBody::Json);

        assert!(sent);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok123");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn test_no_bearer_without_token() {
        let f = fixture(MemorySessionStore::new(), "/dashboard");

        let mut headers = HeaderMap::new();
        let sent = f.interceptor.on_request(&mut headers, RequestBody::Json);

        assert!(!sent);
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_multipart_leaves_content_type_to_transport() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        let mut headers = HeaderMap::new();
        f.interceptor.on_request(&mut headers, RequestBody::Multipart);

        assert!(!headers.contains_key(CONTENT_TYPE));
        assert!(headers.contains_key(AUTHORIZATION));
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn test_first_observed_version_is_cached() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &version_headers("v1"));

        assert_eq!(f.session.session_version().as_deref(), Some("v1"));
        assert!(f.session.token().is_some());
        assert!(f.navigator.last().is_none());
    }

    #[test]
    fn test_version_mismatch_forces_logout() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &version_headers("v1"));
        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &version_headers("v2"));

        // Session evicted, user sent to login
        assert!(f.session.token().is_none());
        assert_eq!(f.navigator.last().as_deref(), Some("/login"));
    }

    #[test]
    fn test_version_mismatch_exempt_role_stays_logged_in() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::SuperAdmin),
            "/dashboard",
        );

        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &version_headers("v1"));
        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &version_headers("v2"));

        assert!(f.session.token().is_some());
        assert!(f.navigator.last().is_none());
        // The cache still advances
        assert_eq!(f.session.session_version().as_deref(), Some("v2"));
    }

    #[test]
    fn test_same_version_is_a_no_op() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &version_headers("v1"));
        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &version_headers("v1"));

        assert!(f.session.token().is_some());
        assert!(f.navigator.last().is_none());
    }

    #[test]
    fn test_missing_version_header_means_no_enforcement() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        f.interceptor
            .on_response("/api/employees", true, StatusCode::OK, &HeaderMap::new());

        assert!(f.session.session_version().is_none());
        assert!(f.session.token().is_some());
    }

    #[test]
    fn test_version_ignored_without_bearer() {
        let f = fixture(MemorySessionStore::new(), "/dashboard");

        f.interceptor
            .on_response("/api/employees", false, StatusCode::OK, &version_headers("v1"));

        assert!(f.session.session_version().is_none());
    }

    #[test]
    fn test_401_redirects_to_login() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        f.interceptor.on_response(
            "/api/employees",
            true,
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
        );

        assert_eq!(f.navigator.last().as_deref(), Some("/login"));
    }

    #[test]
    fn test_401_on_login_view_does_not_redirect_again() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/login",
        );

        f.interceptor.on_response(
            "/api/employees",
            true,
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
        );

        assert!(f.navigator.last().is_none());
    }

    #[test]
    fn test_401_on_oauth_view_does_not_redirect() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/oauth/consent",
        );

        f.interceptor.on_response(
            "/api/employees",
            true,
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
        );

        assert!(f.navigator.last().is_none());
    }

    #[test]
    fn test_401_on_optional_endpoint_fails_silently() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        for path in [
            "/api/notifications/poll",
            "/api/organizations",
            "/api/setup/status",
            "/oauth/authorize",
        ] {
            f.interceptor
                .on_response(path, true, StatusCode::UNAUTHORIZED, &HeaderMap::new());
        }

        assert!(f.navigator.last().is_none());
    }

    #[test]
    fn test_racing_versions_last_writer_wins() {
        let f = fixture(
            MemorySessionStore::with_token("tok123", Role::Employee),
            "/dashboard",
        );

        f.interceptor
            .on_response("/api/a", true, StatusCode::OK, &version_headers("v1"));
        // Two responses race; both processed, the later one wins the cache
        f.interceptor
            .on_response("/api/b", true, StatusCode::OK, &version_headers("v2"));
        f.interceptor
            .on_response("/api/c", true, StatusCode::OK, &version_headers("v3"));

        assert_eq!(f.session.session_version().as_deref(), Some("v3"));
        // Logout already happened at the first mismatch; idempotent
        assert!(f.session.token().is_none());
    }
}
