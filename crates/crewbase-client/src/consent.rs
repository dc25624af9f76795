//! Consent flow controller.
//!
//! Orchestrates the authorize → (login) → consent → redirect sequence.
//!
//! # States
//!
//! ```text
//! Loading ──► Error                      (terminal: bad request or server rejection)
//! Loading ──► Presenting ──► Authorizing ──► Redirected
//!                  ▲               │
//!                  └───────────────┘        (credential rejection, inline error)
//! ```
//!
//! Missing `client_id` or `redirect_uri` moves straight to `Error` without
//! contacting the authorization server. A successful `authorize()` call
//! performs a full-page navigation to the server-supplied redirect URL;
//! that redirect is how the authorization code reaches the requesting
//! application.

use std::sync::Arc;

use crate::api::{ApiError, AuthorizationApi, ClientMetadata, LoginAuthorizeRequest};
use crate::session::{Navigator, SessionStore};

/// Query parameters the consent screen was opened with.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeParams {
    /// The requesting client's identifier.
    pub client_id: Option<String>,
    /// The redirect URI requested by the client.
    pub redirect_uri: Option<String>,
    /// Requested scopes (space-separated).
    pub scope: String,
    /// Caller state, echoed on every redirect back.
    pub state: String,
}

/// Login credentials collected by the consent screen.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
}

/// Consent flow states.
#[derive(Debug, Clone)]
pub enum ConsentState {
    /// Validating parameters and fetching client metadata.
    Loading,

    /// Terminal failure; the user must restart from the initiating
    /// application. No retry.
    Error {
        /// User-visible message.
        message: String,
    },

    /// Consent screen is shown.
    Presenting {
        /// Client display metadata.
        client: ClientMetadata,
        /// Whether the form collects email/password.
        needs_credentials: bool,
        /// Inline error from a rejected submission, if any.
        error: Option<String>,
    },

    /// The authorize submission is in flight.
    Authorizing,

    /// Navigation to the redirect URL has been issued.
    Redirected {
        /// The URL navigated to.
        url: String,
    },
}

impl ConsentState {
    /// Returns `true` if the flow is in a terminal error state.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns `true` if the consent screen is being shown.
    #[must_use]
    pub fn is_presenting(&self) -> bool {
        matches!(self, Self::Presenting { .. })
    }

    /// Returns `true` if the flow completed with a redirect.
    #[must_use]
    pub fn is_redirected(&self) -> bool {
        matches!(self, Self::Redirected { .. })
    }
}

/// Consent flow controller.
pub struct ConsentFlow {
    api: Arc<dyn AuthorizationApi>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    /// Route used when cancelling without a known redirect URI.
    default_route: String,
    params: AuthorizeParams,
    state: ConsentState,
}

impl ConsentFlow {
    /// Creates a new consent flow in the `Loading` state.
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthorizationApi>,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        default_route: impl Into<String>,
    ) -> Self {
        Self {
            api,
            session,
            navigator,
            default_route: default_route.into(),
            params: AuthorizeParams::default(),
            state: ConsentState::Loading,
        }
    }

    /// Returns the current flow state.
    #[must_use]
    pub fn state(&self) -> &ConsentState {
        &self.state
    }

    /// Enters the flow with the query parameters of the consent screen.
    ///
    /// Missing required parameters transition directly to `Error` without
    /// calling the authorization server.
    pub async fn start(&mut self, params: AuthorizeParams) -> &ConsentState {
        self.params = params;

        let Some(client_id) = self.params.client_id.clone().filter(|s| !s.is_empty()) else {
            self.state = ConsentState::Error {
                message: "Missing required parameter: client_id".to_string(),
            };
            return &self.state;
        };
        let Some(redirect_uri) = self.params.redirect_uri.clone().filter(|s| !s.is_empty())
        else {
            self.state = ConsentState::Error {
                message: "Missing required parameter: redirect_uri".to_string(),
            };
            return &self.state;
        };

        match self
            .api
            .fetch_client_metadata(
                &client_id,
                &redirect_uri,
                &self.params.scope,
                &self.params.state,
            )
            .await
        {
            Ok(client) => {
                self.state = ConsentState::Presenting {
                    client,
                    needs_credentials: self.session.token().is_none(),
                    error: None,
                };
            }
            Err(e) => {
                if !e.is_rejection() {
                    tracing::error!(error = %e, "Failed to load client metadata");
                }
                self.state = ConsentState::Error {
                    message: e.to_string(),
                };
            }
        }

        &self.state
    }

    /// Submits the authorize request.
    ///
    /// Ignored unless the flow is `Presenting`. Success navigates to the
    /// server-supplied redirect URL; a rejection returns to `Presenting`
    /// with an inline error.
    pub async fn authorize(&mut self, credentials: Option<Credentials>) -> &ConsentState {
        let ConsentState::Presenting {
            client,
            needs_credentials,
            ..
        } = self.state.clone()
        else {
            return &self.state;
        };

        let (email, password) = if needs_credentials {
            match credentials {
                Some(c) => (Some(c.email), Some(c.password)),
                None => {
                    self.state = ConsentState::Presenting {
                        client,
                        needs_credentials,
                        error: Some("Email and password are required".to_string()),
                    };
                    return &self.state;
                }
            }
        } else {
            (None, None)
        };

        self.state = ConsentState::Authorizing;

        let request = LoginAuthorizeRequest {
            email,
            password,
            client_id: client.client_id.clone(),
            redirect_uri: self.params.redirect_uri.clone().unwrap_or_default(),
            scope: self.params.scope.clone(),
            state: self.params.state.clone(),
        };

        let bearer = self.session.token();
        match self.api.login_authorize(&request, bearer.as_deref()).await {
            Ok(redirect_url) => {
                self.navigator.navigate(&redirect_url);
                self.state = ConsentState::Redirected { url: redirect_url };
            }
            Err(e) => {
                if !e.is_rejection() {
                    tracing::error!(error = %e, "Authorize submission failed");
                }
                self.state = ConsentState::Presenting {
                    client,
                    needs_credentials,
                    error: Some(e.to_string()),
                };
            }
        }

        &self.state
    }

    /// Cancels the flow.
    ///
    /// Redirects back to the caller with `error=access_denied`, echoing the
    /// state parameter, or navigates to the local default route when no
    /// redirect URI is known.
    pub fn cancel(&mut self) {
        let target = self
            .params
            .redirect_uri
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|redirect_uri| self.denied_redirect(redirect_uri))
            .unwrap_or_else(|| self.default_route.clone());

        self.navigator.navigate(&target);
        self.state = ConsentState::Redirected { url: target };
    }

    fn denied_redirect(&self, redirect_uri: &str) -> Option<String> {
        let mut url = url::Url::parse(redirect_uri).ok()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("error", "access_denied");
            if !self.params.state.is_empty() {
                pairs.append_pair("state", &self.params.state);
            }
        }
        Some(url.to_string())
    }
}
