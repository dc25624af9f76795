//! Authorization server API surface.
//!
//! The consent flow drives the authorization server through
//! [`AuthorizationApi`]; [`HttpAuthorizationApi`] is the reqwest-backed
//! implementation. The DTOs mirror the server's wire format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Display metadata for the consent screen, as returned by
/// `GET /oauth/authorize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    /// The client identifier.
    pub client_id: String,

    /// Display name of the requesting application.
    pub name: String,

    /// Description of the requesting application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Logo URL for the consent screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// The scopes being requested.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Body of `POST /oauth/authorize/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAuthorizeRequest {
    /// Login email (omitted when already authenticated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Login password (omitted when already authenticated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// The client being authorized.
    pub client_id: String,

    /// Redirect URI from the authorization request.
    pub redirect_uri: String,

    /// Requested scopes (space-separated).
    #[serde(default)]
    pub scope: String,

    /// State parameter, echoed on the redirect.
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginAuthorizeResponse {
    redirect_url: String,
}

/// OAuth error payload as returned by the authorization server.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    /// OAuth 2.0 error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Errors surfaced by the authorization server API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the request with an OAuth error payload.
    #[error("{}", .description.as_deref().unwrap_or(.error.as_str()))]
    Rejected {
        /// OAuth 2.0 error code.
        error: String,
        /// Server-supplied description, surfaced verbatim to the user.
        description: Option<String>,
    },

    /// The request failed at the transport level or with an unparseable body.
    #[error("Authorization server unavailable: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

impl ApiError {
    /// Creates a rejection error from an OAuth error payload.
    #[must_use]
    pub fn rejected(body: OAuthErrorBody) -> Self {
        Self::Rejected {
            error: body.error,
            description: body.error_description,
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns `true` if the error came from the server's OAuth payload.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Operations the consent flow needs from the authorization server.
#[async_trait]
pub trait AuthorizationApi: Send + Sync {
    /// Fetches client display metadata for the consent screen.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for OAuth error payloads and
    /// [`ApiError::Transport`] for transport failures.
    async fn fetch_client_metadata(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> Result<ClientMetadata, ApiError>;

    /// Submits the login+authorize request; returns the redirect URL.
    ///
    /// `bearer` carries the persisted token for the already-authenticated
    /// path, where the request omits credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for credential or validation
    /// rejections and [`ApiError::Transport`] for transport failures.
    async fn login_authorize(
        &self,
        request: &LoginAuthorizeRequest,
        bearer: Option<&str>,
    ) -> Result<String, ApiError>;
}

/// Reqwest-backed [`AuthorizationApi`] implementation.
pub struct HttpAuthorizationApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpAuthorizationApi {
    /// Creates a new API client against the given authorization server
    /// base URL.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::transport(format!("Invalid endpoint URL: {e}")))
    }
}

/// Decodes an error response body into an [`ApiError`].
async fn decode_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    match response.json::<OAuthErrorBody>().await {
        Ok(body) => ApiError::rejected(body),
        Err(_) => ApiError::transport(format!("HTTP {status}")),
    }
}

#[async_trait]
impl AuthorizationApi for HttpAuthorizationApi {
    async fn fetch_client_metadata(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> Result<ClientMetadata, ApiError> {
        let mut url = self.endpoint("/oauth/authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", scope)
            .append_pair("state", state);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(decode_error(response).await);
        }

        response
            .json::<ClientMetadata>()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))
    }

    async fn login_authorize(
        &self,
        request: &LoginAuthorizeRequest,
        bearer: Option<&str>,
    ) -> Result<String, ApiError> {
        let url = self.endpoint("/oauth/authorize/login")?;

        let mut builder = self.http.post(url).json(request);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(decode_error(response).await);
        }

        response
            .json::<LoginAuthorizeResponse>()
            .await
            .map(|r| r.redirect_url)
            .map_err(|e| ApiError::transport(e.to_string()))
    }
}
