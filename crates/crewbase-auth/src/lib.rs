//! # crewbase-auth
//!
//! Authorization server for Crewbase single sign-on.
//!
//! This crate provides:
//! - OAuth 2.0 authorization-code flow for first-party and partner clients
//! - Opaque access/refresh token pairs with rotation
//! - Session-version bookkeeping for mass credential invalidation
//! - Storage traits with in-memory implementations
//! - Axum HTTP handlers and bearer-auth middleware
//!
//! ## Overview
//!
//! Partner applications send users to `GET /oauth/authorize`, which returns
//! the client's display metadata for the consent screen. The SPA submits
//! credentials and consent to `POST /oauth/authorize/login`, receives a
//! redirect URL carrying a single-use authorization code, and the partner
//! backend exchanges the code at `POST /oauth/token`.
//!
//! Every issued token is stamped with the user's session version. Advancing
//! the version (password change, administrative force-logout) makes all
//! previously issued tokens stale at once; authenticated responses carry the
//! current version in the `X-Session-Version` header so clients can evict
//! themselves.
//!
//! ## Modules
//!
//! - [`config`] - authorization server configuration
//! - [`oauth`] - authorization requests, code sessions, and validation
//! - [`token`] - opaque token issuance, rotation, and validation
//! - [`middleware`] - bearer authentication and session-version stamping
//! - [`storage`] - storage traits and in-memory backends
//! - [`http`] - axum handlers for the OAuth and account endpoints

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod oauth;
pub mod password;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, OAuthConfig, SessionConfig};
pub use error::{AuthError, ErrorCategory};
pub use http::{
    AuthHttpState, ChangePasswordRequest, ClientMetadata, LoginAuthorizeRequest,
    LoginAuthorizeResponse, TokenRequest, TokenResponse, UserInfoResponse,
    authorize_metadata_handler, change_password_handler, force_logout_handler,
    login_authorize_handler, logout_handler, me_handler, token_handler,
};
pub use middleware::{AuthContext, AuthState, BearerAuth, stamp_session_version};
pub use oauth::{
    AuthorizationError, AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse,
    AuthorizationService, AuthorizationSession, AuthorizeConfig,
};
pub use storage::{
    ClientStorage, SessionStorage, SessionVersionStorage, TokenStorage, User, UserStorage,
    memory::{
        InMemoryClientStorage, InMemorySessionStorage, InMemorySessionVersionStorage,
        InMemoryTokenStorage, InMemoryUserStorage,
    },
};
pub use token::{TokenConfig, TokenPair, TokenService};
pub use types::{AccessTokenRecord, Client, ClientValidationError, RefreshTokenRecord};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;
