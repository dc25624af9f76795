//! Axum HTTP handlers for the OAuth and account endpoints.
//!
//! Routes served by these handlers:
//!
//! - `GET /oauth/authorize` - consent-screen metadata
//! - `POST /oauth/authorize/login` - login + authorize, returns redirect URL
//! - `POST /oauth/token` - code exchange and refresh
//! - `GET /auth/me` - authenticated user info
//! - `POST /auth/logout` - revoke the presented token pair
//! - `POST /auth/password` - change password, invalidating other sessions
//! - `POST /auth/users/{id}/force-logout` - administrative session bump

pub mod account;
pub mod authorize;
pub mod logout;
pub mod token;
pub mod userinfo;

pub use account::{ChangePasswordRequest, change_password_handler, force_logout_handler};
pub use authorize::{
    AuthHttpState, LoginAuthorizeRequest, LoginAuthorizeResponse, authorize_metadata_handler,
    login_authorize_handler,
};
pub use logout::{LogoutRequest, logout_handler};
pub use token::{TokenRequest, TokenResponse, token_handler};
pub use userinfo::{UserInfoResponse, me_handler};

pub use crate::oauth::service::ClientMetadata;
