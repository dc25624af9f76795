//! OAuth 2.0 authorization flow.
//!
//! Request/response types for the authorization endpoint, the single-use
//! code session, and the validation service behind both.

pub mod authorize;
pub mod service;
pub mod session;

pub use authorize::{
    AuthorizationError, AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse,
};
pub use service::{AuthorizationService, AuthorizeConfig, ClientMetadata};
pub use session::AuthorizationSession;
