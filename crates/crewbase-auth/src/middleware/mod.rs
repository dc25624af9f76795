//! HTTP middleware for authentication and session versioning.

pub mod auth;
pub mod error;
pub mod session_version;
pub mod types;

pub use auth::{AuthState, BearerAuth};
pub use session_version::stamp_session_version;
pub use types::AuthContext;
