//! # crewbase-core
//!
//! Shared domain primitives for the Crewbase SSO stack.
//!
//! This crate holds the small set of types that both the authorization
//! server (`crewbase-auth`) and the client-side flow components
//! (`crewbase-client`) agree on:
//!
//! - [`Role`] - the closed set of platform roles and their capabilities
//! - [`SessionVersion`] - the per-user invalidation marker
//!
//! ## Modules
//!
//! - [`role`] - platform roles and capability predicates
//! - [`session_version`] - session-version marker and wire header name

pub mod role;
pub mod session_version;

pub use role::{Role, RoleParseError};
pub use session_version::{SESSION_VERSION_HEADER, SessionVersion};
