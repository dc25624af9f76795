//! Storage traits for authentication and authorization data.
//!
//! This module defines storage interfaces for:
//!
//! - OAuth client registrations
//! - Users and password verification
//! - Authorization code sessions
//! - Access and refresh token records
//! - Per-user session versions
//!
//! # Implementations
//!
//! In-memory implementations live in [`memory`] and back the default server
//! configuration and the test suite. A SQL backend would implement the same
//! traits in a separate crate.

pub mod client;
pub mod memory;
pub mod session;
pub mod session_version;
pub mod token;
pub mod user;

pub use client::ClientStorage;
pub use session::SessionStorage;
pub use session_version::SessionVersionStorage;
pub use token::TokenStorage;
pub use user::{User, UserStorage};
