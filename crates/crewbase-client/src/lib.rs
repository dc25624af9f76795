//! # crewbase-client
//!
//! Client-side SSO flow components for Crewbase applications.
//!
//! This crate implements the two pieces of session logic every Crewbase
//! front end carries:
//!
//! - [`ConsentFlow`] - the authorize → login → consent → redirect sequence
//! - [`SessionInterceptor`] - bearer attachment, session-version tracking
//!   with forced logout, and 401 redirect policy
//!
//! Both components take their collaborators ([`SessionStore`],
//! [`Navigator`], [`AuthorizationApi`]) as injected trait objects, so the
//! decision logic is unit-testable without a transport. A reqwest-backed
//! [`SessionHttpClient`] wires the interceptor around real dispatches.
//!
//! ## Modules
//!
//! - [`api`] - authorization server API surface and reqwest implementation
//! - [`consent`] - the consent flow state machine
//! - [`interceptor`] - the session interceptor
//! - [`session`] - persisted session state and navigation traits
//! - [`client`] - reqwest wrapper applying the interceptor

pub mod api;
pub mod client;
pub mod consent;
pub mod interceptor;
pub mod session;

pub use api::{
    ApiError, AuthorizationApi, ClientMetadata, HttpAuthorizationApi, LoginAuthorizeRequest,
};
pub use client::SessionHttpClient;
pub use consent::{AuthorizeParams, ConsentFlow, ConsentState, Credentials};
pub use interceptor::{InterceptorConfig, RequestBody, SessionInterceptor};
pub use session::{MemoryNavigator, MemorySessionStore, Navigator, SessionStore};
