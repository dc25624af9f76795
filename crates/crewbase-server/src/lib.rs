//! # crewbase-server
//!
//! Runnable Crewbase SSO authorization server.
//!
//! Wires the `crewbase-auth` services and in-memory storage backends into
//! an axum application: configuration loading, tracing setup, bootstrap
//! seeding, route assembly, and graceful shutdown.

pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod server;

pub use config::{AppConfig, load_config};
pub use server::{AppState, build_router, run};
