//! Domain types for the authorization server.

pub mod client;
pub mod token;

pub use client::{Client, ClientValidationError};
pub use token::{AccessTokenRecord, RefreshTokenRecord, generate_token, hash_token};
