//! Session-version marker.
//!
//! Every user has a server-maintained session version. Tokens are stamped
//! with the version current at issue time; advancing the version marks all
//! previously issued credentials for that user as stale without writing a
//! per-token revocation record.
//!
//! The server compares versions structurally. Clients must not: on the wire
//! the version is an opaque header value that clients cache and compare for
//! equality only (see `crewbase-client`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Response header carrying the user's current session version.
///
/// Present on authenticated responses; absent when no enforcement applies.
pub const SESSION_VERSION_HEADER: &str = "x-session-version";

/// Monotonic per-user session version.
///
/// Versions only advance. The numeric representation is an implementation
/// detail of the server; the wire format is the decimal rendering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SessionVersion(u64);

impl SessionVersion {
    /// The version assigned to a user on first contact.
    pub const INITIAL: Self = Self(1);

    /// Creates a session version from a raw counter value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the next version in sequence.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parses a version from its wire representation.
    ///
    /// Returns `None` for anything that is not a decimal counter value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<u64>().ok().map(Self)
    }
}

impl fmt::Display for SessionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_and_next() {
        let v = SessionVersion::INITIAL;
        assert_eq!(v.value(), 1);
        assert_eq!(v.next().value(), 2);
        assert!(v < v.next());
    }

    #[test]
    fn test_wire_roundtrip() {
        let v = SessionVersion::new(42);
        assert_eq!(v.to_string(), "42");
        assert_eq!(SessionVersion::parse("42"), Some(v));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(SessionVersion::parse("v1"), None);
        assert_eq!(SessionVersion::parse(""), None);
        assert_eq!(SessionVersion::parse("-3"), None);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&SessionVersion::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
